//! Limit table and the config loader that builds it.
//!
//! A load turns the ordered `items` section into a fresh [`LimitSnapshot`].
//! Names the host cannot resolve are dropped, values above [`MAX_ALLOWED`]
//! are clipped (with a [`ClipNotice`] and a correction to write back), and
//! non-positive values are rejected. Nothing is merged with earlier loads.

use crate::host::ItemRegistry;
use crate::models::types::ItemTypeId;
use crate::store::ConfigFile;
use std::collections::HashMap;

/// Hard ceiling for any configured stack size
pub const MAX_ALLOWED: i32 = 99;

/// Effective max stack size per item type. Every value is in `1..=MAX_ALLOWED`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitTable {
    limits: HashMap<ItemTypeId, i32>,
}

impl LimitTable {
    pub fn get(&self, item_type: ItemTypeId) -> Option<i32> {
        self.limits.get(&item_type).copied()
    }

    pub fn contains(&self, item_type: ItemTypeId) -> bool {
        self.limits.contains_key(&item_type)
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemTypeId, i32)> + '_ {
        self.limits.iter().map(|(k, v)| (*k, *v))
    }

    fn insert(&mut self, item_type: ItemTypeId, max: i32) {
        debug_assert!((1..=MAX_ALLOWED).contains(&max));
        self.limits.insert(item_type, max);
    }
}

impl FromIterator<(ItemTypeId, i32)> for LimitTable {
    /// Builds a table, keeping only values inside `1..=MAX_ALLOWED`
    fn from_iter<T: IntoIterator<Item = (ItemTypeId, i32)>>(iter: T) -> Self {
        let mut table = LimitTable::default();
        for (item_type, max) in iter {
            if (1..=MAX_ALLOWED).contains(&max) {
                table.insert(item_type, max);
            }
        }
        table
    }
}

/// One configured value that exceeded the ceiling
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClipNotice {
    /// Item name as written in the config
    pub item: String,
    /// Value found in the config
    pub configured: i128,
    /// Value it was reduced to
    pub clipped_to: i32,
}

impl std::fmt::Display for ClipNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Config value for '{}' was {} and has been clipped to {}",
            self.item, self.configured, self.clipped_to
        )
    }
}

/// Result of one load: the state the plugin runs with until the next reload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitSnapshot {
    pub table: LimitTable,
    pub notices: Vec<ClipNotice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    pub snapshot: LimitSnapshot,
    /// `(config name, clipped value)` pairs to write back to the persisted config
    pub corrections: Vec<(String, i32)>,
}

impl LoadOutcome {
    pub fn persist_needed(&self) -> bool {
        !self.corrections.is_empty()
    }

    /// Applies the clipped values to the persisted document
    pub fn apply_corrections(&self, cfg: &mut ConfigFile) {
        for (name, value) in &self.corrections {
            cfg.set_item(name, i64::from(*value));
        }
    }
}

/// Builds a fresh snapshot from the `items` section. `None` means the section
/// is missing, which yields an empty table.
pub fn load(items: Option<&[(String, i128)]>, registry: &dyn ItemRegistry) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    let Some(items) = items else {
        tracing::warn!("No items section found in config.yml");
        return outcome;
    };

    for (name, configured) in items {
        let Some(item_type) = registry.match_item(name) else {
            tracing::warn!(item = %name, "Unknown material in config: {name}");
            continue;
        };

        if *configured < 1 {
            tracing::warn!(
                item = %name,
                value = %configured,
                "Ignoring non-positive stack size for '{name}'"
            );
            continue;
        }

        let effective = if *configured > i128::from(MAX_ALLOWED) {
            let notice = ClipNotice {
                item: name.clone(),
                configured: *configured,
                clipped_to: MAX_ALLOWED,
            };
            tracing::warn!(item = %name, value = %configured, "{notice}");
            outcome.snapshot.notices.push(notice);
            outcome.corrections.push((name.clone(), MAX_ALLOWED));
            MAX_ALLOWED
        } else {
            // in 1..=MAX_ALLOWED here
            *configured as i32
        };

        outcome.snapshot.table.insert(item_type, effective);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryItemRegistry;

    fn items(pairs: &[(&str, i128)]) -> Vec<(String, i128)> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn over_ceiling_is_clipped_with_notice() {
        let reg = MemoryItemRegistry::vanilla();
        let stick = reg.match_item("stick").unwrap();

        let out = load(Some(items(&[("minecraft:stick", 150)]).as_slice()), &reg);

        assert_eq!(out.snapshot.table.get(stick), Some(99));
        assert_eq!(out.snapshot.table.len(), 1);
        assert_eq!(out.snapshot.notices.len(), 1);
        assert_eq!(
            out.snapshot.notices[0].to_string(),
            "Config value for 'minecraft:stick' was 150 and has been clipped to 99"
        );
        assert!(out.persist_needed());
        assert_eq!(out.corrections, vec![("minecraft:stick".to_string(), 99)]);
    }

    #[test]
    fn in_range_passes_through() {
        let reg = MemoryItemRegistry::vanilla();
        let stick = reg.match_item("stick").unwrap();

        let out = load(Some(items(&[("minecraft:stick", 16)]).as_slice()), &reg);

        assert_eq!(out.snapshot.table.get(stick), Some(16));
        assert!(out.snapshot.notices.is_empty());
        assert!(!out.persist_needed());
    }

    #[test]
    fn clip_is_min_with_ceiling() {
        let reg = MemoryItemRegistry::vanilla();
        let egg = reg.match_item("egg").unwrap();
        for v in [1_i128, 2, 50, 98, 99, 100, 101, 1000, i128::from(i64::MAX), i128::from(u64::MAX)] {
            let out = load(Some(items(&[("egg", v)]).as_slice()), &reg);
            let expected = if v > 99 { 99 } else { v as i32 };
            assert_eq!(out.snapshot.table.get(egg), Some(expected), "value {v}");
            assert_eq!(out.persist_needed(), v > 99, "value {v}");
        }
    }

    #[test]
    fn notice_reports_values_past_i64_exactly() {
        let reg = MemoryItemRegistry::vanilla();
        let cfg = ConfigFile::parse("items:\n  stick: 18446744073709551615\n").unwrap();

        let out = load(cfg.items().as_deref(), &reg);

        assert_eq!(out.snapshot.table.get(reg.match_item("stick").unwrap()), Some(99));
        assert_eq!(
            out.snapshot.notices[0].to_string(),
            "Config value for 'stick' was 18446744073709551615 and has been clipped to 99"
        );
        assert_eq!(out.corrections, vec![("stick".to_string(), 99)]);
    }

    #[test]
    fn unknown_names_are_skipped_not_clipped() {
        let reg = MemoryItemRegistry::vanilla();

        let out = load(Some(items(&[("unobtainium", 500), ("bad name!", 3)]).as_slice()), &reg);

        assert!(out.snapshot.table.is_empty());
        assert!(out.snapshot.notices.is_empty());
        assert!(!out.persist_needed());
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let reg = MemoryItemRegistry::vanilla();

        let out = load(Some(items(&[("stick", 0), ("dirt", -5), ("egg", 8)]).as_slice()), &reg);

        assert_eq!(out.snapshot.table.len(), 1);
        assert_eq!(out.snapshot.table.get(reg.match_item("egg").unwrap()), Some(8));
        assert!(out.snapshot.notices.is_empty());
    }

    #[test]
    fn missing_section_yields_empty_snapshot() {
        let reg = MemoryItemRegistry::vanilla();
        let out = load(None, &reg);
        assert_eq!(out, LoadOutcome::default());
    }

    #[test]
    fn last_write_wins_for_aliases() {
        let reg = MemoryItemRegistry::vanilla();
        let stick = reg.match_item("stick").unwrap();

        let out = load(Some(items(&[("stick", 10), ("minecraft:stick", 20)]).as_slice()), &reg);

        assert_eq!(out.snapshot.table.len(), 1);
        assert_eq!(out.snapshot.table.get(stick), Some(20));
    }

    #[test]
    fn notices_follow_config_order() {
        let reg = MemoryItemRegistry::vanilla();

        let out = load(
            Some(items(&[("egg", 120), ("stick", 5), ("snowball", 300)]).as_slice()),
            &reg,
        );

        let names: Vec<_> = out.snapshot.notices.iter().map(|n| n.item.as_str()).collect();
        assert_eq!(names, vec!["egg", "snowball"]);
    }

    #[test]
    fn corrections_rewrite_config() {
        let reg = MemoryItemRegistry::vanilla();
        let mut cfg = ConfigFile::parse("items:\n  minecraft:stick: 150\n  egg: 16\n").unwrap();

        let out = load(cfg.items().as_deref(), &reg);
        out.apply_corrections(&mut cfg);

        assert_eq!(
            cfg.items().unwrap(),
            vec![("minecraft:stick".to_string(), 99), ("egg".to_string(), 16)]
        );
    }

    #[test]
    fn table_from_iter_drops_out_of_range() {
        let table: LimitTable = [(ItemTypeId(1), 0), (ItemTypeId(2), 64), (ItemTypeId(3), 100)]
            .into_iter()
            .collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(ItemTypeId(2)), Some(64));
    }
}
