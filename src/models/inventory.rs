use crate::error::HostError;
use crate::models::types::ItemTypeId;

/// Instance-level attributes of a stack
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMeta {
    /// Per-instance max stack size override
    pub max_stack_size: Option<i32>,
    /// Custom display name, if renamed
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MetaSlot {
    Absent,
    Present(ItemMeta),
    /// Host could not produce the metadata right now
    Unreadable(String),
}

/// A concrete stack of some item type. Owned by the host; the plugin only
/// reads it and rewrites `amount` and the max-stack override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    /// Item type (catalog entry)
    pub item_type: ItemTypeId,

    /// Stack size
    pub amount: i32,

    meta: MetaSlot,
}

impl ItemStack {
    pub fn new(item_type: ItemTypeId, amount: i32) -> Self {
        Self {
            item_type,
            amount,
            meta: MetaSlot::Absent,
        }
    }

    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = MetaSlot::Present(meta);
        self
    }

    pub fn with_unreadable_meta(mut self, reason: impl Into<String>) -> Self {
        self.meta = MetaSlot::Unreadable(reason.into());
        self
    }

    /// Metadata accessor as the host exposes it: may be absent, may fail.
    pub fn meta(&self) -> Result<Option<&ItemMeta>, HostError> {
        match &self.meta {
            MetaSlot::Absent => Ok(None),
            MetaSlot::Present(meta) => Ok(Some(meta)),
            MetaSlot::Unreadable(reason) => Err(HostError::MetaUnavailable(reason.clone())),
        }
    }

    /// Returns the current metadata, or a fresh one from the item factory when
    /// there is none (or it cannot be read).
    pub fn meta_or_default(&self) -> ItemMeta {
        match &self.meta {
            MetaSlot::Present(meta) => meta.clone(),
            MetaSlot::Absent | MetaSlot::Unreadable(_) => ItemMeta::default(),
        }
    }

    pub fn set_meta(&mut self, meta: ItemMeta) {
        self.meta = MetaSlot::Present(meta);
    }

    pub fn max_stack_override(&self) -> Result<Option<i32>, HostError> {
        Ok(self.meta()?.and_then(|m| m.max_stack_size))
    }
}

/// Best-effort read of the per-instance override. Any accessor failure reads
/// as "no override".
pub fn safe_override_max(stack: &ItemStack) -> Option<i32> {
    match stack.max_stack_override() {
        Ok(max) => max,
        Err(e) => {
            tracing::debug!(item_type = %stack.item_type, error = %e, "override unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STICK: ItemTypeId = ItemTypeId(7);

    #[test]
    fn absent_meta_has_no_override() {
        let stack = ItemStack::new(STICK, 3);
        assert_eq!(stack.max_stack_override(), Ok(None));
        assert_eq!(safe_override_max(&stack), None);
    }

    #[test]
    fn unreadable_meta_degrades_to_none() {
        let stack = ItemStack::new(STICK, 3).with_unreadable_meta("chunk unloading");
        assert!(stack.max_stack_override().is_err());
        assert_eq!(safe_override_max(&stack), None);
        assert_eq!(stack.meta_or_default(), ItemMeta::default());
    }

    #[test]
    fn present_meta_is_kept() {
        let meta = ItemMeta {
            max_stack_size: Some(12),
            display_name: Some("Walking stick".into()),
        };
        let stack = ItemStack::new(STICK, 3).with_meta(meta.clone());
        assert_eq!(safe_override_max(&stack), Some(12));
        assert_eq!(stack.meta_or_default(), meta);
    }
}
