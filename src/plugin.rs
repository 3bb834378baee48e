use crate::error::AppResult;
use crate::events::{
    EventBus, EventHandler, HostEvent, enforce_craft_result, enforce_entity, enforce_open_inventories,
};
use crate::host::{ItemRegistry, Player};
use crate::limits::{self, ClipNotice, LimitSnapshot};
use crate::models::types::{ItemTypeId, UserId};
use crate::notify::{self, NotificationTracker};
use crate::store::ConfigStore;
use parking_lot::RwLock;
use std::sync::Arc;

struct PluginState {
    snapshot: Arc<LimitSnapshot>,
    notified: NotificationTracker,
}

/// The plugin instance: owns the current limit snapshot and the set of
/// operators already told about it. A reload swaps both under one lock.
pub struct StackLimit {
    store: Arc<dyn ConfigStore>,
    items: Arc<dyn ItemRegistry>,
    state: RwLock<PluginState>,
}

impl StackLimit {
    pub fn new(store: Arc<dyn ConfigStore>, items: Arc<dyn ItemRegistry>) -> Self {
        Self {
            store,
            items,
            state: RwLock::new(PluginState {
                snapshot: Arc::new(LimitSnapshot::default()),
                notified: NotificationTracker::new(),
            }),
        }
    }

    /// Writes the default config if needed, loads it and subscribes to host
    /// events.
    pub fn enable(self: &Arc<Self>, bus: &mut dyn EventBus) -> AppResult<()> {
        if let Err(e) = self.store.save_default() {
            tracing::error!(error = %e, "failed to write default config");
        }
        self.process_config()?;
        bus.register(self.clone());
        tracing::info!("StackLimit enabled.");
        Ok(())
    }

    pub fn disable(&self) {
        tracing::info!("StackLimit disabled.");
    }

    /// Re-reads the persisted config and installs the result. On a read or
    /// parse failure the previous snapshot stays in place.
    pub fn reload(&self) -> AppResult<()> {
        self.process_config()
    }

    fn process_config(&self) -> AppResult<()> {
        let mut cfg = self.store.load()?;
        let items = cfg.items();
        let outcome = limits::load(items.as_deref(), self.items.as_ref());

        // Clipped values hit the disk before anything relies on them.
        if outcome.persist_needed() {
            outcome.apply_corrections(&mut cfg);
            match self.store.save(&cfg) {
                Ok(()) => tracing::info!(count = outcome.corrections.len(), "clipped values written back"),
                Err(e) => tracing::error!(error = %e, "failed to write clipped config"),
            }
        }

        let limits = outcome.snapshot.table.len();
        let notices = outcome.snapshot.notices.len();
        {
            let mut state = self.state.write();
            state.snapshot = Arc::new(outcome.snapshot);
            state.notified.clear();
        }
        tracing::info!(limits, notices, "config processed");
        Ok(())
    }

    pub fn snapshot(&self) -> Arc<LimitSnapshot> {
        self.state.read().snapshot.clone()
    }

    pub fn limit_for(&self, item_type: ItemTypeId) -> Option<i32> {
        self.state.read().snapshot.table.get(item_type)
    }

    pub fn notices(&self) -> Vec<ClipNotice> {
        self.state.read().snapshot.notices.clone()
    }

    pub fn is_notified(&self, id: UserId) -> bool {
        self.state.read().notified.is_notified(id)
    }

    pub fn item_registry(&self) -> &dyn ItemRegistry {
        self.items.as_ref()
    }

    /// Hands pending clip notices to an operator, once per load
    pub fn on_player_join(&self, player: &mut dyn Player) {
        if !player.is_op() {
            return;
        }
        let snapshot = {
            let mut state = self.state.write();
            if !state.notified.mark(player.id()) {
                return;
            }
            state.snapshot.clone()
        };
        // Host code runs in send_message and may call back into the plugin.
        let sent = notify::deliver(player, &snapshot.notices);
        if sent > 0 {
            tracing::info!(player = player.name(), sent, "delivered clip notices");
        }
    }
}

impl EventHandler for StackLimit {
    fn handle(&self, event: &mut HostEvent<'_>) {
        let snapshot = self.snapshot();
        let table = &snapshot.table;

        match event {
            HostEvent::ItemSpawn(e) => {
                enforce_entity(table, &mut *e.entity);
            }
            HostEvent::PlayerDropItem(e) => {
                if enforce_entity(table, &mut *e.item) {
                    tracing::debug!(player = e.player.name(), "dropped stack limited");
                }
            }
            HostEvent::PrepareItemCraft(e) => {
                enforce_craft_result(table, &mut *e.inventory);
            }
            HostEvent::EntityPickupItem(e) => {
                enforce_entity(table, &mut *e.item);
            }
            HostEvent::PlayerJoin(e) => self.on_player_join(&mut *e.player),
            HostEvent::InventoryOpen(e) => {
                let report = enforce_open_inventories(table, e);
                if report.failures > 0 {
                    tracing::warn!(
                        player = e.player.name(),
                        failures = report.failures,
                        "container scan skipped unreadable slots"
                    );
                }
                tracing::debug!(
                    player = e.player.name(),
                    inspected = report.inspected,
                    adjusted = report.adjusted,
                    "container scanned"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ItemSpawnEvent, MemoryEventBus, PlayerDropItemEvent, PlayerJoinEvent};
    use crate::host::CommandSender;
    use crate::host::memory::{MemoryItemEntity, MemoryItemRegistry, MemoryPlayer};
    use crate::models::inventory::ItemStack;
    use crate::models::player::PlayerRole;
    use crate::store::{ConfigFile, MemoryConfigStore};

    fn plugin(yaml: &str) -> (Arc<StackLimit>, Arc<MemoryConfigStore>, MemoryEventBus) {
        let store = Arc::new(MemoryConfigStore::with_yaml(yaml));
        let reg = Arc::new(MemoryItemRegistry::vanilla());
        let plugin = Arc::new(StackLimit::new(store.clone(), reg));
        let mut bus = MemoryEventBus::new();
        plugin.enable(&mut bus).unwrap();
        (plugin, store, bus)
    }

    fn stick(p: &StackLimit) -> ItemTypeId {
        p.item_registry().match_item("stick").unwrap()
    }

    #[test]
    fn enable_loads_and_registers() {
        let (p, store, bus) = plugin("items:\n  minecraft:stick: 150\n");
        assert_eq!(bus.handler_count(), 1);
        assert_eq!(p.limit_for(stick(&p)), Some(99));
        assert_eq!(p.notices().len(), 1);
        assert_eq!(store.save_count(), 1);
        let persisted = ConfigFile::parse(&store.yaml().unwrap()).unwrap();
        assert_eq!(persisted.items().unwrap(), vec![("minecraft:stick".to_string(), 99)]);
    }

    #[test]
    fn in_range_config_is_not_rewritten() {
        let (p, store, _bus) = plugin("items:\n  minecraft:stick: 16\n");
        assert_eq!(p.limit_for(stick(&p)), Some(16));
        assert!(p.notices().is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn enable_writes_default_when_empty() {
        let store = Arc::new(MemoryConfigStore::new());
        let reg = Arc::new(MemoryItemRegistry::vanilla());
        let p = Arc::new(StackLimit::new(store.clone(), reg.clone()));
        p.enable(&mut MemoryEventBus::new()).unwrap();

        let pearl = reg.match_item("ender_pearl").unwrap();
        assert_eq!(p.limit_for(pearl), Some(64));
    }

    #[test]
    fn reload_replaces_table_wholesale() {
        let (p, store, _bus) = plugin("items:\n  stick: 10\n  egg: 4\n");
        let egg = p.item_registry().match_item("egg").unwrap();

        store.edit("items:\n  stick: 20\n");
        p.reload().unwrap();

        let snap = p.snapshot();
        assert_eq!(snap.table.len(), 1);
        assert_eq!(snap.table.get(stick(&p)), Some(20));
        assert_eq!(snap.table.get(egg), None);
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let (p, store, _bus) = plugin("items:\n  stick: 10\n");
        store.edit("items: [\n");
        assert!(p.reload().is_err());
        assert_eq!(p.limit_for(stick(&p)), Some(10));
    }

    #[test]
    fn ops_notified_once_until_reload() {
        let (p, store, bus) = plugin("items:\n  stick: 150\n");
        let mut op = MemoryPlayer::op("alice");

        for _ in 0..2 {
            bus.dispatch(&mut HostEvent::PlayerJoin(PlayerJoinEvent { player: &mut op }));
        }
        assert_eq!(op.take_inbox().len(), 1);
        assert!(p.is_notified(op.id));

        // corrected file: no notices now, but the set is cleared
        p.reload().unwrap();
        assert!(!p.is_notified(op.id));

        store.edit("items:\n  stick: 300\n  egg: 200\n");
        p.reload().unwrap();
        bus.dispatch(&mut HostEvent::PlayerJoin(PlayerJoinEvent { player: &mut op }));
        assert_eq!(op.take_inbox().len(), 2);
    }

    #[test]
    fn regular_players_get_nothing() {
        let (p, _store, bus) = plugin("items:\n  stick: 150\n");
        let mut player = MemoryPlayer::new("bob", PlayerRole::Player);

        bus.dispatch(&mut HostEvent::PlayerJoin(PlayerJoinEvent { player: &mut player }));

        assert!(player.inbox.is_empty());
        assert!(!p.is_notified(player.id));
    }

    #[test]
    fn spawn_event_uses_current_limits() {
        let (p, store, bus) = plugin("items:\n  stick: 32\n");
        let mut entity = MemoryItemEntity::new(ItemStack::new(stick(&p), 64));

        bus.dispatch(&mut HostEvent::ItemSpawn(ItemSpawnEvent { entity: &mut entity }));
        assert_eq!(entity.stack.amount, 32);

        store.edit("items:\n  stick: 8\n");
        p.reload().unwrap();
        bus.dispatch(&mut HostEvent::ItemSpawn(ItemSpawnEvent { entity: &mut entity }));
        assert_eq!(entity.stack.amount, 8);
        assert_eq!(entity.stack.max_stack_override(), Ok(Some(8)));
    }

    #[test]
    fn drop_event_limits_stack() {
        let (p, _store, bus) = plugin("items:\n  stick: 12\n");
        let player = MemoryPlayer::new("bob", PlayerRole::Player);
        let mut item = MemoryItemEntity::new(ItemStack::new(stick(&p), 40));

        bus.dispatch(&mut HostEvent::PlayerDropItem(PlayerDropItemEvent {
            player: &player,
            item: &mut item,
        }));

        assert_eq!(item.stack.amount, 12);
    }

    /// Chat hook that queries the plugin for every line it receives
    struct EchoingOp {
        id: UserId,
        plugin: Arc<StackLimit>,
        seen: Vec<(String, bool, usize)>,
    }

    impl CommandSender for EchoingOp {
        fn name(&self) -> &str {
            "echo"
        }

        fn send_message(&mut self, msg: &str) {
            let notified = self.plugin.is_notified(self.id);
            let notices = self.plugin.snapshot().notices.len();
            self.seen.push((msg.to_string(), notified, notices));
        }
    }

    impl Player for EchoingOp {
        fn id(&self) -> UserId {
            self.id
        }

        fn role(&self) -> PlayerRole {
            PlayerRole::Operator
        }
    }

    #[test]
    fn delivery_may_call_back_into_plugin() {
        let (p, _store, _bus) = plugin("items:\n  stick: 150\n  egg: 120\n");
        let mut op = EchoingOp {
            id: UserId::new(),
            plugin: p.clone(),
            seen: Vec::new(),
        };

        p.handle(&mut HostEvent::PlayerJoin(PlayerJoinEvent { player: &mut op }));
        p.handle(&mut HostEvent::PlayerJoin(PlayerJoinEvent { player: &mut op }));

        assert_eq!(op.seen.len(), 2);
        assert!(op.seen.iter().all(|(_, notified, notices)| *notified && *notices == 2));
        assert!(op.seen[0].0.starts_with("[StackLimit] Config value for 'stick'"));
    }
}
