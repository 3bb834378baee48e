//! Host events and the handlers that route their item stacks through
//! [`crate::enforce`].
//!
//! Each handler pulls the stack out of the handle the host gave us, enforces
//! the limit, and writes it back to that same handle. The handlers only need
//! a [`LimitTable`]; the plugin wires them to a bus via [`EventHandler`].

use crate::enforce::apply_max_to_stack;
use crate::host::{CraftingInventory, Inventory, ItemEntity, Player};
use crate::limits::LimitTable;
use crate::models::inventory::safe_override_max;
use std::sync::Arc;

/// An item entity appeared in the world
pub struct ItemSpawnEvent<'a> {
    pub entity: &'a mut dyn ItemEntity,
}

/// A player threw an item out of their inventory
pub struct PlayerDropItemEvent<'a> {
    pub player: &'a dyn Player,
    pub item: &'a mut dyn ItemEntity,
}

/// The crafting grid changed and a result is about to be shown
pub struct PrepareItemCraftEvent<'a> {
    pub inventory: &'a mut dyn CraftingInventory,
}

/// An entity is collecting an item from the ground
pub struct EntityPickupItemEvent<'a> {
    pub item: &'a mut dyn ItemEntity,
}

pub struct PlayerJoinEvent<'a> {
    pub player: &'a mut dyn Player,
}

/// A player opened a container. `top` is the container view; `inventory` is
/// the interacted inventory when the host reports one distinct from `top`.
pub struct InventoryOpenEvent<'a> {
    pub player: &'a dyn Player,
    pub top: &'a mut dyn Inventory,
    pub inventory: Option<&'a mut dyn Inventory>,
}

pub enum HostEvent<'a> {
    ItemSpawn(ItemSpawnEvent<'a>),
    PlayerDropItem(PlayerDropItemEvent<'a>),
    PrepareItemCraft(PrepareItemCraftEvent<'a>),
    EntityPickupItem(EntityPickupItemEvent<'a>),
    PlayerJoin(PlayerJoinEvent<'a>),
    InventoryOpen(InventoryOpenEvent<'a>),
}

impl HostEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::ItemSpawn(_) => "item_spawn",
            HostEvent::PlayerDropItem(_) => "player_drop_item",
            HostEvent::PrepareItemCraft(_) => "prepare_item_craft",
            HostEvent::EntityPickupItem(_) => "entity_pickup_item",
            HostEvent::PlayerJoin(_) => "player_join",
            HostEvent::InventoryOpen(_) => "inventory_open",
        }
    }
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &mut HostEvent<'_>);
}

/// Host side of event subscription
pub trait EventBus {
    fn register(&mut self, handler: Arc<dyn EventHandler>);
}

/// Delivers events synchronously, in registration order
#[derive(Default)]
pub struct MemoryEventBus {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn dispatch(&self, event: &mut HostEvent<'_>) {
        tracing::trace!(event = event.name(), handlers = self.handlers.len(), "dispatch");
        for handler in &self.handlers {
            handler.handle(event);
        }
    }
}

impl EventBus for MemoryEventBus {
    fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }
}

/// Enforces the limit on a dropped/spawned item entity
pub fn enforce_entity(table: &LimitTable, entity: &mut dyn ItemEntity) -> bool {
    let mut stack = entity.item_stack();
    let limited = apply_max_to_stack(table, &mut stack);
    entity.set_item_stack(stack);
    limited
}

/// Enforces the limit on a pending crafting result
pub fn enforce_craft_result(table: &LimitTable, inventory: &mut dyn CraftingInventory) -> bool {
    let Some(mut result) = inventory.result() else {
        return false;
    };
    let limited = apply_max_to_stack(table, &mut result);
    inventory.set_result(Some(result));
    limited
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Slots holding a limited item type
    pub inspected: usize,
    /// Slots whose amount or override actually changed
    pub adjusted: usize,
    /// Slots skipped because a host accessor failed
    pub failures: usize,
}

impl std::ops::AddAssign for ScanReport {
    fn add_assign(&mut self, rhs: Self) {
        self.inspected += rhs.inspected;
        self.adjusted += rhs.adjusted;
        self.failures += rhs.failures;
    }
}

/// Enforces limits on every occupied slot of a container. A failing slot is
/// logged and skipped; the scan always runs to the end.
pub fn enforce_inventory(table: &LimitTable, inventory: &mut dyn Inventory) -> ScanReport {
    let mut report = ScanReport::default();
    let kind = inventory.kind().to_string();
    let location = inventory.location().unwrap_or_else(|| "unknown".to_string());

    for slot in 0..inventory.size() {
        let mut stack = match inventory.item(slot) {
            Ok(Some(stack)) => stack,
            Ok(None) => continue,
            Err(e) => {
                tracing::error!(%kind, %location, slot, error = %e, "failed to read slot");
                report.failures += 1;
                continue;
            }
        };
        if !table.contains(stack.item_type) {
            continue;
        }
        report.inspected += 1;

        let before_max = safe_override_max(&stack);
        let before_amount = stack.amount;

        apply_max_to_stack(table, &mut stack);
        let after_max = safe_override_max(&stack);
        let after_amount = stack.amount;

        if let Err(e) = inventory.set_item(slot, Some(stack)) {
            tracing::error!(%kind, %location, slot, error = %e, "failed to write slot");
            report.failures += 1;
            continue;
        }

        if before_max != after_max || before_amount != after_amount {
            report.adjusted += 1;
            tracing::debug!(
                %kind,
                %location,
                slot,
                before_amount,
                after_amount,
                ?before_max,
                ?after_max,
                "slot adjusted"
            );
        }
    }

    report
}

/// Scans the container view and, when distinct, the interacted inventory
pub fn enforce_open_inventories(table: &LimitTable, event: &mut InventoryOpenEvent<'_>) -> ScanReport {
    let mut report = enforce_inventory(table, &mut *event.top);
    if let Some(inventory) = event.inventory.as_deref_mut() {
        report += enforce_inventory(table, inventory);
    }
    report
}
