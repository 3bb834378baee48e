use crate::limits::LimitTable;
use crate::models::inventory::{ItemStack, safe_override_max};
use crate::models::types::ItemTypeId;

/// Quantity and max-stack override to store on an item instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enforced {
    pub quantity: i32,
    pub override_max: Option<i32>,
}

/// Clips `quantity` to the configured max for `item_type` and stamps that max
/// as the instance override. Types without a limit come back unchanged.
///
/// The override is always rewritten, even when it already matches, so an
/// instance touched after a reload never keeps a pre-reload limit.
pub fn enforce(
    table: &LimitTable,
    item_type: ItemTypeId,
    quantity: i32,
    existing_override: Option<i32>,
) -> Enforced {
    match table.get(item_type) {
        None => Enforced {
            quantity,
            override_max: existing_override,
        },
        Some(max) => Enforced {
            quantity: quantity.min(max),
            override_max: Some(max),
        },
    }
}

/// Applies [`enforce`] to a stack in place. Returns `true` when the stack is
/// under a limit (and was therefore rewritten).
pub fn apply_max_to_stack(table: &LimitTable, stack: &mut ItemStack) -> bool {
    if !table.contains(stack.item_type) {
        return false;
    }

    let result = enforce(table, stack.item_type, stack.amount, safe_override_max(stack));

    let mut meta = stack.meta_or_default();
    meta.max_stack_size = result.override_max;
    stack.set_meta(meta);
    stack.amount = result.quantity;
    true
}
