//! Narrow interface to the game server hosting the plugin.
//!
//! Everything the plugin touches on the host side (type registry, players,
//! dropped item entities, inventories) is reached through the traits below.
//! [`memory`] provides an in-process implementation used by the console
//! binary and the tests.

use crate::error::HostError;
use crate::models::inventory::ItemStack;
use crate::models::player::PlayerRole;
use crate::models::types::{ItemTypeId, UserId};
use once_cell::sync::Lazy;
use regex::Regex;

pub mod memory;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

static ITEM_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_.\-]+:[a-z0-9_.\-/]+$").expect("item key regex"));

/// Normalizes a user-supplied item name the way the host's lenient matcher
/// does: case-insensitive, spaces as underscores, namespace optional.
/// Returns `None` when the result is not a well-formed namespaced key.
pub fn normalize_item_key(name: &str) -> Option<String> {
    let mut key = name.trim().to_ascii_lowercase().replace(' ', "_");
    if key.is_empty() {
        return None;
    }
    if !key.contains(':') {
        key = format!("{DEFAULT_NAMESPACE}:{key}");
    }
    ITEM_KEY_RE.is_match(&key).then_some(key)
}

/// Host item type registry
pub trait ItemRegistry: Send + Sync {
    /// Resolve a configured item name to a type handle
    fn match_item(&self, name: &str) -> Option<ItemTypeId>;

    /// Canonical key of a type handle (e.g. "minecraft:stick")
    fn key_of(&self, id: ItemTypeId) -> Option<String>;
}

/// Anything that can receive a chat line (console or player)
pub trait CommandSender {
    fn name(&self) -> &str;
    fn send_message(&mut self, msg: &str);
}

pub trait Player: CommandSender {
    fn id(&self) -> UserId;
    fn role(&self) -> PlayerRole;

    fn is_op(&self) -> bool {
        self.role().is_privileged()
    }
}

/// An item lying in the world as an entity
pub trait ItemEntity {
    fn item_stack(&self) -> ItemStack;
    fn set_item_stack(&mut self, stack: ItemStack);
}

/// Crafting grid with its (pending) result slot
pub trait CraftingInventory {
    fn result(&self) -> Option<ItemStack>;
    fn set_result(&mut self, stack: Option<ItemStack>);
}

/// Slot-addressed container surface. Slot accessors can fail transiently.
pub trait Inventory {
    /// Host-side kind, e.g. "chest" or "crafting"
    fn kind(&self) -> &str;

    fn size(&self) -> usize;

    fn item(&self, slot: usize) -> Result<Option<ItemStack>, HostError>;

    fn set_item(&mut self, slot: usize, stack: Option<ItemStack>) -> Result<(), HostError>;

    /// Block location for container blocks, if any
    fn location(&self) -> Option<String> {
        None
    }
}
