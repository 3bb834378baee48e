use crate::error::HostError;
use crate::host::{
    CommandSender, CraftingInventory, Inventory, ItemEntity, ItemRegistry, Player, normalize_item_key,
};
use crate::models::inventory::ItemStack;
use crate::models::player::PlayerRole;
use crate::models::types::{ItemTypeId, UserId};
use std::collections::{HashMap, HashSet};

/// Subset of vanilla item keys known to the in-memory registry
const VANILLA_ITEMS: &[&str] = &[
    "stone",
    "dirt",
    "cobblestone",
    "oak_planks",
    "oak_log",
    "sand",
    "gravel",
    "glass",
    "stick",
    "torch",
    "coal",
    "iron_ingot",
    "gold_ingot",
    "diamond",
    "emerald",
    "redstone",
    "lapis_lazuli",
    "string",
    "feather",
    "gunpowder",
    "bone",
    "arrow",
    "snowball",
    "egg",
    "ender_pearl",
    "bucket",
    "bread",
    "apple",
    "wheat",
    "sugar_cane",
    "paper",
    "book",
    "experience_bottle",
    "totem_of_undying",
];

#[derive(Debug, Default, Clone)]
pub struct MemoryItemRegistry {
    by_key: HashMap<String, ItemTypeId>,
    keys: Vec<String>,
}

impl MemoryItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vanilla() -> Self {
        Self::with_items(VANILLA_ITEMS.iter().copied())
    }

    pub fn with_items<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut reg = Self::new();
        for name in names {
            reg.register(name);
        }
        reg
    }

    /// Registers a type (idempotent) and returns its handle
    pub fn register(&mut self, name: &str) -> Option<ItemTypeId> {
        let key = normalize_item_key(name)?;
        if let Some(id) = self.by_key.get(&key) {
            return Some(*id);
        }
        let id = ItemTypeId(self.keys.len() as u32);
        self.keys.push(key.clone());
        self.by_key.insert(key, id);
        Some(id)
    }
}

impl ItemRegistry for MemoryItemRegistry {
    fn match_item(&self, name: &str) -> Option<ItemTypeId> {
        let key = normalize_item_key(name)?;
        self.by_key.get(&key).copied()
    }

    fn key_of(&self, id: ItemTypeId) -> Option<String> {
        self.keys.get(id.0 as usize).cloned()
    }
}

/// Player with an inbox capturing every delivered message
#[derive(Debug, Clone)]
pub struct MemoryPlayer {
    pub id: UserId,
    pub name: String,
    pub role: PlayerRole,
    pub inbox: Vec<String>,
}

impl MemoryPlayer {
    pub fn new(name: impl Into<String>, role: PlayerRole) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            role,
            inbox: Vec::new(),
        }
    }

    pub fn op(name: impl Into<String>) -> Self {
        Self::new(name, PlayerRole::Operator)
    }

    pub fn take_inbox(&mut self) -> Vec<String> {
        std::mem::take(&mut self.inbox)
    }
}

impl CommandSender for MemoryPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&mut self, msg: &str) {
        self.inbox.push(msg.to_string());
    }
}

impl Player for MemoryPlayer {
    fn id(&self) -> UserId {
        self.id
    }

    fn role(&self) -> PlayerRole {
        self.role
    }
}

/// The server console as a command sender
#[derive(Debug, Default)]
pub struct ConsoleSender {
    pub lines: Vec<String>,
}

impl CommandSender for ConsoleSender {
    fn name(&self) -> &str {
        "CONSOLE"
    }

    fn send_message(&mut self, msg: &str) {
        self.lines.push(msg.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct MemoryItemEntity {
    pub stack: ItemStack,
}

impl MemoryItemEntity {
    pub fn new(stack: ItemStack) -> Self {
        Self { stack }
    }
}

impl ItemEntity for MemoryItemEntity {
    fn item_stack(&self) -> ItemStack {
        self.stack.clone()
    }

    fn set_item_stack(&mut self, stack: ItemStack) {
        self.stack = stack;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCraftingInventory {
    pub result: Option<ItemStack>,
}

impl CraftingInventory for MemoryCraftingInventory {
    fn result(&self) -> Option<ItemStack> {
        self.result.clone()
    }

    fn set_result(&mut self, stack: Option<ItemStack>) {
        self.result = stack;
    }
}

/// Fixed-size container. Slots listed in `failing` error on access, which
/// lets tests reproduce flaky host accessors.
#[derive(Debug, Clone)]
pub struct MemoryInventory {
    pub kind: String,
    pub slots: Vec<Option<ItemStack>>,
    pub location: Option<String>,
    pub failing: HashSet<usize>,
}

impl MemoryInventory {
    pub fn new(kind: impl Into<String>, size: usize) -> Self {
        Self {
            kind: kind.into(),
            slots: vec![None; size],
            location: None,
            failing: HashSet::new(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn put(&mut self, slot: usize, stack: ItemStack) {
        self.slots[slot] = Some(stack);
    }

    pub fn fail_slot(&mut self, slot: usize) {
        self.failing.insert(slot);
    }

    fn check(&self, slot: usize) -> Result<(), HostError> {
        if slot >= self.slots.len() {
            return Err(HostError::SlotOutOfRange {
                slot,
                size: self.slots.len(),
            });
        }
        if self.failing.contains(&slot) {
            return Err(HostError::SlotUnavailable(slot));
        }
        Ok(())
    }
}

impl Inventory for MemoryInventory {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn size(&self) -> usize {
        self.slots.len()
    }

    fn item(&self, slot: usize) -> Result<Option<ItemStack>, HostError> {
        self.check(slot)?;
        Ok(self.slots[slot].clone())
    }

    fn set_item(&mut self, slot: usize, stack: Option<ItemStack>) -> Result<(), HostError> {
        self.check(slot)?;
        self.slots[slot] = stack;
        Ok(())
    }

    fn location(&self) -> Option<String> {
        self.location.clone()
    }
}
