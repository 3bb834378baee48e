pub mod inventory;
pub mod player;
pub mod types;
