pub mod commands;
pub mod config;
pub mod enforce;
pub mod error;
pub mod events;
pub mod host;
pub mod limits;
pub mod models;
pub mod notify;
pub mod plugin;
pub mod store;

// Convenient re-exports (so call sites can do `stacklimit::StackLimit`, etc.)
pub use commands::process_command;
pub use limits::{ClipNotice, LimitSnapshot, LimitTable, MAX_ALLOWED};
pub use plugin::StackLimit;
