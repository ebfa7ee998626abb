//! Session management for conversation history
//!
//! Sessions live in memory only. Each one keeps a bounded window of messages
//! and disappears after it has been idle for longer than the configured
//! timeout.

pub mod clock;
pub mod context;
pub mod manager;
pub mod reaper;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{project, ContextEntry};
pub use manager::{SessionStore, StoreStats};
pub use reaper::SessionReaper;
pub use store::{Message, Role, Session};
