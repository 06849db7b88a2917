//! In-process store implementations backed by [`dashmap`].
//!
//! Used when `database.url = "memory"` and throughout the test suites.

pub mod notification;
pub mod presence;

pub use notification::MemoryNotificationStore;
pub use presence::MemoryPresenceStore;
