//! # docrelay-database
//!
//! Durable state for the presence relay: the per-document presence
//! records and the per-user notification rows. The [`store`] traits are
//! what the relay depends on; [`repositories`] implements them over
//! PostgreSQL and [`memory`] implements them in-process.

pub mod backend;
pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use backend::Stores;
pub use connection::DatabasePool;
pub use store::{NotificationStore, PresenceStore};
