//! # docrelay-entity
//!
//! Domain entity models for DocRelay. Every struct in this crate is either
//! a persisted row (notifications, presence records) or a value object
//! exchanged with the identity directory. Database entities additionally
//! derive `sqlx::FromRow`.

pub mod notification;
pub mod presence;
pub mod user;
