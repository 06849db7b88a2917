//! PostgreSQL implementations of the store traits.

pub mod notification;
pub mod presence;

pub use notification::NotificationRepository;
pub use presence::PresenceRepository;
