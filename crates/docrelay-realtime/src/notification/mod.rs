//! Notification feed rendering and delivery.

pub mod formatter;
pub mod service;

pub use formatter::{DisplayNotification, format_time_ago};
pub use service::{NotificationService, PushMode};
