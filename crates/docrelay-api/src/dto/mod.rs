//! Request and response bodies.

pub mod request;
pub mod response;

pub use request::CreateNotificationRequest;
pub use response::{ApiResponse, HealthResponse, MarkAllReadResponse};
