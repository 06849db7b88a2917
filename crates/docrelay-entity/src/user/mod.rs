//! Directory user value objects.

pub mod model;

pub use model::{DirectoryUser, UserSummary};
