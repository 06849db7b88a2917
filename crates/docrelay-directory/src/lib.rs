//! # docrelay-directory
//!
//! Read-only access to the external identity directory: listing users,
//! reading their effective realm roles, and resolving which user holds the
//! administrator role.

pub mod cached;
pub mod fixed;
pub mod keycloak;
pub mod lookup;

pub use cached::CachedDirectory;
pub use fixed::StaticDirectory;
pub use keycloak::KeycloakDirectory;
pub use lookup::DirectoryLookup;
