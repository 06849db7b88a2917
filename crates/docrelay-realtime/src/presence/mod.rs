//! Document presence: routing viewer actions to the right users.

pub mod router;

pub use router::PresenceRouter;
