//! Message types for the relay and the socket protocol.

pub mod envelope;
pub mod types;

pub use envelope::Envelope;
pub use types::{ActionKind, AddressedMessage, ClientFrame, OutboundMessage, ViewerAction};
