//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod reconnect;
pub mod types;

pub use messages::{Attachment, DestUpdate, InboundMessage, Origin, StreamEvent};
pub use types::{DestinationId, Identity, Platform, StreamStatus};
