//! Bidirectional relay engine between Gitter and Telegram.
//!
//! ## Module Structure
//!
//! - `normalize`: Gitter attachment markup to bare URLs
//! - `rehost`: Telegram attachments to Imgur links
//! - `supervisor`: Gitter stream lifecycle
//! - `router`, `state`, `commands`: per-message decisions and the binding
//! - `orchestrator`: main bridge (`Bridge` struct)
//! - `platform`: traits the engine talks to the platforms through

pub mod commands;
pub mod normalize;
pub mod orchestrator;
pub mod platform;
pub mod rehost;
pub mod router;
pub mod state;
pub mod supervisor;

#[cfg(test)]
pub mod testing;

pub use orchestrator::{Bridge, BridgeSettings};
pub use rehost::Rehoster;
