//! Gitter platform adapter.

pub mod client;

pub use client::GitterClient;
