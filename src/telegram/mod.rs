//! Telegram platform adapter.

pub mod client;

pub use client::TelegramClient;
