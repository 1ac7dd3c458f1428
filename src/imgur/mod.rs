//! Imgur image hosting.

pub mod client;

pub use client::ImgurClient;
