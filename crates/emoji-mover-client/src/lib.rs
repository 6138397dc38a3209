//! emoji-mover client - HTTP clients for external services
//!
//! This crate provides the concrete I/O behind the core pipeline:
//!
//! - [`slack`] - the source workspace's emoji listing API
//! - [`images`] - plain HTTP image downloads
//! - [`browser`] - a cookie-backed HTML session for the destination admin UI

pub mod browser;
mod http;
pub mod images;
pub mod slack;

// Re-export main client types
pub use browser::HttpBrowser;
pub use images::HttpImageSource;
pub use slack::{SlackApiClient, DEFAULT_API_BASE};
