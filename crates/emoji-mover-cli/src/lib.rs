//! emoji-mover CLI - command-line interface that runs the migration
//!
//! This crate provides the binary that ties the core pipeline to the HTTP
//! clients.

pub mod config;

pub use config::{Config, DEFAULT_LOG_FILE};
