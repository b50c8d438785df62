//! Subcommand implementations. Each returns what the binary prints.

pub mod config;
pub mod request_id;
pub mod trace;
pub mod version;
