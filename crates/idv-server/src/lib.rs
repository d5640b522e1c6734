//! IDV Server: HTTP front end for the verification dashboard.

pub mod config;
pub mod http;

pub use config::{ConfigError, ServerConfig};
