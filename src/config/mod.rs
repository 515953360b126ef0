//! Configuration module for shaarli-client
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use shaarli_client::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shaarli.toml")).unwrap();
//! println!("Client will talk to: {}", config.shaarli.endpoint);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ShaarliConfig, TemplateEntry, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
