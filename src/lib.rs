//! shaarli-client: drive a Shaarli bookmark instance through its HTML pages
//!
//! Shaarli has no API in the versions this crate targets, so every operation
//! is a form submission or a page fetch whose markup is scraped back into
//! [`Link`] records. What to scrape is described by a [`Templates`] registry
//! of selector/attribute/regex triples, so a different theme only needs new
//! templates, not new code.

pub mod client;
pub mod config;
pub mod ids;
pub mod link;
pub mod template;

use thiserror::Error;

/// Main error type for shaarli-client operations
#[derive(Debug, Error)]
pub enum ShaarliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url} (expected {expected})")]
    UnexpectedStatus {
        url: String,
        status: u16,
        expected: u16,
    },

    #[error("No form token found at {url}")]
    MissingToken { url: String },

    #[error("Malformed tag cloud: {0}")]
    MalformedTagCloud(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template '{key}': {message}")]
    InvalidTemplate { key: String, message: String },
}

/// Result type alias for shaarli-client operations
pub type Result<T> = std::result::Result<T, ShaarliError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use client::{LinkPager, Search, ShaarliClient};
pub use config::Config;
pub use ids::{IdFormat, IdGenerator};
pub use link::Link;
pub use template::{Template, Templates};
