//! Product-Scout: a headless-browser product URL discoverer
//!
//! This crate renders storefront pages in a headless browser, scrolls them until
//! lazy-loaded content stops arriving, and keeps every link that looks like a
//! product-detail page.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Product-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {timeout_ms}ms waiting for {url}")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Invalid product pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
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

    #[error("Invalid product pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised at the browser engine boundary
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open page: {0}")]
    Page(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {timeout_ms}ms: {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Browser connection closed: {0}")]
    Closed(String),
}

impl BrowserError {
    /// Returns true if this error is a timeout rather than a hard failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for Product-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for browser operations
pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

// Re-export commonly used types
pub use config::Config;
pub use output::CrawlResult;
pub use state::CrawlPhase;
pub use crate::url::{classify, extract_urls, ProductPatterns};
