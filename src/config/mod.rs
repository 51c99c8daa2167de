//! Configuration module for Product-Scout
//!
//! Every setting has a built-in default, so a configuration file is optional.
//! When one is given it is parsed as TOML and validated before use.
//!
//! # Example
//!
//! ```no_run
//! use product_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Crawling {} domains", config.domains.len());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    BrowserConfig, Config, CrawlerConfig, OutputConfig, DEFAULT_DOMAINS,
    DEFAULT_INDICATOR_SELECTORS, DEFAULT_PRODUCT_PATTERNS, DEFAULT_USER_AGENT,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
