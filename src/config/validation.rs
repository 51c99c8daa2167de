use crate::config::types::{BrowserConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    validate_domains(&config.domains)?;
    validate_patterns(&config.product_patterns)?;
    Ok(())
}

/// Validates scroll loop and retry tunables
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be >= 1".to_string(),
        ));
    }

    if config.max_scroll_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_scroll_attempts must be >= 1, got {}",
            config.max_scroll_attempts
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.indicator_selectors.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "indicator_selectors cannot contain empty selectors".to_string(),
        ));
    }

    Ok(())
}

fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.chrome_executable {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "chrome_executable cannot be an empty path".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates seed domains: absolute http(s) URLs, no duplicates
///
/// Results are keyed by domain, so a repeated entry would silently merge two
/// crawl tasks into one output slot.
fn validate_domains(domains: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for domain in domains {
        let url = Url::parse(domain)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", domain, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain '{}' must use http or https",
                domain
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain '{}' has no host",
                domain
            )));
        }

        if !seen.insert(domain.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Domain '{}' is listed more than once",
                domain
            )));
        }
    }

    Ok(())
}

/// Validates that every product pattern compiles
fn validate_patterns(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        if pattern.is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Product pattern cannot be empty".to_string(),
            ));
        }

        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;
    }

    Ok(())
}
