use crate::config::types::{Config, CrawlerConfig, EndpointConfig, FingerprintConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_endpoint_config(&config.endpoint)?;
    validate_fingerprint_config(&config.fingerprint)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl loop settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.pacing_delay_ms < 100 || config.pacing_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "pacing_delay_ms must be between 100 and 60000, got {}ms",
            config.pacing_delay_ms
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates endpoint URLs and request headers
fn validate_endpoint_config(config: &EndpointConfig) -> Result<(), ConfigError> {
    validate_http_url("search_url", &config.search_url)?;
    validate_http_url("nav_url", &config.nav_url)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if !config.referer.is_empty() {
        validate_http_url("referer", &config.referer)?;
    }

    Ok(())
}

fn validate_fingerprint_config(config: &FingerprintConfig) -> Result<(), ConfigError> {
    if config.dm_img_str.is_empty() {
        return Err(ConfigError::Validation(
            "dm_img_str cannot be empty".to_string(),
        ));
    }

    if config.dm_cover_img_str.is_empty() {
        return Err(ConfigError::Validation(
            "dm_cover_img_str cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if !(config.csv || config.json || config.raw_json) {
        return Err(ConfigError::Validation(
            "at least one of csv, json or raw-json must be enabled".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a URL parses and uses an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
