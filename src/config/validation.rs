use crate::config::parser::{API_KEY_ENV, PLAYER_TAG_ENV};
use crate::config::types::{ApiConfig, Config, CrawlerConfig, FilterConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_api_config(&config.api)?;
    validate_filter_config(&config.filter)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = config.seed_player.as_deref().ok_or_else(|| {
        ConfigError::MissingCredential(format!(
            "no seed player: set crawler.seed-player or {}",
            PLAYER_TAG_ENV
        ))
    })?;
    validate_player_tag(seed)?;

    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.request_timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 100ms, got {}ms",
            config.request_timeout
        )));
    }

    if config.max_players == Some(0) {
        return Err(ConfigError::Validation(
            "max_players must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates a player tag such as `#PLYYP2RRQ`
pub fn validate_player_tag(tag: &str) -> Result<(), ConfigError> {
    let body = tag.strip_prefix('#').ok_or_else(|| {
        ConfigError::Validation(format!("player tag must start with '#', got '{}'", tag))
    })?;

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "player tag must be '#' followed by letters and digits, got '{}'",
            tag
        )));
    }

    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url cannot be used as a base, got '{}'",
            config.base_url
        )));
    }

    match config.token.as_deref() {
        Some(token) if !token.trim().is_empty() => {}
        _ => {
            return Err(ConfigError::MissingCredential(format!(
                "no API token: set api.token or {}",
                API_KEY_ENV
            )))
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.excluded_modes.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_modes cannot contain empty entries".to_string(),
        ));
    }

    // An empty marker would match every event mode
    if config.excluded_markers.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_markers cannot contain empty entries".to_string(),
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

    Ok(())
}
