use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the API bearer token
pub const API_KEY_ENV: &str = "BRAWL_STARS_API_KEY";

/// Environment variable holding the seed player tag
pub const PLAYER_TAG_ENV: &str = "BRAWL_STARS_PLAYER_TAG";

/// Loads and parses a configuration file from the given path
///
/// Credentials from the process environment override the file before
/// validation runs.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use battle_ripple::config::load_config;
///
/// let config = load_config(Path::new("ripple.toml")).unwrap();
/// println!("Workers: {}", config.crawler.workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content, |key| std::env::var(key).ok())
}

/// Parses, applies overrides from `lookup`, and validates a configuration
///
/// `lookup` maps an environment variable name to its value.
pub fn load_config_from_str<F>(content: &str, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config = toml::from_str(content)?;
    apply_overrides(&mut config, lookup);
    validate(&config)?;
    Ok(config)
}

/// Replaces the token and seed player with values from `lookup`, if set
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
        config.api.token = Some(token.trim().to_string());
    }

    if let Some(tag) = lookup(PLAYER_TAG_ENV).filter(|v| !v.trim().is_empty()) {
        config.crawler.seed_player = Some(tag.trim().to_string());
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
///
/// `seed_override` replaces the seed player from the file and the
/// environment. The hash covers the file content only.
pub fn load_config_with_hash(
    path: &Path,
    seed_override: Option<&str>,
) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = load_config_from_str(&content, |key| match (key, seed_override) {
        (PLAYER_TAG_ENV, Some(seed)) => Some(seed.to_string()),
        _ => std::env::var(key).ok(),
    })?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
