//! Configuration module for Battle-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, with credentials optionally supplied through the environment.
//!
//! # Example
//!
//! ```no_run
//! use battle_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Crawl starts from {:?}", config.crawler.seed_player);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, CrawlerConfig, FilterConfig, GroupingKind, OutputConfig};

// Re-export parser functions
pub use parser::{
    apply_overrides, compute_config_hash, load_config, load_config_from_str,
    load_config_with_hash, API_KEY_ENV, PLAYER_TAG_ENV,
};
pub use validation::{validate, validate_player_tag};
