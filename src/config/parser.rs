//! Configuration loading
//!
//! A configuration file is read once; its SHA-256 is computed from the same
//! bytes that were parsed, so the logged hash always matches the run.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use vitrina::config::load_config;
///
/// let config = load_config(Path::new("vitrina.toml")).unwrap();
/// println!("Sites: {:?}", config.site_names());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_hash(path).map(|(config, _)| config)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads a configuration together with the hash of the exact text parsed
///
/// # Returns
///
/// * `Ok((Config, String))` - The validated configuration and its hash
/// * `Err(ConfigError)` - The file could not be read, parsed, or validated
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, content_hash(content.as_bytes())))
}

fn content_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
