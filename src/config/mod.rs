//! Configuration module for Vitrina
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. When no file is given, [`Config::default`] provides the built-in
//! site registry.
//!
//! # Example
//!
//! ```no_run
//! use vitrina::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("vitrina.toml")).unwrap();
//! let site = config.site("s6").unwrap();
//! println!("Crawl starts at {}", site.home_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, CrawlerConfig, SiteConfig, SiteSelectors, SkuMode};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash, parse_config};
pub use validation::validate;
