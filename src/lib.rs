//! Vitrina: a storefront catalog crawler
//!
//! This crate drives a rendered web storefront through a browser automation
//! channel, walks every category listing page by page, and streams one
//! structured product record per listing card to an output sink.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod dom;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Vitrina operations
#[derive(Debug, Error)]
pub enum VitrinaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Dom(#[from] dom::DomError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Category {url} failed: {reason}")]
    CategoryFatal { url: String, reason: String },

    #[error("Category discovery failed: {0}")]
    Discovery(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SweepState,
        to: state::SweepState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VitrinaError {
    /// Returns true if this error must abort the whole run rather than
    /// only the category that produced it
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, Self::Output(_) | Self::Io(_) | Self::Config(_))
    }
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

    #[error("Unknown site '{name}' (configured: {known})")]
    UnknownSite { name: String, known: String },
}

/// Errors that abort the extraction of a single listing element
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No {kind} id in URL: {url}")]
    MalformedUrl {
        url: String,
        kind: catalog::IdKind,
    },

    #[error("Invalid price text: {text:?}")]
    InvalidPrice { text: String },

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Element {selector} has no {attribute} attribute")]
    MissingAttribute { selector: String, attribute: String },

    #[error("Browser error: {0}")]
    Dom(#[from] dom::DomError),
}

/// Result type alias for Vitrina operations
pub type Result<T> = std::result::Result<T, VitrinaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use catalog::{CategoryRef, Product};
pub use config::Config;
pub use dom::DomAccessor;
pub use state::SweepState;
