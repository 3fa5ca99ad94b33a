use crate::config::types::{Config, CrawlerConfig, SiteConfig, SiteSelectors};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

const MAX_LISTING_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler timings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("startup_timeout", config.startup_timeout),
        ("listing_timeout", config.listing_timeout),
        ("pager_stale_timeout", config.pager_stale_timeout),
        ("sku_timeout", config.sku_timeout),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1ms, got {}ms",
                name, value
            )));
        }
    }

    if config.max_listing_retries > MAX_LISTING_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_listing_retries must be <= {}, got {}",
            MAX_LISTING_RETRIES, config.max_listing_retries
        )));
    }

    Ok(())
}

/// Validates site entries
fn validate_sites(sites: &[SiteConfig]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for site in sites {
        if site.name.is_empty() {
            return Err(ConfigError::Validation(
                "site name cannot be empty".to_string(),
            ));
        }

        if !seen.insert(site.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name '{}'",
                site.name
            )));
        }

        let url = Url::parse(&site.home_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid home-url '{}': {}", site.home_url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "home-url '{}' must use http or https",
                site.home_url
            )));
        }

        validate_selectors(&site.name, &site.selectors)?;
    }

    Ok(())
}

/// Validates that no selector is blank
fn validate_selectors(site: &str, selectors: &SiteSelectors) -> Result<(), ConfigError> {
    for (name, value) in [
        ("category", &selectors.category),
        ("product", &selectors.product),
        ("pager", &selectors.pager),
        ("next-page-text", &selectors.next_page_text),
        ("title", &selectors.title),
        ("price", &selectors.price),
        ("link", &selectors.link),
        ("sku", &selectors.sku),
        ("sku-label", &selectors.sku_label),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}': selector '{}' cannot be empty",
                site, name
            )));
        }
    }
    Ok(())
}
