use crate::catalog::PriceFormat;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Vitrina
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(rename = "site", default)]
    pub sites: Vec<SiteConfig>,
}

/// Crawl timing and retry configuration
///
/// All durations are in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// How long to wait for category links on the home page at startup
    #[serde(rename = "startup-timeout", default = "default_startup_timeout")]
    pub startup_timeout: u64,

    /// How long to wait for listing elements on a category page
    #[serde(rename = "listing-timeout", default = "default_listing_timeout")]
    pub listing_timeout: u64,

    /// How long to wait for the old pager to go stale after clicking "next"
    #[serde(rename = "pager-stale-timeout", default = "default_pager_stale_timeout")]
    pub pager_stale_timeout: u64,

    /// Pause after a page change before reading the new listing
    #[serde(rename = "stabilization-pause", default = "default_stabilization_pause")]
    pub stabilization_pause: u64,

    /// Pause after a forced reload
    #[serde(rename = "reload-pause", default = "default_reload_pause")]
    pub reload_pause: u64,

    /// Additional listing attempts after the first timeout on a page
    #[serde(rename = "max-listing-retries", default = "default_max_listing_retries")]
    pub max_listing_retries: u32,

    /// How long to wait for the SKU element on a product detail page
    #[serde(rename = "sku-timeout", default = "default_sku_timeout")]
    pub sku_timeout: u64,

    /// Whether products are enriched with a SKU from their detail page
    #[serde(rename = "sku-mode", default)]
    pub sku_mode: SkuMode,
}

/// SKU enrichment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkuMode {
    /// Open each product's detail page in an isolated context during the sweep
    #[default]
    Inline,

    /// Never visit detail pages; `sku` stays null
    Disabled,
}

/// Browser launch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window
    #[serde(default)]
    pub headless: bool,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,

    /// Extra command line arguments passed to the browser
    #[serde(default = "default_browser_args")]
    pub args: Vec<String>,

    /// Path to the Chrome/Chromium executable (auto-detected when absent)
    #[serde(default)]
    pub executable: Option<String>,
}

/// A target storefront
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Selector name used on the command line (e.g. "s6")
    pub name: String,

    /// Page the crawl starts from and returns to between categories
    #[serde(rename = "home-url")]
    pub home_url: String,

    #[serde(default)]
    pub selectors: SiteSelectors,

    #[serde(default)]
    pub price: PriceFormat,
}

/// DOM selectors for one storefront layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiteSelectors {
    /// Category links on the home page
    #[serde(default = "default_category_selector")]
    pub category: String,

    /// One product card on a listing page
    #[serde(default = "default_product_selector")]
    pub product: String,

    /// Region holding the pagination controls
    #[serde(default = "default_pager_selector")]
    pub pager: String,

    /// Label of the "next page" control inside the pager
    #[serde(rename = "next-page-text", default = "default_next_page_text")]
    pub next_page_text: String,

    /// Product title, relative to a card
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Price label, relative to a card
    #[serde(default = "default_price_selector")]
    pub price: String,

    /// Product detail link, relative to a card
    #[serde(default = "default_link_selector")]
    pub link: String,

    /// SKU element on a product detail page
    #[serde(default = "default_sku_selector")]
    pub sku: String,

    /// Text that must precede the barcode inside the SKU element
    #[serde(rename = "sku-label", default = "default_sku_label")]
    pub sku_label: String,
}

impl CrawlerConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout)
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_millis(self.listing_timeout)
    }

    pub fn pager_stale_timeout(&self) -> Duration {
        Duration::from_millis(self.pager_stale_timeout)
    }

    pub fn stabilization_pause(&self) -> Duration {
        Duration::from_millis(self.stabilization_pause)
    }

    pub fn reload_pause(&self) -> Duration {
        Duration::from_millis(self.reload_pause)
    }

    pub fn sku_timeout(&self) -> Duration {
        Duration::from_millis(self.sku_timeout)
    }
}

impl Config {
    /// Looks up a site by its selector name
    pub fn site(&self, name: &str) -> Result<&SiteConfig, crate::ConfigError> {
        self.sites
            .iter()
            .find(|site| site.name == name)
            .ok_or_else(|| crate::ConfigError::UnknownSite {
                name: name.to_string(),
                known: self.site_names().join(", "),
            })
    }

    /// Returns the names of all configured sites
    pub fn site_names(&self) -> Vec<&str> {
        self.sites.iter().map(|site| site.name.as_str()).collect()
    }
}

impl Default for Config {
    /// The built-in configuration: two retail storefronts sharing one layout
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            browser: BrowserConfig::default(),
            sites: vec![
                SiteConfig::with_defaults("s6", "http://www.superseis.com.py/default.aspx"),
                SiteConfig::with_defaults("stock", "http://www.stock.com.py/default.aspx"),
            ],
        }
    }
}

impl SiteConfig {
    /// Creates a site using the default storefront selectors and price format
    pub fn with_defaults(name: &str, home_url: &str) -> Self {
        Self {
            name: name.to_string(),
            home_url: home_url.to_string(),
            selectors: SiteSelectors::default(),
            price: PriceFormat::default(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            startup_timeout: default_startup_timeout(),
            listing_timeout: default_listing_timeout(),
            pager_stale_timeout: default_pager_stale_timeout(),
            stabilization_pause: default_stabilization_pause(),
            reload_pause: default_reload_pause(),
            max_listing_retries: default_max_listing_retries(),
            sku_timeout: default_sku_timeout(),
            sku_mode: SkuMode::default(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: default_window_width(),
            window_height: default_window_height(),
            args: default_browser_args(),
            executable: None,
        }
    }
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            category: default_category_selector(),
            product: default_product_selector(),
            pager: default_pager_selector(),
            next_page_text: default_next_page_text(),
            title: default_title_selector(),
            price: default_price_selector(),
            link: default_link_selector(),
            sku: default_sku_selector(),
            sku_label: default_sku_label(),
        }
    }
}

fn default_startup_timeout() -> u64 {
    10_000
}

fn default_listing_timeout() -> u64 {
    15_000
}

fn default_pager_stale_timeout() -> u64 {
    15_000
}

fn default_stabilization_pause() -> u64 {
    2_000
}

fn default_reload_pause() -> u64 {
    3_000
}

fn default_max_listing_retries() -> u32 {
    3
}

fn default_sku_timeout() -> u64 {
    5_000
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_browser_args() -> Vec<String> {
    vec!["--disable-gpu".to_string(), "--no-sandbox".to_string()]
}

fn default_category_selector() -> String {
    "a[href*='/category/']".to_string()
}

fn default_product_selector() -> String {
    ".product-item".to_string()
}

fn default_pager_selector() -> String {
    ".product-pager-box".to_string()
}

fn default_next_page_text() -> String {
    "Siguiente".to_string()
}

fn default_title_selector() -> String {
    ".product-title a".to_string()
}

fn default_price_selector() -> String {
    ".price-label".to_string()
}

fn default_link_selector() -> String {
    ".product-title-link".to_string()
}

fn default_sku_selector() -> String {
    ".sku".to_string()
}

fn default_sku_label() -> String {
    "Código de Barras".to_string()
}
