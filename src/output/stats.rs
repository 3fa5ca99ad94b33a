//! Crawl statistics
//!
//! Counters accumulated by the orchestrator during one run, plus a
//! formatted report for the end of the run.

use chrono::{DateTime, Utc};

/// How a category sweep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryOutcome {
    /// Every page was listed
    Completed,

    /// Listing retries ran out; the products seen so far were kept
    Abandoned,

    /// A "next" click did not change the page; later pages were not listed
    Stalled,

    /// An unrecoverable error ended the category
    Failed,
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    pub categories_discovered: u64,
    pub categories_completed: u64,
    pub categories_abandoned: u64,
    pub categories_stalled: u64,
    pub categories_failed: u64,

    /// Listing pages whose elements were handed out
    pub pages_listed: u64,

    /// Reload-and-retry attempts after listing timeouts
    pub listing_retries: u64,

    pub products_emitted: u64,
    pub products_failed: u64,
    pub skus_found: u64,

    /// Category URLs that failed, with the reason
    pub failed_categories: Vec<(String, String)>,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStatistics {
    /// Starts a new statistics record stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            categories_discovered: 0,
            categories_completed: 0,
            categories_abandoned: 0,
            categories_stalled: 0,
            categories_failed: 0,
            pages_listed: 0,
            listing_retries: 0,
            products_emitted: 0,
            products_failed: 0,
            skus_found: 0,
            failed_categories: Vec::new(),
        }
    }

    /// Counts the end of one category sweep
    pub fn record_category(&mut self, outcome: CategoryOutcome) {
        match outcome {
            CategoryOutcome::Completed => self.categories_completed += 1,
            CategoryOutcome::Abandoned => self.categories_abandoned += 1,
            CategoryOutcome::Stalled => self.categories_stalled += 1,
            CategoryOutcome::Failed => self.categories_failed += 1,
        }
    }

    /// Counts a category that failed, keeping its URL and reason
    pub fn record_failed_category(&mut self, url: &str, reason: &str) {
        self.record_category(CategoryOutcome::Failed);
        self.failed_categories
            .push((url.to_string(), reason.to_string()));
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in seconds, if finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Returns the product success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.products_emitted + self.products_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.products_emitted as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Categories:");
    println!("  Discovered: {}", stats.categories_discovered);
    println!("  Completed: {}", stats.categories_completed);
    println!("  Abandoned after retries: {}", stats.categories_abandoned);
    println!("  Stalled pagination: {}", stats.categories_stalled);
    println!("  Failed: {}", stats.categories_failed);
    println!();

    println!("Pages:");
    println!("  Listed: {}", stats.pages_listed);
    println!("  Listing retries: {}", stats.listing_retries);
    println!();

    println!("Products:");
    println!("  Emitted: {}", stats.products_emitted);
    println!("  Failed: {}", stats.products_failed);
    println!("  With SKU: {}", stats.skus_found);
    println!();

    if !stats.failed_categories.is_empty() {
        println!("Failed Categories ({}):", stats.failed_categories.len());
        for (url, reason) in &stats.failed_categories {
            println!("  - {}: {}", url, reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} products extracted)",
        stats.success_rate(),
        stats.products_emitted,
        stats.products_emitted + stats.products_failed
    );
}
