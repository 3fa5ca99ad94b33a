//! Output module for emitting products and reporting on a crawl
//!
//! This module handles:
//! - Streaming extracted products to a sink (JSON Lines files)
//! - Recording crawl statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use stats::{print_statistics, CategoryOutcome, CrawlStatistics};
pub use traits::{OutputError, OutputResult, ProductSink};
