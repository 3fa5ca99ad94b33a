//! Integration tests for the crawler
//!
//! The crawl runs against `FakeStorefront`, a scripted in-memory DOM that
//! stands in for the browser: categories, listing pages, pagers, listing
//! timeouts and detail pages are all declared per test.

mod enricher_tests;
mod fake_store;
