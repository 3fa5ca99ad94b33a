//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `SweepState`: Tracks the pagination state of one category sweep
//!   (listing, paginating, recovering, done)

mod sweep_state;

// Re-export main types
pub use sweep_state::SweepState;
