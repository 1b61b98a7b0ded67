//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: where a link discovery crawl stands (fetching, accumulating, done)
//! - `StopReason`: why a finished crawl stopped

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlState, StopReason};
