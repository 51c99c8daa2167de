//! State module for tracking crawl progress
//!
//! `CrawlPhase` tracks a single domain through navigation, scrolling and its
//! terminal outcome.

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
