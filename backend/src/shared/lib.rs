// Declare modules at the root level
pub mod advice;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod feed_parser;
pub mod ingestor;
pub mod random;
pub mod snapshot;
pub mod source;
pub mod thresholds;
pub mod time;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::advice;
    pub use super::domain;
    pub use super::error;
    pub use super::fallback;
    pub use super::feed_parser;
    pub use super::ingestor;
    pub use super::random;
    pub use super::snapshot;
    pub use super::source;
    pub use super::thresholds;
    pub use super::time;
}

// Also re-export the commonly used items at root for convenience
pub use advice::{recommend, Recommendation, Urgency};
pub use domain::*;
pub use error::*;
pub use fallback::{FallbackData, Scenario};
pub use feed_parser::parse_feed;
pub use ingestor::*;
pub use random::*;
pub use source::*;
pub use thresholds::*;
pub use time::*;
