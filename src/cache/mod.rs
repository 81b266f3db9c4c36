//! Cache Module
//!
//! Local mirror of the store subtree the change subscriber watches.

mod stats;
mod store;


// Re-export public types
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::CacheStore;
