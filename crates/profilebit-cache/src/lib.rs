pub mod cache;
pub mod invalidation;
pub mod progress_cache;
pub mod storage;

pub use cache::*;
pub use invalidation::*;
pub use progress_cache::*;
pub use storage::*;

// Re-export common types for convenience
pub use profilebit_core::{FormattedProgress, KeyValueStore, ProfileBitError, Result, UserId};
