//! Response caching for external calls.
//!
//! - `CacheKey`: stable SHA-256 content key for a prompt and its parameters
//! - `ResponseCache`: TTL store with single-flight computation per key

pub mod key;
pub mod response;

pub use key::CacheKey;
pub use response::{CacheEntry, CacheStats, ResponseCache};
