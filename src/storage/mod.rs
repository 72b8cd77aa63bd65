mod keys;
mod tiered;

pub use keys::{CacheKey, KeyPart, canonical_key};
pub use tiered::{CacheConfig, CacheStore, TieredCache};
