//! Client-side query cache.
//!
//! Collections fetched from the support API live here, keyed by resource and
//! params. Mutations invalidate by key prefix; logout clears everything.

mod cache;
mod key;

pub use cache::{CacheEvent, CachePolicy, QueryCache};
pub use key::{keys, QueryKey};
