//! Type-safe Key-Value caching layer for Verdant.
//!
//! Stores any serde type as JSON, either in memory or as one file per key
//! in a directory. Checkout uses it for the pending-order hand-off of
//! wallet-redirect payments and the admin tools keep sessions in it.
//!
//! # Example
//!
//! ```rust,ignore
//! use verdant_cache::{cache_key, Cache};
//!
//! let cache = Cache::open_dir(".verdant/state")?;
//!
//! // Store a value
//! cache.set(&cache_key!("pending_order", order.order_id), &order)?;
//!
//! // Retrieve a value
//! let order: Option<CheckoutOrder> = cache.get("pending_order:ORD-1")?;
//!
//! // Delete a value
//! cache.delete("pending_order:ORD-1")?;
//! ```

mod error;
mod kv;
mod store;

pub use error::CacheError;
pub use kv::Cache;
pub use store::{FileStore, KvStore, MemoryStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError, KvStore};
}
