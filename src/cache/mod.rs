//! Cache module - in-memory expiring state using Moka.
//!
//! Used for short-lived conversational state such as armed `/update`
//! continuations, which must disappear on their own if never completed.
//!
//! ## Usage
//!
//! ```rust
//! let uploads: TypedCache<(ChatId, UserId), ()> =
//!     TypedCache::new("pending_uploads", CacheConfig::with_capacity(64).ttl(timeout));
//!
//! uploads.insert(key, ());
//! let armed = uploads.take(&key).is_some();
//! ```

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
