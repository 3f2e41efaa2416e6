//! In-memory cache for dashboard responses
//!
//! This module provides a cache manager that keeps the last successful response
//! per cache key together with the instant it was stored. Freshness is judged
//! against an injected [`Clock`], so tests can move time across the TTL
//! boundary without sleeping. Entries live only as long as the process.

mod clock;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{CacheManager, CachedData};
