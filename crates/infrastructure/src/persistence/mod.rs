//! Persistence adapters.

mod cookie_cache;

pub use cookie_cache::FileCookieCache;
