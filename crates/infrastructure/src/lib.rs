//! Cardlink Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: a reqwest-backed HTTP transport and a
//! file-backed cookie cache.

pub mod http;
pub mod persistence;

pub use http::ReqwestTransport;
pub use persistence::FileCookieCache;
