//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external
//! systems. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod credential_cache;
mod http_transport;

pub use credential_cache::{CacheError, CredentialCache};
pub use http_transport::{HttpTransport, TransportError};
