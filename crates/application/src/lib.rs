//! Cardlink Application - Request coordination and endpoint services
//!
//! This crate holds the credential store, the authenticated request
//! coordinator, the typed endpoint services, and the ports those pieces
//! depend on. Concrete I/O lives in the infrastructure crate.

pub mod api;
pub mod coordinator;
pub mod credentials;
pub mod error;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{AuthApi, CardApi, UploadApi, UserApi};
pub use coordinator::RequestCoordinator;
pub use credentials::CredentialStore;
pub use error::{ApiError, ApiResult};
