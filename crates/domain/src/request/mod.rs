//! Outgoing request description.

mod body;
mod method;
mod spec;

pub use body::RequestBody;
pub use method::HttpMethod;
pub use spec::{ApiRequest, Header};
