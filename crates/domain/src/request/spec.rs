//! Request specification type.

use serde::{Deserialize, Serialize};

use super::{HttpMethod, RequestBody};

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Authorization").
    pub name: String,
    /// The header value.
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Description of an outgoing API call, relative to the service base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path under the API base (e.g. `/auth/login`).
    pub path: String,
    /// Extra headers beyond what the transport adds.
    pub headers: Vec<Header>,
    /// Request body.
    pub body: RequestBody,
    /// Set once this request has been replayed after a token refresh.
    /// Prevents a second refresh attempt for the same request.
    pub retried: bool,
}

impl ApiRequest {
    /// Creates a GET request for the given path.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path, RequestBody::None)
    }

    /// Creates a POST request for the given path.
    #[must_use]
    pub fn post(path: impl Into<String>, body: RequestBody) -> Self {
        Self::new(HttpMethod::Post, path, body)
    }

    /// Creates a PUT request for the given path.
    #[must_use]
    pub fn put(path: impl Into<String>, body: RequestBody) -> Self {
        Self::new(HttpMethod::Put, path, body)
    }

    /// Creates a request with the given method, path and body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body,
            retried: false,
        }
    }

    /// Adds a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Sets (or replaces) the bearer `Authorization` header.
    pub fn set_bearer(&mut self, token: &str) {
        self.remove_header("Authorization");
        self.headers
            .push(Header::new("Authorization", format!("Bearer {token}")));
    }

    /// Returns the value of a header, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    fn remove_header(&mut self, name: &str) {
        self.headers.retain(|h| !h.name.eq_ignore_ascii_case(name));
    }
}
