//! Test doubles shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use cardlink_domain::{ApiRequest, ApiResponse, SessionCookies};

use crate::ports::{CacheError, CredentialCache, HttpTransport, TransportError};

type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync>;

/// Scriptable transport: routes are exact path matches, every dispatched
/// request is recorded for later inspection.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Responder>>,
    delays: Mutex<HashMap<String, Duration>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a responder for an exact path.
    pub fn route(
        &self,
        path: &str,
        responder: impl Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) {
        self.lock(&self.routes)
            .insert(path.to_string(), Box::new(responder));
    }

    /// Delays every response from the given path, to hold a refresh open
    /// while other requests pile up.
    pub fn delay(&self, path: &str, delay: Duration) {
        self.lock(&self.delays).insert(path.to_string(), delay);
    }

    /// Every request dispatched so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock(&self.log).clone()
    }

    /// Number of requests dispatched to the given path.
    pub fn calls_to(&self, path: &str) -> usize {
        self.lock(&self.log)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let delay = self.lock(&self.delays).get(&request.path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lock(&self.log).push(request.clone());
        let routes = self.lock(&self.routes);
        routes.get(&request.path).map_or_else(
            || Err(TransportError::Other(format!("no route for {}", request.path))),
            |responder| responder(request),
        )
    }
}

/// JSON response with the service's `data` envelope.
pub fn enveloped(status: u16, data: serde_json::Value) -> ApiResponse {
    let body = serde_json::json!({ "data": data });
    ApiResponse::new(status, HashMap::new(), body.to_string().into_bytes())
}

/// Raw JSON response without the envelope.
pub fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(status, HashMap::new(), body.to_string().into_bytes())
}

/// In-memory credential cache.
#[derive(Default)]
pub struct MemoryCache {
    cookies: Mutex<SessionCookies>,
}

impl MemoryCache {
    pub fn with_cookies(cookies: SessionCookies) -> Self {
        Self {
            cookies: Mutex::new(cookies),
        }
    }

    pub async fn set(&self, cookies: SessionCookies) {
        *self.guard() = cookies;
    }

    pub async fn current(&self) -> SessionCookies {
        self.guard().clone()
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, SessionCookies> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CredentialCache for MemoryCache {
    async fn load(&self) -> Result<SessionCookies, CacheError> {
        Ok(self.guard().clone())
    }

    async fn store(&self, cookies: &SessionCookies) -> Result<(), CacheError> {
        *self.guard() = cookies.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        *self.guard() = SessionCookies::default();
        Ok(())
    }
}
