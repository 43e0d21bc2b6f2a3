//! Authenticated request coordinator.
//!
//! Wraps every outgoing call: attaches the bearer token, classifies
//! failures, and on an expired access token performs a single coordinated
//! refresh. Requests that hit a 401 while a refresh is already in flight
//! are parked in a queue and replayed (or rejected) when that refresh
//! concludes, so one expiry episode causes exactly one refresh call no
//! matter how many requests it catches.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use cardlink_domain::{ApiRequest, ApiResponse, Envelope, RequestBody, TokenPair};
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::credentials::CredentialStore;
use crate::error::{ApiError, ApiResult};
use crate::ports::HttpTransport;

const REFRESH_PATH: &str = "/auth/refresh-token";

/// A request parked while a refresh is in flight, together with the handle
/// that settles its caller.
struct PendingRequest {
    request: ApiRequest,
    tx: oneshot::Sender<ApiResult<ApiResponse>>,
}

#[derive(Default)]
struct RefreshState {
    /// True exactly while one refresh call is outstanding.
    refreshing: bool,
    /// Requests to replay when the in-flight refresh concludes, FIFO.
    queue: Vec<PendingRequest>,
}

/// What a 401 request becomes when it joins a refresh episode.
enum EpisodeRole {
    /// Won the race: must perform the refresh and settle the queue.
    Lead(ApiRequest),
    /// A refresh was already in flight: wait for the lead to settle us.
    Follower(oneshot::Receiver<ApiResult<ApiResponse>>),
}

/// Dispatches requests with credential attachment and single-flight
/// token refresh.
///
/// Construct one per process and share it (via [`Arc`]) across all
/// endpoint services; the single-flight guarantee only holds within one
/// coordinator instance.
pub struct RequestCoordinator {
    transport: Arc<dyn HttpTransport>,
    credentials: CredentialStore,
    refresh: Mutex<RefreshState>,
}

impl RequestCoordinator {
    /// Creates a coordinator over the given transport and credential store.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: CredentialStore) -> Self {
        Self {
            transport,
            credentials,
            refresh: Mutex::new(RefreshState::default()),
        }
    }

    /// The credential store this coordinator reads from and updates.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Dispatches a request, attaching the current access token if one is
    /// held, and runs the full failure-classification protocol on the
    /// response.
    ///
    /// # Errors
    ///
    /// Any non-2xx outcome maps into [`ApiError`]; the only recovery ever
    /// attempted is a token refresh for a first-time 401.
    pub async fn dispatch(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let mut request = request;
        if let Some(token) = self.credentials.access_token().await {
            request.set_bearer(&token);
        }

        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            return Ok(response);
        }
        if response.status == 401 && !request.retried {
            return self.recover(request).await;
        }
        Err(Self::failure(&response))
    }

    /// Handles a first-time 401: join the current refresh episode either
    /// as the lead (performing the refresh) or as a follower (parked until
    /// the lead settles us).
    async fn recover(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        request.retried = true;
        match self.join_episode(request) {
            EpisodeRole::Follower(rx) => rx.await.unwrap_or_else(|_| {
                Err(ApiError::AuthExpired {
                    message: "refresh episode aborted".to_string(),
                })
            }),
            EpisodeRole::Lead(request) => self.lead_refresh(request).await,
        }
    }

    /// Check-and-set of the refresh flag and the enqueue both happen under
    /// one lock acquisition, with no await point in between: only one
    /// request can ever win the race to refresh.
    fn join_episode(&self, request: ApiRequest) -> EpisodeRole {
        let mut state = self.lock_state();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.queue.push(PendingRequest { request, tx });
            EpisodeRole::Follower(rx)
        } else {
            state.refreshing = true;
            EpisodeRole::Lead(request)
        }
    }

    async fn lead_refresh(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        tracing::debug!(path = %request.path, "access token rejected; refreshing");
        let outcome = self.refresh_tokens().await;

        // Drain and clear in one critical section: an enqueue attempt
        // either landed before this point and is settled below, or finds
        // the flag cleared and starts a new episode. Runs on every outcome
        // path, so the flag can never stay stuck.
        let waiters = {
            let mut state = self.lock_state();
            state.refreshing = false;
            std::mem::take(&mut state.queue)
        };

        match outcome {
            Ok(pair) => {
                self.credentials.update_tokens(&pair).await;
                tracing::debug!(queued = waiters.len(), "refresh succeeded; replaying");
                for waiter in waiters {
                    let result = self.replay(waiter.request, &pair.access_token).await;
                    let _ = waiter.tx.send(result);
                }
                self.replay(request, &pair.access_token).await
            }
            Err(message) => {
                tracing::warn!("token refresh failed: {message}; clearing session");
                self.credentials.logout().await;
                for waiter in waiters {
                    let _ = waiter.tx.send(Err(ApiError::AuthExpired {
                        message: message.clone(),
                    }));
                }
                Err(ApiError::AuthExpired { message })
            }
        }
    }

    /// Re-dispatches a request with the freshly obtained token. The
    /// request is already marked retried, so another 401 surfaces as a
    /// plain HTTP error instead of triggering a second refresh.
    async fn replay(&self, mut request: ApiRequest, token: &str) -> ApiResult<ApiResponse> {
        request.set_bearer(token);
        let response = self.transport.execute(&request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(Self::failure(&response))
        }
    }

    /// Issues the single refresh call for this episode. The stored refresh
    /// token travels as the named cookie the service expects.
    async fn refresh_tokens(&self) -> Result<TokenPair, String> {
        let mut request = ApiRequest::post(REFRESH_PATH, RequestBody::None);
        if let Some(refresh) = self.credentials.refresh_token().await {
            request = request.with_header("Cookie", format!("refresh_token={refresh}"));
        }

        let response = self
            .transport
            .execute(&request)
            .await
            .map_err(|err| err.to_string())?;
        if !response.is_success() {
            return Err(format!("refresh endpoint answered {}", response.status));
        }
        let envelope: Envelope<TokenPair> = response
            .json()
            .map_err(|err| format!("malformed refresh response: {err}"))?;
        Ok(envelope.data)
    }

    /// Maps a non-2xx response into the error taxonomy.
    fn failure(response: &ApiResponse) -> ApiError {
        if response.status == 403 {
            let payload = response
                .json()
                .unwrap_or_else(|_| serde_json::Value::String(response.text()));
            return ApiError::Forbidden { payload };
        }

        let body: Option<ErrorBody> = response.json().ok();
        if matches!(response.status, 400 | 422)
            && let Some(fields) = body.as_ref().and_then(|b| b.errors.clone())
            && !fields.is_empty()
        {
            return ApiError::Validation {
                message: body
                    .and_then(|b| b.message())
                    .unwrap_or_else(|| "validation failed".to_string()),
                fields,
            };
        }

        let message = body
            .and_then(|b| b.message())
            .unwrap_or_else(|| response.text());
        ApiError::Http {
            status: response.status,
            message,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RefreshState> {
        self.refresh.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RequestCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCoordinator").finish_non_exhaustive()
    }
}

/// Shape the service uses for error payloads.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cardlink_domain::SessionCookies;
    use serde_json::json;

    use super::*;
    use crate::testing::{MemoryCache, MockTransport, enveloped, json_response};

    const REFRESH: &str = "/auth/refresh-token";

    /// Coordinator over a fresh mock transport, hydrated with T1/R1.
    async fn authed_coordinator() -> (Arc<MockTransport>, RequestCoordinator) {
        let transport = Arc::new(MockTransport::new());
        let cache = Arc::new(MemoryCache::with_cookies(SessionCookies {
            access_token: Some("T1".to_string()),
            refresh_token: Some("R1".to_string()),
            user_id: None,
        }));
        let store = CredentialStore::new(cache);
        store.hydrate().await;
        let coordinator = RequestCoordinator::new(Arc::clone(&transport) as _, store);
        (transport, coordinator)
    }

    /// Responds 401 to the stale token, 200 to the fresh one.
    fn until_refreshed(path: &'static str) -> impl Fn(&ApiRequest) -> Result<ApiResponse, crate::ports::TransportError>
    {
        move |request| {
            if request.header("Authorization") == Some("Bearer T2") {
                Ok(enveloped(200, json!({ "path": path })))
            } else {
                Ok(json_response(401, json!({ "message": "token expired" })))
            }
        }
    }

    fn refresh_ok(transport: &MockTransport) {
        transport.route(REFRESH, |_| {
            Ok(enveloped(
                200,
                json!({ "accessToken": "T2", "refreshToken": "R2" }),
            ))
        });
    }

    #[tokio::test]
    async fn test_success_returns_body_directly() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/user/me", |_| Ok(enveloped(200, json!({ "id": "u1" }))));

        let response = coordinator.dispatch(ApiRequest::get("/user/me")).await.unwrap();
        assert_eq!(response.status, 200);

        // The stored token was attached as a bearer header.
        let sent = transport.requests();
        assert_eq!(sent[0].header("Authorization"), Some("Bearer T1"));
    }

    #[tokio::test]
    async fn test_single_flight_refresh() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", until_refreshed("/a"));
        transport.route("/b", until_refreshed("/b"));
        transport.route("/c", until_refreshed("/c"));
        refresh_ok(&transport);
        // Hold the refresh open so B and C pile up behind it.
        transport.delay(REFRESH, Duration::from_millis(50));

        let (a, b, c) = tokio::join!(
            coordinator.dispatch(ApiRequest::get("/a")),
            coordinator.dispatch(ApiRequest::get("/b")),
            coordinator.dispatch(ApiRequest::get("/c")),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(transport.calls_to(REFRESH), 1);

        let cred = coordinator.credentials().snapshot().await;
        assert_eq!(cred.access_token.as_deref(), Some("T2"));
        assert_eq!(cred.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_queue_replays_fifo_with_new_token_original_last() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", until_refreshed("/a"));
        transport.route("/b", until_refreshed("/b"));
        transport.route("/c", until_refreshed("/c"));
        refresh_ok(&transport);
        transport.delay(REFRESH, Duration::from_millis(50));

        let _ = tokio::join!(
            coordinator.dispatch(ApiRequest::get("/a")),
            coordinator.dispatch(ApiRequest::get("/b")),
            coordinator.dispatch(ApiRequest::get("/c")),
        );

        // Replays carry the fresh token: queued requests first (in enqueue
        // order), the request that triggered the refresh last.
        let replayed: Vec<String> = transport
            .requests()
            .iter()
            .filter(|r| r.header("Authorization") == Some("Bearer T2"))
            .map(|r| r.path.clone())
            .collect();
        assert_eq!(replayed, vec!["/b", "/c", "/a"]);
    }

    #[tokio::test]
    async fn test_no_second_retry_when_replay_fails_again() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", |_| {
            Ok(json_response(401, json!({ "message": "still expired" })))
        });
        refresh_ok(&transport);

        let err = coordinator.dispatch(ApiRequest::get("/a")).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
        // One original attempt, one replay, one refresh. Nothing more.
        assert_eq!(transport.calls_to("/a"), 2);
        assert_eq!(transport.calls_to(REFRESH), 1);
    }

    #[tokio::test]
    async fn test_queue_drains_and_session_clears_on_refresh_failure() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", until_refreshed("/a"));
        transport.route("/b", until_refreshed("/b"));
        transport.route(REFRESH, |_| {
            Ok(json_response(401, json!({ "message": "refresh rejected" })))
        });
        transport.delay(REFRESH, Duration::from_millis(50));

        let (a, b) = tokio::join!(
            coordinator.dispatch(ApiRequest::get("/a")),
            coordinator.dispatch(ApiRequest::get("/b")),
        );

        assert!(a.unwrap_err().is_auth_expired());
        assert!(b.unwrap_err().is_auth_expired());
        assert_eq!(transport.calls_to(REFRESH), 1);
        assert!(coordinator.credentials().access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_unauthenticated_request_has_no_bearer_and_still_refreshes() {
        let transport = Arc::new(MockTransport::new());
        let store = CredentialStore::new(Arc::new(MemoryCache::default()));
        store.hydrate().await;
        let coordinator = RequestCoordinator::new(Arc::clone(&transport) as _, store);

        transport.route("/user/me", until_refreshed("/user/me"));
        refresh_ok(&transport);

        let result = coordinator.dispatch(ApiRequest::get("/user/me")).await;
        assert!(result.is_ok());

        let sent = transport.requests();
        assert_eq!(sent[0].header("Authorization"), None);
        // No refresh token stored, so the refresh call carries no cookie.
        assert_eq!(sent[1].path, REFRESH);
        assert_eq!(sent[1].header("Cookie"), None);
        assert_eq!(transport.calls_to(REFRESH), 1);
    }

    #[tokio::test]
    async fn test_refresh_call_carries_refresh_cookie() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", until_refreshed("/a"));
        refresh_ok(&transport);

        coordinator.dispatch(ApiRequest::get("/a")).await.unwrap();

        let refresh_calls: Vec<ApiRequest> = transport
            .requests()
            .into_iter()
            .filter(|r| r.path == REFRESH)
            .collect();
        assert_eq!(refresh_calls[0].header("Cookie"), Some("refresh_token=R1"));
    }

    #[tokio::test]
    async fn test_forbidden_never_refreshes_or_enqueues() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/admin", |_| {
            Ok(json_response(403, json!({ "error": "not yours" })))
        });

        for _ in 0..2 {
            let err = coordinator.dispatch(ApiRequest::get("/admin")).await.unwrap_err();
            let ApiError::Forbidden { payload } = err else {
                panic!("expected Forbidden");
            };
            assert_eq!(payload["error"], "not yours");
        }
        assert_eq!(transport.calls_to(REFRESH), 0);
    }

    #[tokio::test]
    async fn test_validation_payload_surfaces_fields() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/card/create-card", |_| {
            Ok(json_response(
                422,
                json!({
                    "message": "validation failed",
                    "errors": { "job": ["must not be empty"] }
                }),
            ))
        });

        let err = coordinator
            .dispatch(ApiRequest::post("/card/create-card", RequestBody::None))
            .await
            .unwrap_err();
        let ApiError::Validation { fields, .. } = err else {
            panic!("expected Validation");
        };
        assert_eq!(fields["job"], vec!["must not be empty"]);
    }

    #[tokio::test]
    async fn test_server_error_surfaces_unchanged() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", |_| Ok(json_response(500, json!({ "message": "boom" }))));

        let err = coordinator.dispatch(ApiRequest::get("/a")).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert_eq!(transport.calls_to(REFRESH), 0);
    }

    #[tokio::test]
    async fn test_new_episode_after_flag_clears() {
        let (transport, coordinator) = authed_coordinator().await;
        transport.route("/a", until_refreshed("/a"));
        refresh_ok(&transport);
        coordinator.dispatch(ApiRequest::get("/a")).await.unwrap();
        assert_eq!(transport.calls_to(REFRESH), 1);

        // Expire T2 as well: the next 401 starts a brand-new episode.
        transport.route("/a", |request| {
            if request.header("Authorization") == Some("Bearer T3") {
                Ok(enveloped(200, json!({})))
            } else {
                Ok(json_response(401, json!({ "message": "token expired" })))
            }
        });
        transport.route(REFRESH, |_| {
            Ok(enveloped(
                200,
                json!({ "accessToken": "T3", "refreshToken": "R3" }),
            ))
        });

        coordinator.dispatch(ApiRequest::get("/a")).await.unwrap();
        assert_eq!(transport.calls_to(REFRESH), 2);
        assert_eq!(
            coordinator.credentials().access_token().await.as_deref(),
            Some("T3")
        );
    }
}
