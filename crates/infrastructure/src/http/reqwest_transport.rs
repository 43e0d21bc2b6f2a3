//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It resolves paths
//! against the configured base URL, encodes JSON and multipart bodies,
//! and hands back whatever the server answered; it never interprets
//! status codes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use cardlink_application::ports::{HttpTransport, TransportError};
use cardlink_domain::{ApiRequest, ApiResponse, HttpMethod, RequestBody};
use reqwest::{Client, Method};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport over `reqwest::Client`.
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for the given base URL (including the API
    /// prefix, e.g. `http://localhost:3000/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot
    /// be created.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        url::Url::parse(base_url)
            .map_err(|err| TransportError::InvalidUrl(format!("{err}: {base_url}")))?;

        let client = Client::builder()
            .user_agent("Cardlink/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|err| TransportError::Other(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves a request path against the base URL.
    fn full_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Attaches the request body to the builder.
    fn build_body(
        builder: reqwest::RequestBuilder,
        body: &RequestBody,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        match body {
            RequestBody::None => Ok(builder),
            RequestBody::Json(value) => Ok(builder.json(value)),
            RequestBody::Multipart {
                field,
                file_name,
                content_type,
                data,
            } => {
                let part = reqwest::multipart::Part::bytes(data.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type)
                    .map_err(|err| TransportError::InvalidBody(err.to_string()))?;
                let form = reqwest::multipart::Form::new().part(field.clone(), part);
                Ok(builder.multipart(form))
            }
        }
    }

    /// Maps reqwest errors to the transport error taxonomy.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return TransportError::ConnectionFailed(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.full_url(&request.path);
        tracing::debug!(method = %request.method, %url, "dispatching request");

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), &url)
            .timeout(self.timeout);

        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }
        builder = Self::build_body(builder, &request.body)?;

        let response = builder
            .send()
            .await
            .map_err(|err| Self::map_error(&err, self.timeout))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| TransportError::Other(format!("failed to read body: {err}")))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body))
    }
}
