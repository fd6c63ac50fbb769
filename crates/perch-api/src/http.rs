//! Shared HTTP plumbing for the Perch API clients
//!
//! All requests go through [`ApiClient`], which attaches the right
//! authority header and turns non-2xx responses into cleaned
//! [`Error::Api`] values. The backend's convention for error bodies is
//! a JSON object with `code` and `message` fields; anything else falls
//! back to the raw body text, then to the bare HTTP status.

use perch_core::{ApiConfig, Error, Result, SessionToken};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client bound to one API base URL and one default authority
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ApiClient {
    /// Build a client from configuration
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Request authorized by the API key (pre-exchange authority)
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }

    /// Request authorized by an exchanged session token. Calls made
    /// after the handoff exchange must use this and nothing else.
    pub(crate) fn request_with_token(
        &self,
        method: Method,
        path: &str,
        token: &SessionToken,
    ) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token.as_str())
    }

    /// Send a request and decode a JSON response body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::UnexpectedResponse(format!("invalid response body: {}", e)))
    }

    /// Send a request, discarding any response body
    pub(crate) async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        self.send(builder).await.map(|_| ())
    }

    /// Send a JSON body and decode a JSON response
    pub(crate) async fn send_json_body<B: Serialize, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T> {
        self.send_json(builder.json(body)).await
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Http(transport_message(&e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!("API call failed with status {}", status);
        let body = response.bytes().await.unwrap_or_default();
        Err(clean_api_error(status, &body))
    }
}

/// Summarize a transport error without leaking the full error chain
fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "could not connect to the API".to_string()
    } else {
        err.to_string()
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract `code`/`message` from an error response body, with
/// successively rougher fallbacks
pub(crate) fn clean_api_error(status: StatusCode, body: &[u8]) -> Error {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        if parsed.code.is_some() || parsed.message.is_some() {
            return Error::api(
                parsed.code.unwrap_or_else(|| "api_error".to_string()),
                parsed
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            );
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return Error::api("api_error", text);
    }

    Error::api("http_error", format!("HTTP {}", status.as_u16()))
}
