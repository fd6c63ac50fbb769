//! Invocation service: polling, handoff exchange, and the
//! token-scoped discovery/submission calls
//!
//! The exchange is a credential escalation: everything before it runs
//! under the API key, everything after it under the returned session
//! token. The split into [`InvocationsApi`] and [`ScopedInvocationsApi`]
//! makes mixing the two authorities unrepresentable — discovery and
//! submission only exist on the client you get back from [`scoped`].
//!
//! [`scoped`]: InvocationsApi::scoped

use crate::http::ApiClient;
use async_trait::async_trait;
use perch_core::{CredentialSet, DiscoverOutcome, InvocationStatus, Result, SessionToken, SubmitOutcome};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Pre-exchange invocation operations, authorized by the API key
#[async_trait]
pub trait InvocationsApi: Send + Sync {
    /// Fetch the current invocation status snapshot
    async fn retrieve(&self, invocation_id: &str) -> Result<InvocationStatus>;

    /// Exchange the handoff code for a session token
    async fn exchange(&self, invocation_id: &str, code: &str) -> Result<SessionToken>;

    /// Request deletion of any browsers spun up for this invocation
    async fn delete_browsers(&self, invocation_id: &str) -> Result<()>;

    /// Build the post-exchange client for the given token
    fn scoped(&self, token: SessionToken) -> Arc<dyn ScopedInvocationsApi>;
}

/// Post-exchange operations, authorized by the session token
#[async_trait]
pub trait ScopedInvocationsApi: Send + Sync {
    /// Ask the remote agent to discover the login fields
    async fn discover(
        &self,
        invocation_id: &str,
        login_url: Option<&str>,
    ) -> Result<DiscoverOutcome>;

    /// Submit one round of field values
    async fn submit(&self, invocation_id: &str, values: &CredentialSet) -> Result<SubmitOutcome>;
}

#[derive(Deserialize)]
struct RetrieveResponse {
    status: InvocationStatus,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    session_token: SessionToken,
}

#[derive(Serialize)]
struct DiscoverRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    login_url: Option<&'a str>,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    field_values: &'a CredentialSet,
}

/// HTTP implementation against the Perch API
#[derive(Clone)]
pub struct HttpInvocationsApi {
    client: ApiClient,
}

impl HttpInvocationsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InvocationsApi for HttpInvocationsApi {
    #[instrument(skip(self))]
    async fn retrieve(&self, invocation_id: &str) -> Result<InvocationStatus> {
        let resp: RetrieveResponse = self
            .client
            .send_json(
                self.client
                    .request(Method::GET, &format!("/invocations/{}", invocation_id)),
            )
            .await?;
        Ok(resp.status)
    }

    #[instrument(skip(self, code))]
    async fn exchange(&self, invocation_id: &str, code: &str) -> Result<SessionToken> {
        let resp: ExchangeResponse = self
            .client
            .send_json_body(
                self.client.request(
                    Method::POST,
                    &format!("/invocations/{}/exchange", invocation_id),
                ),
                &ExchangeRequest { code },
            )
            .await?;
        Ok(resp.session_token)
    }

    #[instrument(skip(self))]
    async fn delete_browsers(&self, invocation_id: &str) -> Result<()> {
        self.client
            .send_unit(self.client.request(
                Method::DELETE,
                &format!("/invocations/{}/browsers", invocation_id),
            ))
            .await
    }

    fn scoped(&self, token: SessionToken) -> Arc<dyn ScopedInvocationsApi> {
        Arc::new(HttpScopedInvocationsApi {
            client: self.client.clone(),
            token,
        })
    }
}

/// Token-scoped HTTP client produced by the exchange
struct HttpScopedInvocationsApi {
    client: ApiClient,
    token: SessionToken,
}

#[async_trait]
impl ScopedInvocationsApi for HttpScopedInvocationsApi {
    #[instrument(skip(self))]
    async fn discover(
        &self,
        invocation_id: &str,
        login_url: Option<&str>,
    ) -> Result<DiscoverOutcome> {
        self.client
            .send_json_body(
                self.client.request_with_token(
                    Method::POST,
                    &format!("/invocations/{}/discover", invocation_id),
                    &self.token,
                ),
                &DiscoverRequest { login_url },
            )
            .await
    }

    #[instrument(skip(self, values))]
    async fn submit(&self, invocation_id: &str, values: &CredentialSet) -> Result<SubmitOutcome> {
        self.client
            .send_json_body(
                self.client.request_with_token(
                    Method::POST,
                    &format!("/invocations/{}/submit", invocation_id),
                    &self.token,
                ),
                &SubmitRequest {
                    field_values: values,
                },
            )
            .await
    }
}
