//! Auth-agent service: session starts and record reads

use crate::http::ApiClient;
use async_trait::async_trait;
use perch_core::{AuthAgentRecord, Result, StartAuthRequest, StartAuthResponse};
use reqwest::Method;
use tracing::instrument;

/// Subset of the auth-agent API used by the login flow
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Start a new auth session for a target domain
    async fn start(&self, req: &StartAuthRequest) -> Result<StartAuthResponse>;

    /// Fetch the auth-agent record
    async fn retrieve(&self, auth_agent_id: &str) -> Result<AuthAgentRecord>;
}

/// HTTP implementation against the Perch API
#[derive(Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    #[instrument(skip_all, fields(domain = %req.target_domain))]
    async fn start(&self, req: &StartAuthRequest) -> Result<StartAuthResponse> {
        self.client
            .send_json_body(self.client.request(Method::POST, "/agents/auth"), req)
            .await
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, auth_agent_id: &str) -> Result<AuthAgentRecord> {
        self.client
            .send_json(
                self.client
                    .request(Method::GET, &format!("/agents/auth/{}", auth_agent_id)),
            )
            .await
    }
}
