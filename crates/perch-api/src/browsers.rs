//! Browser provisioning: the optional follow-on after a successful login

use crate::http::ApiClient;
use async_trait::async_trait;
use perch_core::{BrowserSession, Result};
use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

/// Subset of the browsers API used by the login flow
#[async_trait]
pub trait BrowsersApi: Send + Sync {
    /// Create a new remote browser session bound to a saved profile
    async fn create(&self, profile_name: &str, stealth: bool) -> Result<BrowserSession>;
}

#[derive(Serialize)]
struct CreateBrowserRequest<'a> {
    stealth: bool,
    profile: ProfileRef<'a>,
}

#[derive(Serialize)]
struct ProfileRef<'a> {
    name: &'a str,
}

/// HTTP implementation against the Perch API
#[derive(Clone)]
pub struct HttpBrowsersApi {
    client: ApiClient,
}

impl HttpBrowsersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrowsersApi for HttpBrowsersApi {
    #[instrument(skip(self))]
    async fn create(&self, profile_name: &str, stealth: bool) -> Result<BrowserSession> {
        self.client
            .send_json_body(
                self.client.request(Method::POST, "/browsers"),
                &CreateBrowserRequest {
                    stealth,
                    profile: ProfileRef { name: profile_name },
                },
            )
            .await
    }
}
