//! Session start: validation, the start call, and mode dispatch

use crate::hosted::HostedConfig;
use crate::outcome::FlowOutcome;
use crate::prompt::Prompter;
use crate::sink::StatusSink;
use perch_api::{AuthApi, BrowsersApi, InvocationsApi};
use perch_core::{AuthSession, Error, Result, StartAuthRequest};
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Operator input for starting a login flow
#[derive(Debug, Clone)]
pub struct StartInput {
    pub target_domain: String,
    pub profile_name: String,
    pub login_url: Option<String>,
    pub proxy_id: Option<String>,
    pub hosted: bool,
}

/// Completion strategy, selected once at start. The two modes share no
/// behavior beyond producing a terminal [`FlowOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hosted,
    Interactive,
}

/// The login flow orchestrator.
///
/// Owns its collaborators as trait objects so tests can script them.
/// All output goes through the injected sink; all operator input goes
/// through the injected prompter.
pub struct AuthFlow {
    pub(crate) auth: Arc<dyn AuthApi>,
    pub(crate) invocations: Arc<dyn InvocationsApi>,
    pub(crate) browsers: Option<Arc<dyn BrowsersApi>>,
    pub(crate) prompter: Arc<dyn Prompter>,
    pub(crate) sink: Arc<dyn StatusSink>,
    pub(crate) hosted: HostedConfig,
    invocation_watch: Option<Arc<OnceLock<String>>>,
}

impl AuthFlow {
    pub fn new(
        auth: Arc<dyn AuthApi>,
        invocations: Arc<dyn InvocationsApi>,
        prompter: Arc<dyn Prompter>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            auth,
            invocations,
            browsers: None,
            prompter,
            sink,
            hosted: HostedConfig::default(),
            invocation_watch: None,
        }
    }

    /// Attach the optional browser provisioner. Without it, the
    /// follow-on offer after a successful login degrades to a warning.
    pub fn with_browsers(mut self, browsers: Arc<dyn BrowsersApi>) -> Self {
        self.browsers = Some(browsers);
        self
    }

    /// Override hosted-mode polling parameters
    pub fn with_hosted_config(mut self, hosted: HostedConfig) -> Self {
        self.hosted = hosted;
        self
    }

    /// Publish the invocation id of the in-flight session into `watch`
    /// once it exists, so a cancellation cleanup can target it. Written
    /// exactly once; read-only afterwards.
    pub fn with_invocation_watch(mut self, watch: Arc<OnceLock<String>>) -> Self {
        self.invocation_watch = Some(watch);
        self
    }

    /// Start a login flow and drive it to a terminal outcome.
    ///
    /// Validates input before any network call, creates the session,
    /// then hands off to the controller for the selected mode.
    pub async fn start(&self, input: StartInput) -> Result<FlowOutcome> {
        if input.target_domain.trim().is_empty() {
            return Err(Error::InvalidInput("target domain is required".to_string()));
        }
        if input.profile_name.trim().is_empty() {
            return Err(Error::InvalidInput("profile name is required".to_string()));
        }

        self.sink.info("Starting agent authentication flow...");
        self.sink
            .plain(&format!("  Target domain: {}", input.target_domain));
        self.sink
            .plain(&format!("  Profile name: {}", input.profile_name));
        if let Some(url) = &input.login_url {
            self.sink.plain(&format!("  Login URL: {}", url));
        }
        if let Some(proxy) = &input.proxy_id {
            self.sink.plain(&format!("  Proxy ID: {}", proxy));
        }

        let request = StartAuthRequest {
            target_domain: input.target_domain.clone(),
            profile_name: input.profile_name.clone(),
            login_url: input.login_url.clone(),
            proxy_id: input.proxy_id.clone(),
        };

        let response = self.auth.start(&request).await?;
        let session = AuthSession::from_response(&request, response);

        if let Some(watch) = &self.invocation_watch {
            let _ = watch.set(session.invocation_id.clone());
        }

        self.sink.success("Auth flow started");
        self.sink
            .plain(&format!("  Invocation ID: {}", session.invocation_id));
        self.sink
            .plain(&format!("  Auth Agent ID: {}", session.auth_agent_id));

        let mode = if input.hosted {
            Mode::Hosted
        } else {
            Mode::Interactive
        };
        info!(?mode, invocation = %session.invocation_id, "session created");

        match mode {
            Mode::Hosted => self.run_hosted(&session).await,
            Mode::Interactive => self.run_interactive(&session).await,
        }
    }
}
