//! Success reporting and the optional follow-on browser

use crate::session::AuthFlow;
use perch_core::{AuthAgentStatus, Result};
use tracing::warn;

impl AuthFlow {
    /// Confirm a successful login against the auth-agent record and
    /// offer to create a browser bound to the saved profile.
    ///
    /// This is the single authoritative read after a controller
    /// observes success. The record is the source of truth: a status
    /// other than `authenticated` is surfaced as a warning, because the
    /// controller's belief is advisory only.
    pub(crate) async fn report(&self, auth_agent_id: &str) -> Result<String> {
        self.sink.info("Verifying auth agent status...");
        let record = self.auth.retrieve(auth_agent_id).await?;

        self.sink.plain(&format!("  Auth Agent ID: {}", record.id));
        self.sink
            .plain(&format!("  Profile: {}", record.profile_name));
        self.sink.plain(&format!("  Domain: {}", record.domain));
        self.sink.plain(&format!("  Status: {}", record.status));

        if record.status == AuthAgentStatus::Authenticated {
            self.sink.success("Auth agent status confirmed: authenticated");
        } else {
            warn!(status = %record.status, "auth agent status mismatch");
            self.sink.warn(&format!(
                "Expected status authenticated, got {}",
                record.status
            ));
        }

        self.offer_browser(&record.profile_name).await?;
        Ok(record.profile_name)
    }

    /// Interactively offer a stealth browser session for the profile.
    /// Failures here never retroactively fail the authentication.
    async fn offer_browser(&self, profile_name: &str) -> Result<()> {
        let wanted = self
            .prompter
            .confirm("Would you like to create a browser with the saved profile?")?;
        if !wanted {
            return Ok(());
        }

        let Some(browsers) = &self.browsers else {
            self.sink.warn("Browser service not available");
            return Ok(());
        };

        self.sink.info("Creating browser with saved profile...");
        match browsers.create(profile_name, true).await {
            Ok(session) => {
                self.sink.success("Browser created");
                self.sink
                    .plain(&format!("  Session ID: {}", session.session_id));
                if let Some(url) = &session.cdp_ws_url {
                    self.sink.plain(&format!("  CDP WebSocket URL: {}", url));
                }
                if let Some(url) = &session.live_view_url {
                    self.sink.plain(&format!("  Live View URL: {}", url));
                }
            }
            Err(e) => {
                self.sink
                    .warn(&format!("Browser creation failed: {}", e));
            }
        }
        Ok(())
    }
}
