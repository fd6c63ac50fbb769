//! Hosted mode: link, acknowledge, poll
//!
//! The human finishes the login in the hosted UI; this controller only
//! polls the invocation until it reaches a terminal state. The state
//! machine is closed and non-resumable: `Pending → {Success, Expired,
//! Canceled, TimedOut}`, where `TimedOut` is synthesized locally when
//! the bounded wait runs out.

use crate::outcome::FlowOutcome;
use crate::session::AuthFlow;
use perch_core::{AuthSession, Error, InvocationStatus, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Polling parameters for hosted mode
#[derive(Debug, Clone)]
pub struct HostedConfig {
    /// Fixed sleep between polls
    pub poll_interval: Duration,
    /// Hard ceiling on the total wait
    pub max_wait: Duration,
    /// Attempt to open the hosted URL in a local browser
    pub auto_open: bool,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(300),
            auto_open: true,
        }
    }
}

impl AuthFlow {
    pub(crate) async fn run_hosted(&self, session: &AuthSession) -> Result<FlowOutcome> {
        let hosted_url = session.hosted_url.as_deref().ok_or_else(|| {
            Error::UnexpectedResponse("backend did not return a hosted URL".to_string())
        })?;

        self.sink.info("Hosted mode");
        self.sink.plain("");
        self.sink.plain("Please open this URL in your browser:");
        self.sink.plain(&format!("  {}", hosted_url));
        self.sink.plain("");

        if self.hosted.auto_open {
            // best effort; plenty of environments have no local browser
            if let Err(e) = open::that(hosted_url) {
                warn!("could not open browser: {}", e);
                self.sink
                    .warn("Could not open a browser automatically; copy the URL above instead.");
            }
        }

        self.prompter
            .pause("Press enter once you've completed authentication in the browser...")?;

        self.sink.info("Polling for completion...");
        self.sink.plain(&format!(
            "  Poll interval: {}s, max wait: {}s",
            self.hosted.poll_interval.as_secs(),
            self.hosted.max_wait.as_secs()
        ));

        let started = Instant::now();
        while started.elapsed() < self.hosted.max_wait {
            // a poll error is fatal, not retried
            let status = self.invocations.retrieve(&session.invocation_id).await?;

            let elapsed = started.elapsed().as_secs();
            self.sink
                .plain(&format!("  [{}s] status: {}", elapsed, status));
            debug!(elapsed, %status, "hosted poll");

            match status {
                InvocationStatus::Success => {
                    self.sink.success("Login completed in the hosted UI");
                    let profile_name = self.report(&session.auth_agent_id).await?;
                    return Ok(FlowOutcome::Authenticated { profile_name });
                }
                InvocationStatus::Expired => {
                    self.sink.error("Invocation expired before completion");
                    return Ok(FlowOutcome::Expired);
                }
                InvocationStatus::Canceled => {
                    self.sink.error("Invocation was canceled");
                    return Ok(FlowOutcome::Canceled);
                }
                // anything non-terminal: keep waiting
                InvocationStatus::Pending | InvocationStatus::Unknown => {}
            }

            tokio::time::sleep(self.hosted.poll_interval).await;
        }

        self.sink
            .error("Timed out waiting for the hosted login to complete");
        Ok(FlowOutcome::TimedOut)
    }
}
