//! Interactive mode: exchange, discover, collect, submit
//!
//! The orchestrator collects credentials itself and submits them
//! through the remote agent. One discovery round yields a field list;
//! every submission may demand another round (multi-factor, multi-page
//! logins), and the loop runs until the backend stops asking. The
//! round count is unbounded on purpose but logged, so a cap could be
//! added later without changing the contract.

use crate::outcome::FlowOutcome;
use crate::session::AuthFlow;
use perch_core::{AuthSession, CredentialSet, DiscoveredField, Error, Result};
use tracing::info;

impl AuthFlow {
    pub(crate) async fn run_interactive(&self, session: &AuthSession) -> Result<FlowOutcome> {
        self.sink.info("Interactive mode");

        // Everything after the exchange runs under the session token;
        // the original API-key authority is not used again.
        let code = session.handoff_code.as_deref().ok_or_else(|| {
            Error::UnexpectedResponse("backend did not return a handoff code".to_string())
        })?;

        self.sink.info("Exchanging handoff code for a session token...");
        let token = self
            .invocations
            .exchange(&session.invocation_id, code)
            .await?;
        let scoped = self.invocations.scoped(token);
        self.sink.success("Session token obtained");

        self.sink.info("Discovering login fields...");
        let discovered = scoped
            .discover(&session.invocation_id, session.login_url.as_deref())
            .await?;

        if discovered.logged_in == Some(true) {
            self.sink.success("Already logged in! Profile saved.");
            let profile_name = self.report(&session.auth_agent_id).await?;
            return Ok(FlowOutcome::Authenticated { profile_name });
        }

        if discovered.success != Some(true) {
            let line = match &discovered.error_message {
                Some(msg) => format!("Discovery failed: {}", msg),
                None => "Discovery failed".to_string(),
            };
            self.sink.error(&line);
            return Ok(FlowOutcome::DiscoveryFailed {
                message: discovered.error_message,
            });
        }

        let mut fields = match discovered.fields {
            Some(fields) if !fields.is_empty() => fields,
            _ => {
                self.sink.error("No fields discovered");
                return Ok(FlowOutcome::NoFieldsDiscovered);
            }
        };

        self.sink.success("Login fields discovered");
        if let Some(url) = &discovered.login_url {
            self.sink.plain(&format!("  Login URL: {}", url));
        }
        if let Some(title) = &discovered.page_title {
            self.sink.plain(&format!("  Page title: {}", title));
        }
        self.show_fields(&fields);

        let mut round: usize = 0;
        loop {
            let values = self.collect_credentials(&fields)?;

            round += 1;
            info!(round, "submitting credentials");
            self.sink
                .info(&format!("Submitting credentials (round {})...", round));

            let outcome = scoped.submit(&session.invocation_id, &values).await?;

            if let Some(next) = outcome.additional_round() {
                self.sink.info("Additional authentication required");
                self.show_fields(next);
                fields = next.to_vec();
                continue;
            }

            if outcome.logged_in == Some(true) {
                let profile_name = self.report(&session.auth_agent_id).await?;
                return Ok(FlowOutcome::Authenticated { profile_name });
            }

            return Ok(match outcome.error_message {
                Some(msg) => {
                    self.sink.error(&format!("Login failed: {}", msg));
                    FlowOutcome::LoginFailed { message: Some(msg) }
                }
                // the backend reported neither success nor an error;
                // surface that as-is instead of guessing
                None => {
                    self.sink
                        .error("Unexpected state: not logged in, but no error reported");
                    FlowOutcome::UnexpectedState
                }
            });
        }
    }

    /// Prompt for every field in the order received. The credential set
    /// is built from the field list itself, so its key set always
    /// matches the most recent round exactly.
    fn collect_credentials(&self, fields: &[DiscoveredField]) -> Result<CredentialSet> {
        self.sink.info("Collecting credentials...");

        let mut values = CredentialSet::with_capacity(fields.len());
        for field in fields {
            if field.is_sensitive() {
                self.sink
                    .warn("Value will be visible as you type");
            }
            let value = self
                .prompter
                .ask(&format!("Enter {}", field.display_label()), field.is_sensitive())?;
            values.insert(field.name.clone(), value);
        }
        Ok(values)
    }

    fn show_fields(&self, fields: &[DiscoveredField]) {
        for field in fields {
            self.sink.plain(&format!(
                "  - {} (type: {}, label: \"{}\")",
                field.name,
                field.field_type,
                field.label.as_deref().unwrap_or("-")
            ));
        }
    }
}
