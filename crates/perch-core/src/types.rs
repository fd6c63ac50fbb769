//! Data model for the agent-assisted login flow
//!
//! These types mirror the Perch API wire shapes. Optional fields stay
//! `Option` rather than defaulting, because the orchestrator branches
//! on presence vs. absence (e.g. a missing `logged_in` is not `false`
//! for control-flow purposes, it is "backend said nothing").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request body for starting an agent auth flow
#[derive(Debug, Clone, Serialize)]
pub struct StartAuthRequest {
    pub target_domain: String,
    pub profile_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_id: Option<String>,
}

/// Backend response to a start call
#[derive(Debug, Clone, Deserialize)]
pub struct StartAuthResponse {
    pub invocation_id: String,
    pub auth_agent_id: String,
    #[serde(default)]
    pub hosted_url: Option<String>,
    #[serde(default)]
    pub handoff_code: Option<String>,
    #[serde(default)]
    pub login_url: Option<String>,
}

/// One started auth session. Created once, never mutated; identifies
/// every subsequent backend call in the flow.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub invocation_id: String,
    pub auth_agent_id: String,
    pub target_domain: String,
    pub profile_name: String,
    pub login_url: Option<String>,
    pub hosted_url: Option<String>,
    pub handoff_code: Option<String>,
}

impl AuthSession {
    /// Combine the operator's input with the backend's start response
    pub fn from_response(req: &StartAuthRequest, resp: StartAuthResponse) -> Self {
        Self {
            invocation_id: resp.invocation_id,
            auth_agent_id: resp.auth_agent_id,
            target_domain: req.target_domain.clone(),
            profile_name: req.profile_name.clone(),
            // the backend may normalize or fill in the login URL
            login_url: resp.login_url.or_else(|| req.login_url.clone()),
            hosted_url: resp.hosted_url,
            handoff_code: resp.handoff_code,
        }
    }
}

/// Auth agent status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAgentStatus {
    Pending,
    Authenticated,
    Failed,
}

impl std::fmt::Display for AuthAgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Backend-owned record of a saved browser profile for a domain
#[derive(Debug, Clone, Deserialize)]
pub struct AuthAgentRecord {
    pub id: String,
    pub profile_name: String,
    pub domain: String,
    pub status: AuthAgentStatus,
}

/// Invocation status snapshot, polled in hosted mode.
///
/// `Unknown` catches statuses this client does not know about; the
/// polling loop treats anything non-terminal as "keep waiting".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    Pending,
    Success,
    Expired,
    Canceled,
    Unknown,
}

impl<'de> Deserialize<'de> for InvocationStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "pending" => Self::Pending,
            "success" => Self::Success,
            "expired" => Self::Expired,
            "canceled" => Self::Canceled,
            _ => Self::Unknown,
        })
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Expired => write!(f, "expired"),
            Self::Canceled => write!(f, "canceled"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One login field the remote agent found on the page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl DiscoveredField {
    /// Whether this field likely holds a secret. Used only to warn the
    /// operator that input is visible while typing, never to branch.
    pub fn is_sensitive(&self) -> bool {
        self.field_type == "password" || self.name.to_lowercase().contains("password")
    }

    /// Human-facing label, falling back to the field name
    pub fn display_label(&self) -> &str {
        match &self.label {
            Some(label) if !label.is_empty() => label,
            _ => &self.name,
        }
    }
}

/// Field name → operator-supplied value, built fresh each round by
/// iterating the discovered field list
pub type CredentialSet = HashMap<String, String>;

/// Short-lived credential obtained by exchanging the handoff code.
/// Calls made after the exchange use this authority exclusively.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the token out of debug/trace output
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionToken(..)")
    }
}

/// Response to a field-discovery call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverOutcome {
    #[serde(default)]
    pub logged_in: Option<bool>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub login_url: Option<String>,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<DiscoveredField>>,
}

/// Response to a credential submission; drives the next transition of
/// the interactive loop
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitOutcome {
    #[serde(default)]
    pub logged_in: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub needs_additional_auth: Option<bool>,
    #[serde(default)]
    pub additional_fields: Option<Vec<DiscoveredField>>,
}

impl SubmitOutcome {
    /// Fields the backend wants filled in another round, if it asked
    /// for another round at all
    pub fn additional_round(&self) -> Option<&[DiscoveredField]> {
        if self.needs_additional_auth != Some(true) {
            return None;
        }
        match self.additional_fields.as_deref() {
            Some(fields) if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }
}

/// A remote browser session created for a saved profile
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSession {
    pub session_id: String,
    #[serde(default)]
    pub cdp_ws_url: Option<String>,
    #[serde(default)]
    pub live_view_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_field_by_type() {
        let field = DiscoveredField {
            name: "secret".to_string(),
            field_type: "password".to_string(),
            label: None,
        };
        assert!(field.is_sensitive());
    }

    #[test]
    fn test_sensitive_field_by_name() {
        let field = DiscoveredField {
            name: "Account-PASSWORD".to_string(),
            field_type: "text".to_string(),
            label: None,
        };
        assert!(field.is_sensitive());
    }

    #[test]
    fn test_plain_field_not_sensitive() {
        let field = DiscoveredField {
            name: "email".to_string(),
            field_type: "text".to_string(),
            label: Some("Email address".to_string()),
        };
        assert!(!field.is_sensitive());
        assert_eq!(field.display_label(), "Email address");
    }

    #[test]
    fn test_display_label_falls_back_to_name() {
        let field = DiscoveredField {
            name: "otp".to_string(),
            field_type: "text".to_string(),
            label: Some(String::new()),
        };
        assert_eq!(field.display_label(), "otp");
    }

    #[test]
    fn test_invocation_status_parses_unknown() {
        let status: InvocationStatus = serde_json::from_str("\"in_review\"").unwrap();
        assert_eq!(status, InvocationStatus::Unknown);

        let status: InvocationStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(status, InvocationStatus::Expired);
    }

    #[test]
    fn test_session_prefers_backend_login_url() {
        let req = StartAuthRequest {
            target_domain: "example.com".to_string(),
            profile_name: "work".to_string(),
            login_url: Some("https://example.com/login".to_string()),
            proxy_id: None,
        };
        let resp = StartAuthResponse {
            invocation_id: "i1".to_string(),
            auth_agent_id: "a1".to_string(),
            hosted_url: None,
            handoff_code: Some("c1".to_string()),
            login_url: Some("https://example.com/signin".to_string()),
        };

        let session = AuthSession::from_response(&req, resp);
        assert_eq!(session.login_url.as_deref(), Some("https://example.com/signin"));
        assert_eq!(session.target_domain, "example.com");
    }

    #[test]
    fn test_additional_round_requires_nonempty_fields() {
        let outcome = SubmitOutcome {
            needs_additional_auth: Some(true),
            additional_fields: Some(vec![]),
            ..Default::default()
        };
        assert!(outcome.additional_round().is_none());

        let outcome = SubmitOutcome {
            needs_additional_auth: Some(true),
            additional_fields: Some(vec![DiscoveredField {
                name: "otp".to_string(),
                field_type: "text".to_string(),
                label: None,
            }]),
            ..Default::default()
        };
        assert_eq!(outcome.additional_round().unwrap().len(), 1);
    }

    #[test]
    fn test_session_token_debug_is_redacted() {
        let token = SessionToken::new("very-secret");
        assert_eq!(format!("{:?}", token), "SessionToken(..)");
    }
}
