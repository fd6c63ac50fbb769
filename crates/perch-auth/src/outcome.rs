//! Terminal outcomes of a login flow

/// How a login flow ended.
///
/// Only [`Authenticated`](Self::Authenticated) is a success; the other
/// variants are clean terminal reports, not errors — backend call
/// failures surface as `Err` from the flow instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Login succeeded and the profile is saved
    Authenticated { profile_name: String },
    /// Hosted invocation expired before completion
    Expired,
    /// Hosted invocation was canceled
    Canceled,
    /// Hosted polling exhausted its bound (client-synthesized, distinct
    /// from the backend-reported expiry)
    TimedOut,
    /// Field discovery reported failure
    DiscoveryFailed { message: Option<String> },
    /// Discovery succeeded but returned no fields to fill
    NoFieldsDiscovered,
    /// Submission reported failure
    LoginFailed { message: Option<String> },
    /// Backend reported neither success nor an error
    UnexpectedState,
}

impl FlowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
