//! # perch-auth
//!
//! The agent-assisted website login orchestrator. Drives a remote
//! browser-automation agent through an unfamiliar site's login flow
//! without knowing in advance which fields the site requires.
//!
//! Two completion strategies, selected once at start:
//!
//! - **Hosted**: a human finishes the login in a browser the
//!   orchestrator only links to, while it polls the invocation to a
//!   terminal state under a bounded wait.
//! - **Interactive**: the orchestrator exchanges the handoff code for a
//!   session token, asks the agent to discover the login fields,
//!   collects values from the operator, and submits them — looping for
//!   as long as the backend keeps requesting additional rounds
//!   (multi-factor, multi-page logins).
//!
//! Both strategies end in [`FlowOutcome`], and every terminal outcome
//! produces exactly one status line through the injected
//! [`StatusSink`]. No call is ever retried; backend failures abort the
//! current step with a cleaned error.

mod cleanup;
mod hosted;
mod interactive;
mod outcome;
mod prompt;
mod report;
mod session;
mod sink;

pub use cleanup::CleanupGuard;
pub use hosted::HostedConfig;
pub use outcome::FlowOutcome;
pub use prompt::{Prompter, StdinPrompter};
pub use session::{AuthFlow, Mode, StartInput};
pub use sink::{ConsoleSink, StatusSink};
