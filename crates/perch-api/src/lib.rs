//! # perch-api
//!
//! Collaborator interfaces for the Perch backend, plus their
//! `reqwest`-backed implementations.
//!
//! Each service the orchestrator talks to is a trait (so tests can
//! script responses), carved the same way the backend carves its API:
//!
//! - [`AuthApi`] — auth-agent records and session starts
//! - [`InvocationsApi`] — invocation status, handoff exchange, cleanup
//! - [`ScopedInvocationsApi`] — discovery/submission, only reachable
//!   through the token returned by the exchange
//! - [`BrowsersApi`] — optional follow-on browser provisioning

mod auth;
mod browsers;
mod http;
mod invocations;

pub use auth::{AuthApi, HttpAuthApi};
pub use browsers::{BrowsersApi, HttpBrowsersApi};
pub use http::ApiClient;
pub use invocations::{HttpInvocationsApi, InvocationsApi, ScopedInvocationsApi};
