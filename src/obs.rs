//! Observability helpers for session flows.
//!
//! Structured spans named `oidc_session.flow` carry the `flow` (operation) and
//! `stage` (call site) fields. Enable the `metrics` feature to additionally
//! increment the `oidc_session_flow_total` counter for every
//! attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Session operations observed by the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionFlow {
	/// App-bootstrap resolution, including callback processing.
	Bootstrap,
	/// Per-navigation authentication guard.
	CheckAuth,
	/// Hidden-frame silent re-authentication attempt.
	SilentReauth,
	/// Interactive login delegation.
	Login,
	/// Logout teardown and delegation.
	Logout,
	/// Scheduled or forced token refresh.
	Refresh,
	/// Group-membership revalidation against the user-profile endpoint.
	Revalidate,
}
impl SessionFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionFlow::Bootstrap => "bootstrap",
			SessionFlow::CheckAuth => "check_auth",
			SessionFlow::SilentReauth => "silent_reauth",
			SessionFlow::Login => "login",
			SessionFlow::Logout => "logout",
			SessionFlow::Refresh => "refresh",
			SessionFlow::Revalidate => "revalidate",
		}
	}
}
impl Display for SessionFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a session operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
