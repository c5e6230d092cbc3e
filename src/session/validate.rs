//! Time-gated group revalidation against the IdP's user-profile endpoint.

// self
use crate::{
	_prelude::*,
	auth::GroupSource,
	obs::{self, FlowOutcome, FlowSpan, SessionFlow},
	session::SessionOrchestrator,
};

/// How revalidation failure propagates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationMode {
	/// Propagate the failure; the guard uses this to force re-authentication.
	Strict,
	/// Log and keep the last-known token-derived groups; permission lookups use
	/// this so one flaky profile call cannot fail the whole read.
	Lenient,
}

impl SessionOrchestrator {
	/// Refreshes group membership from the IdP unless the cache is still fresh.
	///
	/// Idempotent inside the revalidation interval: a burst of guard and
	/// permission calls in the same window performs at most one network call
	/// (callers queue on an async gate and then observe the freshened stamp).
	pub async fn ensure_session_validation(&self, mode: ValidationMode) -> Result<()> {
		const FLOW: SessionFlow = SessionFlow::Revalidate;

		let _gate = self.validation_gate.lock().await;
		let now = self.clock.now();

		if !self.groups_cache().is_stale_at(now, self.options().revalidation_interval) {
			return Ok(());
		}

		let span = FlowSpan::new(FLOW, "ensure_session_validation");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let adapter = self.adapter().await?;

				match adapter.load_profile_groups().await {
					Ok(groups) => {
						self.groups_cache().store(groups, GroupSource::Profile, now);

						Ok(())
					},
					Err(e) => match mode {
						ValidationMode::Strict => Err(Error::Idp(e)),
						ValidationMode::Lenient => {
							tracing::warn!(
								error = %e,
								"Session revalidation failed; keeping last-known groups.",
							);

							Ok(())
						},
					},
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}
}
