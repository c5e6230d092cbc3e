//! The per-navigation authentication guard and its API-error hook.

// self
use crate::{
	_prelude::*,
	auth::GroupSource,
	idp::{IdpAdapter, InitMode},
	obs::{self, FlowOutcome, FlowSpan, SessionFlow},
	redirect,
	session::{SessionOrchestrator, SessionState, SilentOutcome, ValidationMode},
};

impl SessionOrchestrator {
	/// Decides whether an authenticated session exists, re-establishing one
	/// where possible.
	///
	/// Called on every protected navigation. Never triggers a redirect itself:
	/// it either resolves or fails with [`Error::Unauthorized`], which the
	/// caller turns into a login affordance. The fallthrough order below is the
	/// contract; reordering it reintroduces redirect loops or duplicate network
	/// calls.
	///
	/// 1. SSO disabled resolves anonymously.
	/// 2. A live client session is re-adopted: token persisted, timer re-armed.
	/// 3. A cached token is revalidated strictly; failure tears down and falls
	///    through.
	/// 4. Silent re-auth is attempted unless known to fail; a thrown attempt
	///    persists the disabled flag, a clean "no session" does not.
	/// 5. Teardown plus [`Error::Unauthorized`].
	pub async fn check_auth(&self) -> Result<()> {
		const FLOW: SessionFlow = SessionFlow::CheckAuth;

		let span = FlowSpan::new(FLOW, "check_auth");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let result = span.instrument(self.check_auth_inner()).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}

	async fn check_auth_inner(&self) -> Result<()> {
		let config = self.gateway.config().await?;

		if !config.sso_enabled {
			self.set_state(SessionState::Disabled);

			return Ok(());
		}

		let adapter = self.adapter().await?;

		if let Some(token) = adapter.live_session_at(self.clock.now()) {
			self.token_store.set_access_token(Some(token));
			adapter.schedule_token_refresh();

			let groups_from =
				self.groups_cache().snapshot().map_or(GroupSource::Token, |s| s.source);

			self.set_state(SessionState::Authenticated { groups_from });

			return Ok(());
		}

		if self.token_store.has_access_token() {
			match self.ensure_session_validation(ValidationMode::Strict).await {
				Ok(()) => {
					let groups_from =
						self.groups_cache().snapshot().map_or(GroupSource::Profile, |s| s.source);

					self.set_state(SessionState::Authenticated { groups_from });

					return Ok(());
				},
				Err(e) => {
					tracing::debug!(
						error = %e,
						"Cached token failed revalidation; falling through to re-authentication.",
					);
					adapter.teardown();
				},
			}
		}

		if self.silent_outcome().attempt_allowed() {
			match self.attempt_silent_reauth(&adapter).await {
				Ok(true) => {
					// A working silent path supersedes any stale disabled flag.
					self.mark_silent(SilentOutcome::Succeeded);
					self.prefs.set_silent_reauth_disabled(false);
					self.set_state(SessionState::Authenticated {
						groups_from: GroupSource::Token,
					});

					return Ok(());
				},
				Ok(false) => {
					// No IdP session exists; the mechanism itself still works, so
					// the persisted preference stays untouched.
				},
				Err(e) => {
					self.mark_silent(SilentOutcome::KnownToFail);
					self.prefs.set_silent_reauth_disabled(true);
					tracing::warn!(
						error = %e,
						"Silent re-authentication threw; disabling further attempts.",
					);
				},
			}
		}

		adapter.teardown();
		self.set_state(SessionState::Unauthenticated);

		Err(Error::Unauthorized)
	}

	async fn attempt_silent_reauth(&self, adapter: &Arc<IdpAdapter>) -> Result<bool> {
		const FLOW: SessionFlow = SessionFlow::SilentReauth;

		let span = FlowSpan::new(FLOW, "attempt_silent_reauth");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let options = self.options();
		let redirect_uri = redirect::silent_callback_uri(
			options.origin.as_ref(),
			&options.base_path,
			&options.silent_callback_asset,
		);
		let result = span
			.instrument(adapter.run_init(InitMode::Silent { redirect_uri }))
			.await
			.map_err(|e| Error::SilentReauthFailed { reason: e.to_string() });

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}

	/// Reacts to an API error the embedding app received.
	///
	/// A 401/403 means the backend no longer honors the session: both caches
	/// are cleared and [`Error::Unauthorized`] is surfaced so the caller treats
	/// the session as dead. Every other status is a no-op.
	pub async fn check_error(&self, status: Option<u16>) -> Result<()> {
		if matches!(status, Some(401 | 403)) {
			self.teardown_session().await;
			self.set_state(SessionState::Unauthenticated);

			return Err(Error::Unauthorized);
		}

		Ok(())
	}
}
