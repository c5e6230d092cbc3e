//! Interactive login/logout delegation and identity/permission reads.

// self
use crate::{
	_prelude::*,
	auth::{GroupSource, Identity, Permissions},
	idp::RedirectOptions,
	obs::{self, FlowOutcome, FlowSpan, SessionFlow},
	redirect,
	session::{SessionOrchestrator, SessionState, ValidationMode},
};

impl SessionOrchestrator {
	/// Delegates to the IdP's interactive login redirect.
	///
	/// No-op success when SSO is disabled. The redirect target resolves against
	/// the deployed base path and origin, degrading to a path-only URI when no
	/// origin is available; the resulting token is persisted and the refresh
	/// timer armed once the client reports a session.
	pub async fn login(&self, target: Option<&str>) -> Result<()> {
		const FLOW: SessionFlow = SessionFlow::Login;

		let span = FlowSpan::new(FLOW, "login");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.gateway.config().await?;

				if !config.sso_enabled {
					self.set_state(SessionState::Disabled);

					return Ok(());
				}

				let adapter = self.adapter().await?;
				let redirect_uri = self.resolve_redirect(target);

				adapter.login(RedirectOptions { redirect_uri }).await?;

				if adapter.live_session_at(self.clock.now()).is_some() {
					self.set_state(SessionState::Authenticated {
						groups_from: GroupSource::Token,
					});
				}

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}

	/// Tears the session down and, when SSO is enabled, delegates to the IdP's
	/// logout redirect.
	///
	/// The local teardown is unconditional: it happens even when SSO is
	/// disabled, the configuration was never resolved, or the adapter was never
	/// constructed. Only the delegation is conditional.
	pub async fn logout(&self, target: Option<&str>) -> Result<()> {
		const FLOW: SessionFlow = SessionFlow::Logout;

		let span = FlowSpan::new(FLOW, "logout");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.teardown_session().await;
				self.set_state(SessionState::Unauthenticated);

				// Only the memo is consulted; logout never waits on the network
				// for a config document.
				let Some(config) = self.gateway.cached() else {
					return Ok(());
				};

				if !config.sso_enabled {
					self.set_state(SessionState::Disabled);

					return Ok(());
				}

				let Some(adapter) = self.adapter_if_connected().await else {
					return Ok(());
				};
				let redirect_uri = self.resolve_redirect(target);

				adapter.logout(RedirectOptions { redirect_uri }).await?;

				Ok(())
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}

	/// Maps the decoded token claims into an identity record; no network call.
	///
	/// With SSO disabled this is the fixed anonymous identity.
	pub async fn get_identity(&self) -> Result<Identity> {
		let config = self.gateway.config().await?;

		if !config.sso_enabled {
			return Ok(Identity::anonymous());
		}

		let adapter = self.adapter().await?;
		let claims = adapter.token_claims().unwrap_or_default();

		Ok(Identity::from_claims(&claims))
	}

	/// Returns the cached group membership alongside the privileged-group list.
	///
	/// With SSO disabled the result is empty. Otherwise the guard semantics run
	/// first, then a lenient revalidation refreshes the groups when the cache
	/// has gone stale, falling back to the token-derived listing on failure.
	pub async fn get_permissions(&self) -> Result<Permissions> {
		let config = self.gateway.config().await?;

		if !config.sso_enabled {
			return Ok(Permissions::default());
		}

		self.check_auth().await?;
		self.ensure_session_validation(ValidationMode::Lenient).await?;

		let groups = self.groups_snapshot().map(|snapshot| snapshot.groups).unwrap_or_default();

		Ok(Permissions { groups, privileged_groups: config.privileged_groups.clone() })
	}

	fn resolve_redirect(&self, target: Option<&str>) -> String {
		let options = self.options();

		redirect::resolve_redirect_uri(options.origin.as_ref(), &options.base_path, target)
	}
}
