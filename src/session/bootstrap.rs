//! App-bootstrap resolution, including pending-authorization-response handling.

// self
use crate::{
	_prelude::*,
	idp::InitMode,
	obs::{self, FlowOutcome, FlowSpan, SessionFlow},
	redirect,
	session::{SessionOrchestrator, SessionState},
};

/// Result of [`SessionOrchestrator::initialize_auth`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bootstrap {
	/// Whether SSO is enabled; `false` means every guard resolves anonymously.
	pub sso_enabled: bool,
	/// Current URL with authorization-response parameters removed, when a
	/// pending response was processed. The caller should replace the address
	/// bar with it without triggering a reload.
	pub cleaned_url: Option<Url>,
}

impl SessionOrchestrator {
	/// Resolves SSO enablement and processes a pending authorization response.
	///
	/// Must run once before any protected route renders. The decision order is
	/// load-bearing: configuration first (SSO off short-circuits everything),
	/// then IdP field validation, then callback processing. Callback parameters
	/// are stripped from the URL whether the exchange succeeds or fails so a
	/// reload can never loop back into the callback path.
	pub async fn initialize_auth(&self, current_url: Option<&Url>) -> Result<Bootstrap> {
		const FLOW: SessionFlow = SessionFlow::Bootstrap;

		let span = FlowSpan::new(FLOW, "initialize_auth");

		obs::record_flow_outcome(FLOW, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let config = self.gateway.config().await?;

				if !config.sso_enabled {
					self.set_state(SessionState::Disabled);

					return Ok(Bootstrap { sso_enabled: false, cleaned_url: None });
				}

				let adapter = self.adapter().await?;
				let mut cleaned_url = None;

				if let Some(url) = current_url
					&& let Some(response) = redirect::extract_auth_response(url)
				{
					let cleaned = redirect::strip_auth_response(url);

					match adapter.run_init(InitMode::Callback { response }).await {
						Ok(true) => {
							self.set_state(SessionState::Authenticated {
								groups_from: crate::auth::GroupSource::Token,
							});

							cleaned_url = Some(cleaned);
						},
						Ok(false) => {
							self.set_state(SessionState::Unauthenticated);

							return Err(Error::AuthCallbackFailed {
								cleaned_url: Some(cleaned),
								source: None,
							});
						},
						Err(e) => {
							self.set_state(SessionState::Unauthenticated);

							return Err(Error::AuthCallbackFailed {
								cleaned_url: Some(cleaned),
								source: Some(e),
							});
						},
					}
				}

				Ok(Bootstrap { sso_enabled: true, cleaned_url })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(FLOW, FlowOutcome::Failure),
		}

		result
	}
}
