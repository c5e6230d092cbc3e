//! Adapter binding the black-box client to the session-manager side effects.

// std
use std::sync::Weak;
// self
use crate::{
	_prelude::*,
	auth::{GroupSource, GroupsCache, TokenClaims, TokenSecret, TokenStore},
	clock::Clock,
	idp::{
		IdpDescriptor, IdpError, InitMode, OidcClient, OidcClientFactory, RedirectOptions,
		refresh::RefreshSchedule, RefreshSettings,
	},
};

/// Single lazily-constructed bridge between the orchestrator and the OIDC client.
///
/// The client remains the source of truth for token material; the adapter owns
/// the denormalized copies (TokenStore, GroupsCache) and keeps them consistent
/// with every initialization, refresh, and teardown.
pub struct IdpAdapter {
	/// Validated descriptor the client was constructed for.
	pub descriptor: IdpDescriptor,
	client: Arc<dyn OidcClient>,
	token_store: TokenStore,
	groups: GroupsCache,
	clock: Arc<dyn Clock>,
	refresh: RefreshSchedule,
	// Self-reference handed to the spawned refresh task so the timer never keeps
	// the adapter alive on its own.
	weak: Weak<IdpAdapter>,
}
impl IdpAdapter {
	/// Constructs the client through the factory and wires up the shared caches.
	pub fn connect(
		descriptor: IdpDescriptor,
		factory: &dyn OidcClientFactory,
		token_store: TokenStore,
		groups: GroupsCache,
		clock: Arc<dyn Clock>,
		settings: RefreshSettings,
	) -> Result<Arc<Self>, IdpError> {
		let client = factory.connect(&descriptor)?;

		Ok(Arc::new_cyclic(|weak| Self {
			descriptor,
			client,
			token_store,
			groups,
			clock,
			refresh: RefreshSchedule::new(settings),
			weak: weak.clone(),
		}))
	}

	/// Runs one initialization against the client.
	///
	/// An authenticated outcome adopts the session (token store, token-derived
	/// groups, validation stamp) and re-arms the refresh timer; any other outcome
	/// clears both caches so stale session material can never outlive a failed
	/// init.
	pub async fn run_init(&self, mode: InitMode) -> Result<bool, IdpError> {
		let mode_label = mode.as_str();

		match self.client.init(mode.into_request()).await {
			Ok(true) => {
				tracing::debug!(mode = mode_label, "IdP init established a session.");
				self.capture_session();

				Ok(true)
			},
			Ok(false) => {
				tracing::debug!(mode = mode_label, "IdP init resolved without a session.");
				self.discard_session();

				Ok(false)
			},
			Err(e) => {
				tracing::debug!(mode = mode_label, error = %e, "IdP init failed.");
				self.discard_session();

				Err(e)
			},
		}
	}

	/// Delegates to the client's interactive login redirect.
	pub async fn login(&self, options: RedirectOptions) -> Result<(), IdpError> {
		self.client.login(options).await?;

		if self.client.authenticated() {
			self.capture_session();
		}

		Ok(())
	}

	/// Delegates to the client's logout redirect. Local teardown is the caller's
	/// responsibility and must happen before this delegation.
	pub async fn logout(&self, options: RedirectOptions) -> Result<(), IdpError> {
		self.client.logout(options).await
	}

	/// Decoded claims of the current token, when a session is established.
	pub fn token_claims(&self) -> Option<TokenClaims> {
		self.client.token_claims()
	}

	/// Returns the current token when the client reports an authenticated
	/// session whose claims are still live at `now`.
	pub fn live_session_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		if !self.client.authenticated() {
			return None;
		}

		let token = self.client.token()?;
		let live = self.client.token_claims().is_none_or(|claims| claims.is_live_at(now));

		live.then_some(token)
	}

	/// Fetches current group membership from the user-profile endpoint.
	pub async fn load_profile_groups(&self) -> Result<Vec<String>, IdpError> {
		Ok(self.client.load_user_info().await?.groups.unwrap_or_default())
	}

	/// Adopts the client's session into the shared caches and re-arms the timer.
	pub(crate) fn capture_session(&self) {
		self.adopt_session();
		self.schedule_token_refresh();
	}

	pub(crate) fn adopt_session(&self) {
		let now = self.clock.now();
		let claims = self.client.token_claims().unwrap_or_default();

		self.token_store.set_access_token(self.client.token());
		self.groups.store(claims.groups, GroupSource::Token, now);
	}

	pub(crate) fn discard_session(&self) {
		self.token_store.clear_access_token();
		self.groups.clear();
	}

	/// Cancels the refresh timer and clears both caches.
	pub(crate) fn teardown(&self) {
		self.cancel_token_refresh();
		self.discard_session();
	}

	pub(crate) fn client(&self) -> &Arc<dyn OidcClient> {
		&self.client
	}

	pub(crate) fn refresh_schedule(&self) -> &RefreshSchedule {
		&self.refresh
	}

	pub(crate) fn weak_handle(&self) -> Weak<IdpAdapter> {
		self.weak.clone()
	}
}
impl Debug for IdpAdapter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdpAdapter")
			.field("descriptor", &self.descriptor)
			.field("refresh_armed", &self.refresh_armed())
			.finish()
	}
}
impl Drop for IdpAdapter {
	fn drop(&mut self) {
		self.cancel_token_refresh();
	}
}
