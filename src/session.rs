//! Session orchestration: the state machine behind the embedding UI's auth hooks.
//!
//! One [`SessionOrchestrator`] lives per tab, injected at app start. It owns the
//! shared mutable pieces (config memo via the gateway, adapter slot, token and
//! group caches, the silent-attempt outcome) and exposes the hook-point surface
//! the UI framework calls: [`initialize_auth`](SessionOrchestrator::initialize_auth),
//! [`check_auth`](SessionOrchestrator::check_auth),
//! [`login`](SessionOrchestrator::login), [`logout`](SessionOrchestrator::logout),
//! [`check_error`](SessionOrchestrator::check_error),
//! [`get_permissions`](SessionOrchestrator::get_permissions), and
//! [`get_identity`](SessionOrchestrator::get_identity).

pub mod state;

pub use state::*;

mod access;
mod bootstrap;
mod guard;
mod validate;

pub use bootstrap::Bootstrap;
pub use validate::ValidationMode;

// self
use crate::{
	_prelude::*,
	auth::{GroupsCache, TokenStore},
	clock::{Clock, SystemClock},
	config::ConfigGateway,
	idp::{IdpAdapter, IdpDescriptor, OidcClientFactory, RefreshSettings},
	prefs::PreferenceStore,
};

/// Deployment-specific knobs; the defaults fit a root-mounted browser app.
#[derive(Clone, Debug)]
pub struct SessionOptions {
	/// Base path the app is deployed under; redirect targets resolve against it.
	pub base_path: String,
	/// Origin used to absolutize redirect URIs; `None` degrades resolution to
	/// path-only URIs (non-browser execution).
	pub origin: Option<Url>,
	/// Well-known same-origin asset the silent hidden frame redirects back to,
	/// relative to the base path.
	pub silent_callback_asset: String,
	/// Refresh-timer cadence.
	pub refresh: RefreshSettings,
	/// Minimum age before cached groups are revalidated against the IdP.
	pub revalidation_interval: Duration,
}
impl Default for SessionOptions {
	fn default() -> Self {
		Self {
			base_path: "/".into(),
			origin: None,
			silent_callback_asset: "silent-check-sso.html".into(),
			refresh: RefreshSettings::default(),
			revalidation_interval: Duration::seconds(60),
		}
	}
}

/// Coordinates the OIDC session against one identity provider.
///
/// All interior state is behind shared-ownership handles so the orchestrator
/// itself can sit in an `Arc` and be consulted concurrently from UI hook
/// points; re-entrant callers cannot duplicate side effects because every
/// mutation path is guarded (async singleflight for the adapter slot and
/// validation gate, plain locks for the rest).
pub struct SessionOrchestrator {
	/// Gateway consulted for SSO enablement and IdP descriptors.
	pub gateway: Arc<ConfigGateway>,
	/// Persistent store for the silent re-auth preference.
	pub prefs: Arc<dyn PreferenceStore>,
	/// Factory consulted at most once to construct the OIDC client.
	pub factory: Arc<dyn OidcClientFactory>,
	/// Process-wide bearer-token holder shared with unrelated HTTP code.
	pub token_store: TokenStore,
	/// Clock injected for deterministic time-gated operations.
	pub clock: Arc<dyn Clock>,
	options: SessionOptions,
	groups: GroupsCache,
	adapter: AsyncMutex<Option<Arc<IdpAdapter>>>,
	state: Mutex<SessionState>,
	silent: Mutex<SilentOutcome>,
	validation_gate: AsyncMutex<()>,
}
impl SessionOrchestrator {
	/// Creates an orchestrator with the system clock and default options.
	///
	/// The persisted silent re-auth preference is read exactly once here and
	/// cached in memory for the remainder of the session.
	pub fn new(
		gateway: Arc<ConfigGateway>,
		prefs: Arc<dyn PreferenceStore>,
		factory: Arc<dyn OidcClientFactory>,
	) -> Self {
		let silent = SilentOutcome::from_persisted(prefs.silent_reauth_disabled());

		Self {
			gateway,
			prefs,
			factory,
			token_store: TokenStore::default(),
			clock: Arc::new(SystemClock),
			options: SessionOptions::default(),
			groups: GroupsCache::default(),
			adapter: AsyncMutex::new(None),
			state: Mutex::new(SessionState::Unknown),
			silent: Mutex::new(silent),
			validation_gate: AsyncMutex::new(()),
		}
	}

	/// Replaces the injected clock.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Replaces the shared token store handle.
	pub fn with_token_store(mut self, token_store: TokenStore) -> Self {
		self.token_store = token_store;

		self
	}

	/// Replaces the deployment options.
	pub fn with_options(mut self, options: SessionOptions) -> Self {
		self.options = options;

		self
	}

	/// Current deployment options.
	pub fn options(&self) -> &SessionOptions {
		&self.options
	}

	/// Current session state.
	pub fn state(&self) -> SessionState {
		*self.state.lock()
	}

	/// Current silent-attempt outcome.
	pub fn silent_outcome(&self) -> SilentOutcome {
		*self.silent.lock()
	}

	/// Cached group membership together with its provenance, when present.
	pub fn groups_snapshot(&self) -> Option<crate::auth::GroupsSnapshot> {
		self.groups.snapshot()
	}

	/// Returns `true` while a refresh timer is armed for the current session.
	pub async fn refresh_armed(&self) -> bool {
		match self.adapter_if_connected().await {
			Some(adapter) => adapter.refresh_armed(),
			None => false,
		}
	}

	/// Runs one refresh cycle immediately; see
	/// [`IdpAdapter::refresh_now`](crate::idp::IdpAdapter::refresh_now).
	///
	/// Fails with [`Error::Unauthorized`] when no adapter exists yet.
	pub async fn refresh_now(&self) -> Result<bool> {
		match self.adapter_if_connected().await {
			Some(adapter) => adapter.refresh_now().await,
			None => Err(Error::Unauthorized),
		}
	}

	/// Re-reads the persisted silent re-auth preference, discarding the cached
	/// in-memory outcome. Pairs with [`reset`](Self::reset) to simulate a page
	/// reload in tests.
	pub fn reload_preference(&self) {
		*self.silent.lock() = SilentOutcome::from_persisted(self.prefs.silent_reauth_disabled());
	}

	/// Restores every piece of shared state for test isolation: cancels the
	/// refresh timer, forgets the adapter, clears both caches and the config
	/// memo, and re-reads the persisted preference.
	pub async fn reset(&self) {
		if let Some(adapter) = self.adapter.lock().await.take() {
			adapter.teardown();
		}

		self.token_store.clear_access_token();
		self.groups.clear();
		self.gateway.reset();
		*self.state.lock() = SessionState::Unknown;
		self.reload_preference();
	}

	/// Returns the adapter, constructing it on first use.
	///
	/// Construction is idempotent: callers arriving while one is underway await
	/// the same slot and receive the same instance. The factory is consulted at
	/// most once per tab lifetime.
	pub(crate) async fn adapter(&self) -> Result<Arc<IdpAdapter>> {
		let mut slot = self.adapter.lock().await;

		if let Some(adapter) = slot.as_ref() {
			return Ok(adapter.clone());
		}

		let config = self.gateway.config().await?;
		let descriptor = IdpDescriptor::from_config(&config)?;
		let adapter = IdpAdapter::connect(
			descriptor,
			self.factory.as_ref(),
			self.token_store.clone(),
			self.groups.clone(),
			self.clock.clone(),
			self.options.refresh,
		)?;

		*slot = Some(adapter.clone());

		Ok(adapter)
	}

	/// Returns the adapter only if it was already constructed.
	pub(crate) async fn adapter_if_connected(&self) -> Option<Arc<IdpAdapter>> {
		self.adapter.lock().await.clone()
	}

	/// Clears session material unconditionally, going through the adapter when
	/// one exists so its timer dies with the session.
	pub(crate) async fn teardown_session(&self) {
		match self.adapter_if_connected().await {
			Some(adapter) => adapter.teardown(),
			None => {
				self.token_store.clear_access_token();
				self.groups.clear();
			},
		}
	}

	pub(crate) fn set_state(&self, next: SessionState) {
		*self.state.lock() = next;
	}

	pub(crate) fn mark_silent(&self, outcome: SilentOutcome) {
		*self.silent.lock() = outcome;
	}

	pub(crate) fn groups_cache(&self) -> &GroupsCache {
		&self.groups
	}
}
impl Debug for SessionOrchestrator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionOrchestrator")
			.field("state", &self.state())
			.field("silent", &self.silent_outcome())
			.field("token_cached", &self.token_store.has_access_token())
			.finish()
	}
}
