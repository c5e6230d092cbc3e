//! Convenience doubles and builders for integration tests; enabled via `cfg(test)`
//! or the `test` crate feature.

pub use crate::_prelude::*;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	auth::{TokenClaims, TokenSecret},
	clock::ManualClock,
	config::{ConfigGateway, ConfigResponse, ConfigTransport, TransportFailure, TransportFuture},
	idp::{
		ClientFuture, IdpDescriptor, IdpError, InitRequest, OidcClient, OidcClientFactory,
		RedirectOptions, UserProfile,
	},
	prefs::MemoryPreferences,
	session::{SessionOptions, SessionOrchestrator},
};

/// Config document reporting SSO disabled.
pub const SSO_DISABLED_DOCUMENT: &str = r#"{"keycloak":{"enabled":false}}"#;
/// Config document reporting SSO enabled with complete IdP fields.
pub const SSO_ENABLED_DOCUMENT: &str = r#"{
	"keycloak": {
		"enabled": true,
		"url": "https://idp.example.com/auth",
		"realm": "deploys",
		"client_id": "dashboard",
		"privileged_groups": ["admins"]
	}
}"#;
/// Config document reporting SSO enabled but missing the realm and client id.
pub const SSO_INCOMPLETE_DOCUMENT: &str =
	r#"{"keycloak":{"enabled":true,"url":"https://idp.example.com/auth"}}"#;

/// Canonical config endpoint used by the harness.
pub fn config_endpoint() -> Url {
	Url::parse("https://app.example.com/api/config").expect("Endpoint fixture should parse.")
}

/// Canned in-process [`ConfigTransport`] counting every fetch it serves.
pub struct StaticConfigTransport {
	result: RwLock<Result<ConfigResponse, TransportFailure>>,
	fetches: AtomicU64,
}
impl StaticConfigTransport {
	/// Serves the provided JSON document with status 200.
	pub fn with_document(document: &str) -> Arc<Self> {
		Self::with_status(200, document)
	}

	/// Serves the provided status + body.
	pub fn with_status(status: u16, body: &str) -> Arc<Self> {
		Arc::new(Self {
			result: RwLock::new(Ok(ConfigResponse { status, body: body.as_bytes().to_vec() })),
			fetches: AtomicU64::new(0),
		})
	}

	/// Fails every fetch at the transport level (no response at all).
	pub fn unreachable() -> Arc<Self> {
		Arc::new(Self {
			result: RwLock::new(Err(TransportFailure::new("connection refused"))),
			fetches: AtomicU64::new(0),
		})
	}

	/// Swaps the served document for subsequent fetches.
	pub fn set_document(&self, document: &str) {
		self.set_status(200, document);
	}

	/// Swaps the served status + body for subsequent fetches.
	pub fn set_status(&self, status: u16, body: &str) {
		*self.result.write() = Ok(ConfigResponse { status, body: body.as_bytes().to_vec() });
	}

	/// Number of fetches served so far.
	pub fn fetches(&self) -> u64 {
		self.fetches.load(Ordering::Relaxed)
	}
}
impl ConfigTransport for StaticConfigTransport {
	fn fetch(&self, _endpoint: &Url) -> TransportFuture<'_> {
		self.fetches.fetch_add(1, Ordering::Relaxed);

		let result = self.result.read().clone();

		Box::pin(async move { result })
	}
}

/// Scripted outcome for one init shape of [`MockOidcClient`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockInitBehavior {
	/// Init establishes the fixture session and resolves `true`.
	Authenticate,
	/// Init resolves `false` without a session (the mechanism itself works).
	NoSession,
	/// Init throws.
	Fail,
}

/// Scripted outcome for [`MockOidcClient`]'s `update_token`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockRefreshBehavior {
	/// Refresh issues a rotated token and resolves `true`.
	Rotate,
	/// Token is still valid; refresh resolves `false`.
	StillValid,
	/// Refresh throws and the client drops its session.
	Fail,
}

type MockSession = (TokenSecret, TokenClaims);
type ProfileScript = Result<Option<Vec<String>>, IdpError>;

/// Scripted black-box OIDC client recording every interaction.
pub struct MockOidcClient {
	fixture: Mutex<MockSession>,
	session: Mutex<Option<MockSession>>,
	silent: Mutex<MockInitBehavior>,
	interactive: Mutex<MockInitBehavior>,
	callback: Mutex<MockInitBehavior>,
	refresh: Mutex<MockRefreshBehavior>,
	profile_groups: Mutex<ProfileScript>,
	init_requests: Mutex<Vec<InitRequest>>,
	login_redirects: Mutex<Vec<RedirectOptions>>,
	logout_redirects: Mutex<Vec<RedirectOptions>>,
	profile_calls: AtomicU64,
	update_calls: AtomicU64,
	rotations: AtomicU64,
}
impl MockOidcClient {
	/// Creates a client with the default fixture session and conservative
	/// behaviors: silent probing finds no session, interactive and callback
	/// inits authenticate, refresh reports the token still valid.
	pub fn new() -> Arc<Self> {
		let claims = TokenClaims {
			subject: Some("user-1".into()),
			name: Some("User One".into()),
			preferred_username: Some("user.one".into()),
			email: Some("user.one@example.com".into()),
			groups: vec!["operators".into()],
			expires_at: None,
		};

		Arc::new(Self {
			fixture: Mutex::new((TokenSecret::new("access-0"), claims)),
			session: Mutex::new(None),
			silent: Mutex::new(MockInitBehavior::NoSession),
			interactive: Mutex::new(MockInitBehavior::Authenticate),
			callback: Mutex::new(MockInitBehavior::Authenticate),
			refresh: Mutex::new(MockRefreshBehavior::StillValid),
			profile_groups: Mutex::new(Ok(Some(vec!["operators".into()]))),
			init_requests: Mutex::new(Vec::new()),
			login_redirects: Mutex::new(Vec::new()),
			logout_redirects: Mutex::new(Vec::new()),
			profile_calls: AtomicU64::new(0),
			update_calls: AtomicU64::new(0),
			rotations: AtomicU64::new(0),
		})
	}

	/// Scripts the silent init outcome.
	pub fn set_silent(&self, behavior: MockInitBehavior) {
		*self.silent.lock() = behavior;
	}

	/// Scripts the interactive init outcome.
	pub fn set_interactive(&self, behavior: MockInitBehavior) {
		*self.interactive.lock() = behavior;
	}

	/// Scripts the callback init outcome.
	pub fn set_callback(&self, behavior: MockInitBehavior) {
		*self.callback.lock() = behavior;
	}

	/// Scripts the refresh outcome.
	pub fn set_refresh(&self, behavior: MockRefreshBehavior) {
		*self.refresh.lock() = behavior;
	}

	/// Scripts the user-profile groups payload.
	pub fn set_profile_groups(&self, groups: Option<Vec<String>>) {
		*self.profile_groups.lock() = Ok(groups);
	}

	/// Makes every user-profile call fail.
	pub fn fail_profile(&self) {
		*self.profile_groups.lock() = Err(IdpError::profile("mock profile failure"));
	}

	/// Replaces the claims installed by successful authentications.
	pub fn set_fixture_claims(&self, claims: TokenClaims) {
		self.fixture.lock().1 = claims;
	}

	/// Marks the client authenticated with the fixture session, as if a prior
	/// init already ran.
	pub fn establish_session(&self) {
		*self.session.lock() = Some(self.fixture.lock().clone());
	}

	/// Drops the client-side session.
	pub fn drop_session(&self) {
		*self.session.lock() = None;
	}

	/// Every `init` request received, in order.
	pub fn init_requests(&self) -> Vec<InitRequest> {
		self.init_requests.lock().clone()
	}

	/// Every login redirect received, in order.
	pub fn login_redirects(&self) -> Vec<RedirectOptions> {
		self.login_redirects.lock().clone()
	}

	/// Every logout redirect received, in order.
	pub fn logout_redirects(&self) -> Vec<RedirectOptions> {
		self.logout_redirects.lock().clone()
	}

	/// Number of user-profile calls served.
	pub fn profile_calls(&self) -> u64 {
		self.profile_calls.load(Ordering::Relaxed)
	}

	/// Number of `update_token` calls served.
	pub fn update_calls(&self) -> u64 {
		self.update_calls.load(Ordering::Relaxed)
	}

	fn behavior_for(&self, request: &InitRequest) -> MockInitBehavior {
		if request.authorization_response.is_some() {
			*self.callback.lock()
		} else if request.silent_redirect_uri.is_some() {
			*self.silent.lock()
		} else {
			*self.interactive.lock()
		}
	}

	fn apply_init(&self, behavior: MockInitBehavior) -> Result<bool, IdpError> {
		match behavior {
			MockInitBehavior::Authenticate => {
				self.establish_session();

				Ok(true)
			},
			MockInitBehavior::NoSession => {
				self.drop_session();

				Ok(false)
			},
			MockInitBehavior::Fail => {
				self.drop_session();

				Err(IdpError::interaction("mock init failure"))
			},
		}
	}
}
impl OidcClient for MockOidcClient {
	fn init(&self, request: InitRequest) -> ClientFuture<'_, bool> {
		let behavior = self.behavior_for(&request);

		self.init_requests.lock().push(request);

		let result = self.apply_init(behavior);

		Box::pin(async move { result })
	}

	fn login(&self, options: RedirectOptions) -> ClientFuture<'_, ()> {
		self.login_redirects.lock().push(options);
		self.establish_session();

		Box::pin(async move { Ok(()) })
	}

	fn logout(&self, options: RedirectOptions) -> ClientFuture<'_, ()> {
		self.logout_redirects.lock().push(options);
		self.drop_session();

		Box::pin(async move { Ok(()) })
	}

	fn update_token(&self, _min_validity: Duration) -> ClientFuture<'_, bool> {
		self.update_calls.fetch_add(1, Ordering::Relaxed);

		let result = match *self.refresh.lock() {
			MockRefreshBehavior::Rotate => {
				let serial = self.rotations.fetch_add(1, Ordering::Relaxed) + 1;
				let (base, claims) = self.fixture.lock().clone();
				let rotated = TokenSecret::new(format!("{}-r{serial}", base.expose()));

				*self.session.lock() = Some((rotated, claims));

				Ok(true)
			},
			MockRefreshBehavior::StillValid => Ok(false),
			MockRefreshBehavior::Fail => {
				self.drop_session();

				Err(IdpError::interaction("mock refresh failure"))
			},
		};

		Box::pin(async move { result })
	}

	fn load_user_info(&self) -> ClientFuture<'_, UserProfile> {
		self.profile_calls.fetch_add(1, Ordering::Relaxed);

		let result = self.profile_groups.lock().clone().map(|groups| UserProfile { groups });

		Box::pin(async move { result })
	}

	fn token(&self) -> Option<TokenSecret> {
		self.session.lock().as_ref().map(|(token, _)| token.clone())
	}

	fn token_claims(&self) -> Option<TokenClaims> {
		self.session.lock().as_ref().map(|(_, claims)| claims.clone())
	}

	fn authenticated(&self) -> bool {
		self.session.lock().is_some()
	}
}

/// Factory handing out one shared [`MockOidcClient`], counting constructions.
pub struct MockClientFactory {
	client: Arc<MockOidcClient>,
	connects: AtomicU64,
	fail_connect: Mutex<bool>,
}
impl MockClientFactory {
	/// Wraps the provided client.
	pub fn new(client: Arc<MockOidcClient>) -> Arc<Self> {
		Arc::new(Self { client, connects: AtomicU64::new(0), fail_connect: Mutex::new(false) })
	}

	/// Makes every subsequent construction fail.
	pub fn set_fail(&self, fail: bool) {
		*self.fail_connect.lock() = fail;
	}

	/// Number of constructions served.
	pub fn connects(&self) -> u64 {
		self.connects.load(Ordering::Relaxed)
	}
}
impl OidcClientFactory for MockClientFactory {
	fn connect(&self, _descriptor: &IdpDescriptor) -> Result<Arc<dyn OidcClient>, IdpError> {
		self.connects.fetch_add(1, Ordering::Relaxed);

		if *self.fail_connect.lock() {
			return Err(IdpError::construction("mock factory failure"));
		}

		Ok(self.client.clone())
	}
}

/// Everything an integration test needs, pre-wired.
pub struct TestHarness {
	/// Orchestrator under test.
	pub orchestrator: Arc<SessionOrchestrator>,
	/// Shared scripted client.
	pub client: Arc<MockOidcClient>,
	/// Factory the orchestrator constructs clients through.
	pub factory: Arc<MockClientFactory>,
	/// Canned config transport behind the gateway.
	pub transport: Arc<StaticConfigTransport>,
	/// Handle on the "persistent" preference storage.
	pub prefs: MemoryPreferences,
	/// Virtual clock injected into every time-gated operation.
	pub clock: Arc<ManualClock>,
}

/// Builds a harness serving the provided config document with default options.
pub fn build_harness(document: &str) -> TestHarness {
	build_harness_with(document, SessionOptions::default())
}

/// Builds a harness serving the provided config document and options.
pub fn build_harness_with(document: &str, options: SessionOptions) -> TestHarness {
	let transport = StaticConfigTransport::with_document(document);
	let gateway = Arc::new(ConfigGateway::with_transport(config_endpoint(), transport.clone()));
	let client = MockOidcClient::new();
	let factory = MockClientFactory::new(client.clone());
	let prefs = MemoryPreferences::default();
	let clock = Arc::new(ManualClock::default());
	let orchestrator = Arc::new(
		SessionOrchestrator::new(gateway, Arc::new(prefs.clone()), factory.clone())
			.with_clock(clock.clone())
			.with_options(options),
	);

	TestHarness { orchestrator, client, factory, transport, prefs, clock }
}
