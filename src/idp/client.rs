//! Contract for the external OIDC client library.
//!
//! Protocol mechanics (token issuance, hidden-frame plumbing, redirect flows)
//! stay inside the implementation; the session manager only drives the three
//! initialization shapes below and reads the resulting session state. Test
//! doubles implement [`OidcClient`] directly.

// self
use crate::{_prelude::*, auth::{TokenClaims, TokenSecret}};

/// Boxed future returned by [`OidcClient`] operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, IdpError>> + 'a + Send>>;

/// Failures reported by the black-box OIDC client.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdpError {
	/// The client could not be constructed for the descriptor.
	#[error("OIDC client construction failed: {reason}.")]
	Construction {
		/// Client-supplied reason string.
		reason: String,
	},
	/// An init/login/logout/refresh interaction with the IdP failed.
	#[error("IdP interaction failed: {reason}.")]
	Interaction {
		/// Client-supplied reason string.
		reason: String,
	},
	/// The user-profile endpoint call failed.
	#[error("IdP user-profile request failed: {reason}.")]
	Profile {
		/// Client-supplied reason string.
		reason: String,
	},
}
impl IdpError {
	/// Builds a [`IdpError::Construction`] value.
	pub fn construction(reason: impl Into<String>) -> Self {
		Self::Construction { reason: reason.into() }
	}

	/// Builds a [`IdpError::Interaction`] value.
	pub fn interaction(reason: impl Into<String>) -> Self {
		Self::Interaction { reason: reason.into() }
	}

	/// Builds a [`IdpError::Profile`] value.
	pub fn profile(reason: impl Into<String>) -> Self {
		Self::Profile { reason: reason.into() }
	}
}

/// Session-discovery behavior requested from the client's `init`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnLoad {
	/// Probe for an existing IdP session without user-visible interaction.
	CheckSso,
	/// Force a full redirect to the IdP when no session is found.
	LoginRequired,
}

/// Authorization response carried in the current URL after an IdP redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationResponse {
	/// One-time authorization code to be exchanged by the client.
	pub code: String,
	/// Opaque state value round-tripped through the redirect.
	pub state: String,
	/// IdP session identifier, when the IdP appends one.
	pub session_state: Option<String>,
}

/// The three initialization shapes the orchestrator drives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitMode {
	/// Hidden-frame re-authentication against the well-known callback asset;
	/// interactive fallback is disabled so failure stays observable.
	Silent {
		/// Same-origin callback asset the hidden frame redirects back to.
		redirect_uri: String,
	},
	/// Full redirect to the IdP when no session exists.
	Interactive,
	/// Consume an authorization response already pending in the URL without
	/// forcing any further redirect.
	Callback {
		/// Parameters extracted from the current URL.
		response: AuthorizationResponse,
	},
}
impl InitMode {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			InitMode::Silent { .. } => "silent",
			InitMode::Interactive => "interactive",
			InitMode::Callback { .. } => "callback",
		}
	}

	/// Lowers the mode into the request handed to the client's `init`.
	pub fn into_request(self) -> InitRequest {
		match self {
			InitMode::Silent { redirect_uri } => InitRequest {
				on_load: OnLoad::CheckSso,
				silent_redirect_uri: Some(redirect_uri),
				interactive_fallback: false,
				authorization_response: None,
			},
			InitMode::Interactive => InitRequest {
				on_load: OnLoad::LoginRequired,
				silent_redirect_uri: None,
				interactive_fallback: true,
				authorization_response: None,
			},
			InitMode::Callback { response } => InitRequest {
				on_load: OnLoad::CheckSso,
				silent_redirect_uri: None,
				interactive_fallback: false,
				authorization_response: Some(response),
			},
		}
	}
}

/// Fully-lowered `init` request consumed by the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitRequest {
	/// Session-discovery behavior.
	pub on_load: OnLoad,
	/// Hidden-frame callback target; present only for silent initialization.
	pub silent_redirect_uri: Option<String>,
	/// Whether the client may fall back to an interactive redirect on its own.
	pub interactive_fallback: bool,
	/// Pending authorization response; present only for callback initialization.
	pub authorization_response: Option<AuthorizationResponse>,
}

/// Redirect target for interactive login/logout delegation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectOptions {
	/// Absolute URI, or path-only when no origin is resolvable.
	pub redirect_uri: String,
}

/// User-profile payload returned by the IdP's userinfo endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Current group memberships; absent when the IdP maps none.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub groups: Option<Vec<String>>,
}

/// Black-box OIDC client bound to one [`IdpDescriptor`](crate::idp::IdpDescriptor).
pub trait OidcClient
where
	Self: Send + Sync,
{
	/// Runs one initialization; resolves `true` when an authenticated session
	/// resulted. A thrown silent attempt is distinct from a clean `false`.
	fn init(&self, request: InitRequest) -> ClientFuture<'_, bool>;

	/// Delegates to the IdP's interactive login redirect.
	fn login(&self, options: RedirectOptions) -> ClientFuture<'_, ()>;

	/// Delegates to the IdP's logout redirect.
	fn logout(&self, options: RedirectOptions) -> ClientFuture<'_, ()>;

	/// Refreshes the token unless it stays valid for at least `min_validity`;
	/// resolves `true` when a new token was issued.
	fn update_token(&self, min_validity: Duration) -> ClientFuture<'_, bool>;

	/// Fetches the user profile from the IdP.
	fn load_user_info(&self) -> ClientFuture<'_, UserProfile>;

	/// Current bearer token, when a session is established.
	fn token(&self) -> Option<TokenSecret>;

	/// Decoded claims of the current token, when a session is established.
	fn token_claims(&self) -> Option<TokenClaims>;

	/// Whether the client currently reports an authenticated session.
	fn authenticated(&self) -> bool;
}

/// Creates [`OidcClient`] instances for a validated descriptor.
///
/// Injected once at orchestrator construction; the orchestrator guarantees it
/// is consulted at most once per tab lifetime.
pub trait OidcClientFactory
where
	Self: Send + Sync,
{
	/// Constructs the client bound to the descriptor.
	fn connect(
		&self,
		descriptor: &crate::idp::IdpDescriptor,
	) -> Result<Arc<dyn OidcClient>, IdpError>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn silent_mode_disables_interactive_fallback() {
		let request =
			InitMode::Silent { redirect_uri: "/silent-check-sso.html".into() }.into_request();

		assert_eq!(request.on_load, OnLoad::CheckSso);
		assert_eq!(request.silent_redirect_uri.as_deref(), Some("/silent-check-sso.html"));
		assert!(!request.interactive_fallback);
		assert_eq!(request.authorization_response, None);
	}

	#[test]
	fn interactive_mode_forces_login() {
		let request = InitMode::Interactive.into_request();

		assert_eq!(request.on_load, OnLoad::LoginRequired);
		assert_eq!(request.silent_redirect_uri, None);
		assert!(request.interactive_fallback);
	}

	#[test]
	fn callback_mode_carries_the_pending_response() {
		let response = AuthorizationResponse {
			code: "one-time-code".into(),
			state: "opaque-state".into(),
			session_state: None,
		};
		let request = InitMode::Callback { response: response.clone() }.into_request();

		assert_eq!(request.on_load, OnLoad::CheckSso);
		assert!(!request.interactive_fallback);
		assert_eq!(request.authorization_response, Some(response));
	}
}
