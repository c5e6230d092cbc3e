//! Session-manager error taxonomy shared across the gateway, adapter, and orchestrator.

// self
use crate::{_prelude::*, idp::IdpError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical session-manager error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Configuration endpoint returned a non-success status or was unreachable.
	///
	/// A status of `0` means the transport produced no response at all. The config
	/// memo is cleared before this error surfaces, so a later call retries the fetch.
	#[error("Configuration endpoint is unavailable (status {status}).")]
	ConfigUnavailable {
		/// HTTP status code, or `0` for transport-level failures.
		status: u16,
		/// Response body captured for diagnostics, when one was received.
		body: Option<String>,
	},
	/// Configuration endpoint responded with JSON that could not be decoded.
	#[error("Configuration document is malformed.")]
	ConfigMalformed {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Server-reported IdP descriptor is missing a required field; fatal, never retried.
	#[error(transparent)]
	IdpConfig(#[from] IdpConfigError),
	/// Processing a pending authorization response failed.
	///
	/// The authorization-response parameters are stripped regardless of outcome so a
	/// reload cannot re-enter the callback path; `cleaned_url` carries the result.
	#[error("Authorization callback processing failed.")]
	AuthCallbackFailed {
		/// Current URL with the authorization-response parameters removed.
		cleaned_url: Option<Url>,
		/// Underlying IdP failure, when the client reported one.
		source: Option<IdpError>,
	},
	/// No authenticated session is available; the designed control-flow signal that
	/// lets the caller present a login affordance. Not a bug.
	#[error("No authenticated session is available.")]
	Unauthorized,
	/// Silent re-authentication threw; future attempts are downgraded via the
	/// persisted preference instead of being retried every navigation.
	#[error("Silent re-authentication failed: {reason}.")]
	SilentReauthFailed {
		/// IdP- or client-supplied reason string.
		reason: String,
	},
	/// Token refresh failed; the session is torn down so the next `check_auth`
	/// re-establishes it from scratch.
	#[error("Token refresh failed: {reason}.")]
	RefreshFailed {
		/// IdP- or client-supplied reason string.
		reason: String,
	},
	/// Failure reported by the black-box OIDC client.
	#[error(transparent)]
	Idp(#[from] IdpError),
}
impl Error {
	/// Builds the [`Error::ConfigUnavailable`] value for a transport-level failure.
	pub fn config_transport_failure() -> Self {
		Self::ConfigUnavailable { status: 0, body: None }
	}

	/// Returns `true` for the expected "show the login affordance" control-flow signal.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized)
	}
}

/// Validation failures raised while assembling the IdP descriptor from server config.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdpConfigError {
	/// SSO is enabled but the issuer URL is absent.
	#[error("IdP configuration is missing the issuer URL.")]
	MissingIssuer,
	/// SSO is enabled but the realm is absent or empty.
	#[error("IdP configuration is missing the realm.")]
	MissingRealm,
	/// SSO is enabled but the client identifier is absent or empty.
	#[error("IdP configuration is missing the client identifier.")]
	MissingClientId,
	/// Issuer value is present but cannot be parsed as an absolute URL.
	#[error("IdP issuer URL is invalid: {value}.")]
	InvalidIssuer {
		/// Raw issuer value that failed parsing.
		value: String,
	},
}
