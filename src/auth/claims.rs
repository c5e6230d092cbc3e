//! Decoded ID-token claims surfaced by the black-box OIDC client.

// self
use crate::_prelude::*;

/// Claim subset the session manager reads from a decoded token.
///
/// The client library owns decoding; this struct only mirrors the fields the
/// orchestrator consumes for identity mapping and group fallbacks. Unknown
/// claims are ignored on deserialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// `sub` claim identifying the principal.
	#[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
	/// Display name, when the IdP maps one into the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Login name fallback used when no display name is mapped.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub preferred_username: Option<String>,
	/// Email address, when mapped.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Group memberships baked into the token at issuance time.
	#[serde(default)]
	pub groups: Vec<String>,
	/// `exp` claim as an absolute instant.
	#[serde(rename = "exp", default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenClaims {
	/// Returns `true` when the token is still valid at the provided instant.
	///
	/// Tokens without an `exp` claim are treated as live; expiry enforcement for
	/// those rests entirely on the IdP session check.
	pub fn is_live_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_none_or(|expires_at| instant < expires_at)
	}
}
