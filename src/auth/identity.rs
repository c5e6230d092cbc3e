//! Identity and permission records consumed by the embedding UI shell.

// self
use crate::{_prelude::*, auth::TokenClaims};

/// Identity record mapped from decoded token claims; no network involved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Stable principal identifier (`sub` claim), or `anonymous`.
	pub id: String,
	/// Human-readable name: `name` claim, falling back to `preferred_username`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub full_name: Option<String>,
	/// Email address, when the IdP maps one into the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}
impl Identity {
	/// Fixed identity handed out when SSO is disabled.
	pub fn anonymous() -> Self {
		Self { id: "anonymous".into(), full_name: None, email: None }
	}

	/// Maps decoded claims into an identity record.
	pub fn from_claims(claims: &TokenClaims) -> Self {
		Self {
			id: claims.subject.clone().unwrap_or_default(),
			full_name: claims.name.clone().or_else(|| claims.preferred_username.clone()),
			email: claims.email.clone(),
		}
	}
}

/// Group memberships paired with the deployment's privileged-group list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
	/// Groups the current session belongs to.
	pub groups: Vec<String>,
	/// Privileged groups reported by the server configuration.
	pub privileged_groups: Vec<String>,
}
impl Permissions {
	/// Returns `true` when the session belongs to at least one privileged group.
	pub fn is_privileged(&self) -> bool {
		self.groups.iter().any(|group| self.privileged_groups.contains(group))
	}
}
