//! Explicit session states so guard transitions are visible in the types.

// self
use crate::{_prelude::*, auth::GroupSource};

/// Session lifecycle as observed by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
	/// No entry point has resolved the configuration yet.
	Unknown,
	/// SSO is disabled; every guard resolves as an anonymous session.
	Disabled,
	/// SSO is enabled and no authenticated session exists.
	Unauthenticated,
	/// An authenticated session exists.
	Authenticated {
		/// Provenance of the cached group membership: profile-sourced listings
		/// are authoritative, token-sourced ones are the fallback.
		groups_from: GroupSource,
	},
}
impl SessionState {
	/// Returns `true` for either authenticated sub-state.
	pub fn is_authenticated(self) -> bool {
		matches!(self, Self::Authenticated { .. })
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SessionState::Unknown => "unknown",
			SessionState::Disabled => "disabled",
			SessionState::Unauthenticated => "unauthenticated",
			SessionState::Authenticated { groups_from: GroupSource::Token } =>
				"authenticated_token_groups",
			SessionState::Authenticated { groups_from: GroupSource::Profile } =>
				"authenticated_profile_groups",
		}
	}
}
impl Display for SessionState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome of silent re-authentication attempts, including the persisted
/// cross-reload memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SilentOutcome {
	/// No attempt has been made this session and none is known to fail.
	Untried,
	/// The last attempt this session established a session.
	Succeeded,
	/// A silent attempt threw, here or in a previous tab lifetime; further
	/// attempts are skipped until a reload observes a cleared preference.
	KnownToFail,
}
impl SilentOutcome {
	/// Maps the persisted preference flag into the in-memory outcome.
	pub fn from_persisted(disabled: bool) -> Self {
		if disabled { Self::KnownToFail } else { Self::Untried }
	}

	/// Returns `true` while silent attempts are still worth making.
	pub fn attempt_allowed(self) -> bool {
		!matches!(self, Self::KnownToFail)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn persisted_flag_maps_onto_outcomes() {
		assert_eq!(SilentOutcome::from_persisted(false), SilentOutcome::Untried);
		assert_eq!(SilentOutcome::from_persisted(true), SilentOutcome::KnownToFail);
		assert!(SilentOutcome::Untried.attempt_allowed());
		assert!(SilentOutcome::Succeeded.attempt_allowed());
		assert!(!SilentOutcome::KnownToFail.attempt_allowed());
	}

	#[test]
	fn state_labels_distinguish_group_provenance() {
		let token = SessionState::Authenticated { groups_from: GroupSource::Token };
		let profile = SessionState::Authenticated { groups_from: GroupSource::Profile };

		assert!(token.is_authenticated());
		assert_ne!(token.as_str(), profile.as_str());
		assert!(!SessionState::Unknown.is_authenticated());
	}
}
