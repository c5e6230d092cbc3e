//! Cached group membership with provenance and staleness tracking.

// self
use crate::_prelude::*;

/// Where the cached group list came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupSource {
	/// Snapshot of the `groups` claim baked into the token at issuance.
	Token,
	/// Authoritative list from the IdP's user-profile endpoint.
	Profile,
}
impl GroupSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GroupSource::Token => "token",
			GroupSource::Profile => "profile",
		}
	}
}
impl Display for GroupSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One cached group listing with its provenance and validation stamp.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupsSnapshot {
	/// Group memberships as last observed.
	pub groups: Vec<String>,
	/// Provenance of the listing.
	pub source: GroupSource,
	/// Instant the listing was last validated against the IdP.
	pub validated_at: OffsetDateTime,
}

/// Shared cache of the session's group membership.
///
/// Invalidated on logout and on any refresh/validation failure that forces
/// re-authentication; staleness is judged against the revalidation interval so
/// bursts of permission checks inside one window reuse the cached listing.
#[derive(Clone, Debug, Default)]
pub struct GroupsCache(Arc<RwLock<Option<GroupsSnapshot>>>);
impl GroupsCache {
	/// Replaces the cached listing.
	pub fn store(&self, groups: Vec<String>, source: GroupSource, validated_at: OffsetDateTime) {
		*self.0.write() = Some(GroupsSnapshot { groups, source, validated_at });
	}

	/// Returns a clone of the cached listing, if one exists.
	pub fn snapshot(&self) -> Option<GroupsSnapshot> {
		self.0.read().clone()
	}

	/// Drops the cached listing.
	pub fn clear(&self) {
		*self.0.write() = None;
	}

	/// Re-stamps the validation instant without touching the listing itself.
	///
	/// No-op when the cache is empty; an empty cache stays stale until a listing
	/// is stored.
	pub fn stamp_validated(&self, instant: OffsetDateTime) {
		if let Some(snapshot) = self.0.write().as_mut() {
			snapshot.validated_at = instant;
		}
	}

	/// Returns `true` when the cached listing is absent or older than `interval`.
	pub fn is_stale_at(&self, instant: OffsetDateTime, interval: Duration) -> bool {
		match self.0.read().as_ref() {
			Some(snapshot) => instant - snapshot.validated_at >= interval,
			None => true,
		}
	}
}
