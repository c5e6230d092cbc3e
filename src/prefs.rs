//! Degrade-safe persistence for the silent re-authentication preference.

pub mod file;
pub mod memory;

pub use file::FilePreferences;
pub use memory::MemoryPreferences;

/// Capability contract for the single persisted decision: "silent re-auth is
/// known to fail".
///
/// Implementations must never let a storage failure escape. Reads degrade to
/// "assume enabled" and writes degrade to no-ops, each with a logged warning,
/// so the session manager keeps functioning in storage-restricted embedding
/// contexts. The orchestrator reads the flag once at construction and caches
/// it in memory for the rest of the session.
pub trait PreferenceStore
where
	Self: Send + Sync,
{
	/// Reads the persisted flag; `false` when unset or unreadable.
	fn silent_reauth_disabled(&self) -> bool;

	/// Persists the flag; silently drops the write when storage is unavailable.
	fn set_silent_reauth_disabled(&self, disabled: bool);
}
