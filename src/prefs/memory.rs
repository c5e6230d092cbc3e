//! Volatile [`PreferenceStore`] for tests and storage-restricted embeddings.

// self
use crate::{_prelude::*, prefs::PreferenceStore};

/// In-process preference store; the flag lives as long as the value itself.
///
/// Clones share the same slot, which lets tests keep a handle on "persistent"
/// storage while the orchestrator they reset is rebuilt around it.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences(Arc<RwLock<bool>>);
impl PreferenceStore for MemoryPreferences {
	fn silent_reauth_disabled(&self) -> bool {
		*self.0.read()
	}

	fn set_silent_reauth_disabled(&self, disabled: bool) {
		*self.0.write() = disabled;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn clones_observe_each_others_writes() {
		let store = MemoryPreferences::default();
		let observer = store.clone();

		assert!(!observer.silent_reauth_disabled());

		store.set_silent_reauth_disabled(true);

		assert!(observer.silent_reauth_disabled());
	}
}
