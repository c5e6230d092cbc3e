//! File-backed [`PreferenceStore`] surviving restarts of the embedding process.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, prefs::PreferenceStore};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PreferenceDocument {
	#[serde(default)]
	silent_reauth_disabled: bool,
}

/// Persists the preference document as JSON after each write.
///
/// Every failure path degrades instead of propagating: unreadable or malformed
/// documents read as "silent re-auth enabled", failed writes leave the previous
/// document in place. Replacement goes through a sibling tmp file plus rename so
/// a crash mid-write can never leave a torn document behind.
#[derive(Clone, Debug)]
pub struct FilePreferences {
	path: PathBuf,
}
impl FilePreferences {
	/// Binds the store to the provided document path; nothing is touched until
	/// the first write.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	fn load(&self) -> Option<PreferenceDocument> {
		if !self.path.exists() {
			return None;
		}

		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) => {
				tracing::warn!(
					path = %self.path.display(),
					error = %e,
					"Preference document is unreadable; assuming silent re-auth is enabled.",
				);

				return None;
			},
		};

		match serde_json::from_slice(&bytes) {
			Ok(document) => Some(document),
			Err(e) => {
				tracing::warn!(
					path = %self.path.display(),
					error = %e,
					"Preference document is malformed; assuming silent re-auth is enabled.",
				);

				None
			},
		}
	}

	fn persist(&self, document: &PreferenceDocument) -> std::io::Result<()> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec_pretty(document).map_err(std::io::Error::other)?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path)?;

			file.write_all(&serialized)?;
			file.sync_all()?;
		}

		fs::rename(&tmp_path, &self.path)
	}

	fn ensure_parent_exists(path: &Path) -> std::io::Result<()> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent)?;
		}

		Ok(())
	}
}
impl PreferenceStore for FilePreferences {
	fn silent_reauth_disabled(&self) -> bool {
		self.load().unwrap_or_default().silent_reauth_disabled
	}

	fn set_silent_reauth_disabled(&self, disabled: bool) {
		let document = PreferenceDocument { silent_reauth_disabled: disabled };

		if let Err(e) = self.persist(&document) {
			tracing::warn!(
				path = %self.path.display(),
				error = %e,
				"Failed to persist the silent re-auth preference; keeping the previous value.",
			);
		}
	}
}
