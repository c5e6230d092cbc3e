//! Redacting bearer-token wrapper and the process-wide token holder.

// self
use crate::_prelude::*;

/// Redacted bearer-token wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Shared holder for the current bearer token.
///
/// One instance lives for the tab's lifetime; clones share the same slot so
/// unrelated HTTP-calling code can attach bearer headers without reaching into
/// the orchestrator. The orchestrator is the only writer.
#[derive(Clone, Debug, Default)]
pub struct TokenStore(Arc<RwLock<Option<TokenSecret>>>);
impl TokenStore {
	/// Replaces the current bearer token; `None` clears it.
	pub fn set_access_token(&self, token: Option<TokenSecret>) {
		*self.0.write() = token;
	}

	/// Returns a clone of the current bearer token, if one is held.
	pub fn get_access_token(&self) -> Option<TokenSecret> {
		self.0.read().clone()
	}

	/// Drops the current bearer token.
	pub fn clear_access_token(&self) {
		*self.0.write() = None;
	}

	/// Returns `true` when a bearer token is currently held.
	pub fn has_access_token(&self) -> bool {
		self.0.read().is_some()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn clones_share_the_same_slot() {
		let store = TokenStore::default();
		let consumer = store.clone();

		store.set_access_token(Some(TokenSecret::new("bearer-1")));

		assert_eq!(consumer.get_access_token().as_ref().map(TokenSecret::expose), Some("bearer-1"));

		consumer.clear_access_token();

		assert!(!store.has_access_token());
	}
}
