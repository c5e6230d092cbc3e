//! Server-reported configuration: wire decoding and the memoizing gateway.

pub mod gateway;

pub use gateway::*;

// self
use crate::_prelude::*;

/// Wire document served by the config endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct ConfigDocument {
	#[serde(default)]
	keycloak: KeycloakSection,
}

/// `keycloak` section of the wire document; all IdP fields are optional on the
/// wire and validated only when an adapter is constructed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct KeycloakSection {
	#[serde(default)]
	enabled: bool,
	#[serde(default)]
	url: Option<String>,
	#[serde(default)]
	realm: Option<String>,
	#[serde(default)]
	client_id: Option<String>,
	#[serde(default)]
	privileged_groups: Vec<String>,
}

/// Immutable server configuration; fetched at most once per tab lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
	/// Whether single sign-on is enabled for this deployment.
	pub sso_enabled: bool,
	/// IdP base URL as reported, unvalidated.
	pub issuer: Option<String>,
	/// IdP realm as reported, unvalidated.
	pub realm: Option<String>,
	/// OIDC client identifier as reported, unvalidated.
	pub client_id: Option<String>,
	/// Groups granted privileged access by the deployment.
	pub privileged_groups: Vec<String>,
}
impl ServerConfig {
	/// Decodes the wire document, reporting the offending path on mismatch.
	pub fn from_slice(bytes: &[u8]) -> Result<Self> {
		let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
		let document: ConfigDocument = serde_path_to_error::deserialize(deserializer)
			.map_err(|source| Error::ConfigMalformed { source })?;

		Ok(Self::from(document))
	}

	/// Builds a config with SSO switched off; the anonymous deployment shape.
	pub fn sso_disabled() -> Self {
		Self {
			sso_enabled: false,
			issuer: None,
			realm: None,
			client_id: None,
			privileged_groups: Vec::new(),
		}
	}
}
impl From<ConfigDocument> for ServerConfig {
	fn from(document: ConfigDocument) -> Self {
		let KeycloakSection { enabled, url, realm, client_id, privileged_groups } =
			document.keycloak;

		Self { sso_enabled: enabled, issuer: url, realm, client_id, privileged_groups }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decodes_a_complete_document() {
		let payload = br#"{
			"keycloak": {
				"enabled": true,
				"url": "https://idp.example.com/auth",
				"realm": "deploys",
				"client_id": "dashboard",
				"privileged_groups": ["admins"]
			}
		}"#;
		let config =
			ServerConfig::from_slice(payload).expect("Complete document should decode cleanly.");

		assert!(config.sso_enabled);
		assert_eq!(config.issuer.as_deref(), Some("https://idp.example.com/auth"));
		assert_eq!(config.realm.as_deref(), Some("deploys"));
		assert_eq!(config.client_id.as_deref(), Some("dashboard"));
		assert_eq!(config.privileged_groups, vec!["admins".to_owned()]);
	}

	#[test]
	fn missing_sections_read_as_sso_disabled() {
		let config =
			ServerConfig::from_slice(b"{}").expect("Empty document should decode cleanly.");

		assert_eq!(config, ServerConfig::sso_disabled());
	}

	#[test]
	fn malformed_documents_report_the_offending_path() {
		let err = ServerConfig::from_slice(br#"{"keycloak":{"enabled":"yes"}}"#)
			.expect_err("Type mismatch should fail decoding.");

		let Error::ConfigMalformed { source } = err else {
			panic!("Expected ConfigMalformed, got {err:?}.");
		};

		assert_eq!(source.path().to_string(), "keycloak.enabled");
	}
}
