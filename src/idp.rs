//! Identity-provider surface: validated descriptor, black-box client contract,
//! and the adapter that owns session side effects and refresh scheduling.

pub mod adapter;
pub mod client;
pub mod refresh;

pub use adapter::*;
pub use client::*;
pub use refresh::*;

// self
use crate::{_prelude::*, config::ServerConfig, error::IdpConfigError};

/// Validated IdP connection descriptor assembled from server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdpDescriptor {
	/// IdP base URL.
	pub issuer: Url,
	/// Realm the deployment authenticates against.
	pub realm: String,
	/// OIDC client identifier registered for the dashboard.
	pub client_id: String,
}
impl IdpDescriptor {
	/// Validates the server-reported IdP fields; any gap is fatal and not retried.
	pub fn from_config(config: &ServerConfig) -> Result<Self, IdpConfigError> {
		let issuer_raw = config
			.issuer
			.as_deref()
			.filter(|value| !value.is_empty())
			.ok_or(IdpConfigError::MissingIssuer)?;
		let issuer = Url::parse(issuer_raw)
			.map_err(|_| IdpConfigError::InvalidIssuer { value: issuer_raw.to_owned() })?;
		let realm = config
			.realm
			.clone()
			.filter(|value| !value.is_empty())
			.ok_or(IdpConfigError::MissingRealm)?;
		let client_id = config
			.client_id
			.clone()
			.filter(|value| !value.is_empty())
			.ok_or(IdpConfigError::MissingClientId)?;

		Ok(Self { issuer, realm, client_id })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn complete_config() -> ServerConfig {
		ServerConfig {
			sso_enabled: true,
			issuer: Some("https://idp.example.com/auth".into()),
			realm: Some("deploys".into()),
			client_id: Some("dashboard".into()),
			privileged_groups: Vec::new(),
		}
	}

	#[test]
	fn complete_fields_validate() {
		let descriptor = IdpDescriptor::from_config(&complete_config())
			.expect("Complete IdP fields should validate.");

		assert_eq!(descriptor.issuer.as_str(), "https://idp.example.com/auth");
		assert_eq!(descriptor.realm, "deploys");
		assert_eq!(descriptor.client_id, "dashboard");
	}

	#[test]
	fn each_missing_field_is_named() {
		let mut config = complete_config();

		config.issuer = None;

		assert_eq!(IdpDescriptor::from_config(&config), Err(IdpConfigError::MissingIssuer));

		let mut config = complete_config();

		config.realm = Some(String::new());

		assert_eq!(IdpDescriptor::from_config(&config), Err(IdpConfigError::MissingRealm));

		let mut config = complete_config();

		config.client_id = None;

		assert_eq!(IdpDescriptor::from_config(&config), Err(IdpConfigError::MissingClientId));
	}

	#[test]
	fn relative_issuer_values_are_rejected() {
		let mut config = complete_config();

		config.issuer = Some("auth/realms".into());

		assert!(matches!(
			IdpDescriptor::from_config(&config),
			Err(IdpConfigError::InvalidIssuer { .. }),
		));
	}
}
