#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oidc_session::{
	_preludet::*,
	config::{ConfigGateway, ServerConfig},
};

const CONFIG_PATH: &str = "/api/config";
const ENABLED_BODY: &str = r#"{
	"keycloak": {
		"enabled": true,
		"url": "https://idp.example.com/auth",
		"realm": "deploys",
		"client_id": "dashboard",
		"privileged_groups": ["admins"]
	}
}"#;

fn gateway_for(server: &MockServer) -> ConfigGateway {
	let endpoint = Url::parse(&server.url(CONFIG_PATH))
		.expect("Mock config endpoint should parse successfully.");

	ConfigGateway::new(endpoint)
}

#[tokio::test]
async fn concurrent_callers_share_one_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(CONFIG_PATH);
			then.status(200).header("content-type", "application/json").body(ENABLED_BODY);
		})
		.await;
	let gateway = gateway_for(&server);
	let (first, second, third) =
		tokio::join!(gateway.config(), gateway.config(), gateway.config());
	let first = first.expect("First concurrent config call should succeed.");

	assert!(first.sso_enabled);
	assert_eq!(
		second.expect("Second concurrent config call should succeed.").as_ref(),
		first.as_ref(),
	);
	assert_eq!(
		third.expect("Third concurrent config call should succeed.").as_ref(),
		first.as_ref(),
	);

	mock.assert_calls_async(1).await;

	// The memo keeps serving without further requests.
	let _ = gateway.config().await.expect("Memoized config call should succeed.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn non_success_status_clears_the_memo_for_retry() {
	let server = MockServer::start_async().await;
	let mut failing = server
		.mock_async(|when, then| {
			when.method(GET).path(CONFIG_PATH);
			then.status(503).body("upstream unavailable");
		})
		.await;
	let gateway = gateway_for(&server);
	let err = gateway.config().await.expect_err("A 503 response should fail the config fetch.");

	let oidc_session::error::Error::ConfigUnavailable { status, body } = err else {
		panic!("Expected ConfigUnavailable, got {err:?}.");
	};

	assert_eq!(status, 503);
	assert_eq!(body.as_deref(), Some("upstream unavailable"));
	assert!(gateway.cached().is_none(), "A failed fetch must not populate the memo.");

	failing.delete_async().await;

	let recovered = server
		.mock_async(|when, then| {
			when.method(GET).path(CONFIG_PATH);
			then.status(200).header("content-type", "application/json").body(ENABLED_BODY);
		})
		.await;
	let config = gateway.config().await.expect("Retry after recovery should succeed.");

	assert!(config.sso_enabled);
	assert_eq!(config.privileged_groups, vec!["admins".to_owned()]);

	recovered.assert_async().await;
}

#[tokio::test]
async fn transport_failures_surface_status_zero() {
	// Nothing listens on this port; the request dies at the transport layer.
	let endpoint = Url::parse("http://127.0.0.1:9/config")
		.expect("Unreachable endpoint fixture should parse.");
	let gateway = ConfigGateway::new(endpoint);
	let err = gateway.config().await.expect_err("Unreachable endpoints should fail.");

	assert!(matches!(
		err,
		oidc_session::error::Error::ConfigUnavailable { status: 0, body: None },
	));
	assert!(gateway.cached().is_none());
}

#[tokio::test]
async fn malformed_documents_fail_decoding() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path(CONFIG_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"keycloak":{"enabled":"definitely"}}"#);
		})
		.await;
	let gateway = gateway_for(&server);
	let err = gateway.config().await.expect_err("Malformed documents should fail decoding.");

	assert!(matches!(err, oidc_session::error::Error::ConfigMalformed { .. }));
}

#[tokio::test]
async fn reset_forces_a_refetch() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(CONFIG_PATH);
			then.status(200).header("content-type", "application/json").body(ENABLED_BODY);
		})
		.await;
	let gateway = gateway_for(&server);
	let first = gateway.config().await.expect("Initial config fetch should succeed.");

	gateway.reset();

	assert!(gateway.cached().is_none());

	let second = gateway.config().await.expect("Post-reset config fetch should succeed.");

	assert_eq!(first.as_ref(), second.as_ref());

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn canned_transport_matches_the_wire_shape() {
	// The in-process transport used across the orchestrator tests must agree
	// with what the HTTP path produces for the same document.
	let transport = StaticConfigTransport::with_document(ENABLED_BODY);
	let gateway = ConfigGateway::with_transport(config_endpoint(), transport.clone());
	let via_transport = gateway.config().await.expect("Canned fetch should succeed.");
	let direct = ServerConfig::from_slice(ENABLED_BODY.as_bytes())
		.expect("Document should decode directly.");

	assert_eq!(via_transport.as_ref(), &direct);
	assert_eq!(transport.fetches(), 1);
}
