// self
use oidc_session::{
	_preludet::*,
	error::{Error, IdpConfigError},
	session::{SessionOptions, SessionState},
};

fn app_url(value: &str) -> Url {
	Url::parse(value).expect("App URL fixture should parse.")
}

#[tokio::test]
async fn bootstrap_reports_sso_disabled_without_building_an_adapter() {
	let harness = build_harness(SSO_DISABLED_DOCUMENT);
	let bootstrap = harness
		.orchestrator
		.initialize_auth(Some(&app_url("https://app.example.com/deploys")))
		.await
		.expect("Bootstrap should succeed with SSO disabled.");

	assert!(!bootstrap.sso_enabled);
	assert_eq!(bootstrap.cleaned_url, None);
	assert_eq!(harness.factory.connects(), 0);
	assert_eq!(harness.orchestrator.state(), SessionState::Disabled);
}

#[tokio::test]
async fn bootstrap_without_pending_response_only_validates() {
	let harness = build_harness(SSO_ENABLED_DOCUMENT);
	let bootstrap = harness
		.orchestrator
		.initialize_auth(Some(&app_url("https://app.example.com/deploys?filter=active")))
		.await
		.expect("Bootstrap should succeed with complete IdP fields.");

	assert!(bootstrap.sso_enabled);
	assert_eq!(bootstrap.cleaned_url, None);
	assert_eq!(harness.factory.connects(), 1);
	assert!(harness.client.init_requests().is_empty());
}

#[tokio::test]
async fn incomplete_idp_fields_fail_fast() {
	let harness = build_harness(SSO_INCOMPLETE_DOCUMENT);
	let err = harness
		.orchestrator
		.initialize_auth(None)
		.await
		.expect_err("Missing IdP fields should be fatal.");

	assert!(matches!(err, Error::IdpConfig(IdpConfigError::MissingRealm)));
	assert_eq!(harness.factory.connects(), 0);
}

#[tokio::test]
async fn client_construction_failure_surfaces_as_idp_error() {
	let harness = build_harness(SSO_ENABLED_DOCUMENT);

	harness.factory.set_fail(true);

	let err = harness
		.orchestrator
		.initialize_auth(None)
		.await
		.expect_err("Factory failure should surface.");

	assert!(matches!(err, Error::Idp(_)));
	assert_eq!(harness.factory.connects(), 1);
}

#[tokio::test]
async fn pending_callback_is_processed_and_stripped() {
	let harness = build_harness(SSO_ENABLED_DOCUMENT);
	let pending = app_url(
		"https://app.example.com/deploys?filter=active&code=one-time&state=opaque&session_state=s-1",
	);
	let bootstrap = harness
		.orchestrator
		.initialize_auth(Some(&pending))
		.await
		.expect("Callback processing should succeed.");

	assert!(bootstrap.sso_enabled);
	assert_eq!(
		bootstrap.cleaned_url.as_ref().map(Url::as_str),
		Some("https://app.example.com/deploys?filter=active"),
	);
	assert!(harness.orchestrator.state().is_authenticated());
	assert!(harness.orchestrator.token_store.has_access_token());
	assert!(harness.orchestrator.refresh_armed().await);

	let requests = harness.client.init_requests();

	assert_eq!(requests.len(), 1);

	let response = requests[0]
		.authorization_response
		.as_ref()
		.expect("Callback init must carry the authorization response.");

	assert_eq!(response.code, "one-time");
	assert_eq!(response.state, "opaque");
	assert_eq!(response.session_state.as_deref(), Some("s-1"));
}

#[tokio::test]
async fn failed_callback_still_cleans_the_url() {
	let harness = build_harness(SSO_ENABLED_DOCUMENT);

	harness.client.set_callback(MockInitBehavior::Fail);

	let pending = app_url("https://app.example.com/?code=bad&state=opaque");
	let err = harness
		.orchestrator
		.initialize_auth(Some(&pending))
		.await
		.expect_err("A failed exchange should surface AuthCallbackFailed.");

	let Error::AuthCallbackFailed { cleaned_url, source } = err else {
		panic!("Expected AuthCallbackFailed, got {err:?}.");
	};

	assert_eq!(
		cleaned_url.as_ref().map(Url::as_str),
		Some("https://app.example.com/"),
		"Parameters must be stripped even on failure to prevent retry loops.",
	);
	assert!(source.is_some());
	assert!(!harness.orchestrator.token_store.has_access_token());
	assert!(harness.orchestrator.groups_snapshot().is_none());
}

#[tokio::test]
async fn unauthenticated_callback_outcome_is_a_failure_too() {
	let harness = build_harness(SSO_ENABLED_DOCUMENT);

	harness.client.set_callback(MockInitBehavior::NoSession);

	let pending = app_url("https://app.example.com/?code=expired&state=opaque");
	let err = harness
		.orchestrator
		.initialize_auth(Some(&pending))
		.await
		.expect_err("An unauthenticated exchange should surface AuthCallbackFailed.");

	assert!(matches!(err, Error::AuthCallbackFailed { source: None, .. }));
}

#[tokio::test]
async fn end_to_end_interactive_session_with_deployed_base_path() {
	let options = SessionOptions {
		base_path: "/admin".into(),
		origin: Some(app_url("https://app.example.com")),
		..SessionOptions::default()
	};
	let harness = build_harness_with(SSO_ENABLED_DOCUMENT, options);
	let orchestrator = &harness.orchestrator;
	let bootstrap =
		orchestrator.initialize_auth(None).await.expect("Bootstrap should succeed.");

	assert!(bootstrap.sso_enabled);

	orchestrator.login(Some("history")).await.expect("Interactive login should succeed.");

	assert_eq!(
		harness.client.login_redirects()[0].redirect_uri,
		"https://app.example.com/admin/history",
	);

	orchestrator.check_auth().await.expect("The guard should resolve after login.");

	assert!(orchestrator.token_store.has_access_token());
	assert!(orchestrator.refresh_armed().await);

	let permissions = orchestrator.get_permissions().await.expect("Permissions should resolve.");

	assert_eq!(permissions.groups, vec!["operators".to_owned()]);
	assert_eq!(permissions.privileged_groups, vec!["admins".to_owned()]);
	assert!(!permissions.is_privileged());

	let identity = orchestrator.get_identity().await.expect("Identity should resolve.");

	assert_eq!(identity.id, "user-1");
	assert_eq!(identity.full_name.as_deref(), Some("User One"));
	assert_eq!(identity.email.as_deref(), Some("user.one@example.com"));
}
