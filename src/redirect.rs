//! Redirect-URI resolution and authorization-response URL handling.

// self
use crate::{_prelude::*, idp::AuthorizationResponse};

const CODE_PARAM: &str = "code";
const STATE_PARAM: &str = "state";
// Extra parameters some IdPs append alongside the authorization response; they
// are stripped together with it so the cleaned URL carries no residue.
const NOISE_PARAMS: &[&str] = &["session_state", "iss"];

/// Resolves the redirect URI for login/logout delegation.
///
/// Absolute targets pass through untouched. Relative or absent targets are
/// joined onto the deployed base path and, when an origin is resolvable, onto
/// that origin. With no origin (non-browser execution) the result degrades to a
/// path-only URI instead of failing: resolving `"history"` yields `"/history"`.
pub fn resolve_redirect_uri(origin: Option<&Url>, base_path: &str, target: Option<&str>) -> String {
	if let Some(target) = target
		&& Url::parse(target).is_ok()
	{
		return target.to_owned();
	}

	let path = join_base_path(base_path, target.unwrap_or_default());

	match origin {
		Some(origin) => format!("{}{path}", origin_prefix(origin)),
		None => path,
	}
}

/// Builds the URI of the well-known same-origin silent-callback asset.
pub fn silent_callback_uri(origin: Option<&Url>, base_path: &str, asset: &str) -> String {
	let path = join_base_path(base_path, asset);

	match origin {
		Some(origin) => format!("{}{path}", origin_prefix(origin)),
		None => path,
	}
}

/// Extracts a pending authorization response from the URL, if the well-known
/// parameter pair is present.
pub fn extract_auth_response(url: &Url) -> Option<AuthorizationResponse> {
	let mut code = None;
	let mut state = None;
	let mut session_state = None;

	for (key, value) in url.query_pairs() {
		match key.as_ref() {
			CODE_PARAM => code = Some(value.into_owned()),
			STATE_PARAM => state = Some(value.into_owned()),
			"session_state" => session_state = Some(value.into_owned()),
			_ => {},
		}
	}

	Some(AuthorizationResponse { code: code?, state: state?, session_state })
}

/// Returns the URL with all authorization-response parameters removed,
/// preserving every unrelated query parameter.
pub fn strip_auth_response(url: &Url) -> Url {
	let retained: Vec<(String, String)> = url
		.query_pairs()
		.filter(|(key, _)| {
			let key = key.as_ref();

			key != CODE_PARAM && key != STATE_PARAM && !NOISE_PARAMS.contains(&key)
		})
		.map(|(key, value)| (key.into_owned(), value.into_owned()))
		.collect();
	let mut cleaned = url.clone();

	cleaned.set_query(None);

	if !retained.is_empty() {
		let mut pairs = cleaned.query_pairs_mut();

		for (key, value) in &retained {
			pairs.append_pair(key, value);
		}

		drop(pairs);
	}

	cleaned
}

fn join_base_path(base_path: &str, tail: &str) -> String {
	let base = base_path.trim_matches('/');
	let tail = tail.trim_start_matches('/');
	let mut path = String::from("/");

	if !base.is_empty() {
		path.push_str(base);
	}
	if !tail.is_empty() {
		if path.len() > 1 {
			path.push('/');
		}

		path.push_str(tail);
	}

	path
}

fn origin_prefix(origin: &Url) -> String {
	let mut prefix = origin.to_string();

	while prefix.ends_with('/') {
		prefix.pop();
	}

	prefix
}
