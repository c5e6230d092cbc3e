//! Memoizing config gateway with a pluggable HTTP transport.

// self
use crate::{_prelude::*, config::ServerConfig};

/// Boxed future returned by [`ConfigTransport::fetch`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ConfigResponse, TransportFailure>> + 'a + Send>>;

/// Raw HTTP response handed back by a transport; the gateway judges the status.
#[derive(Clone, Debug)]
pub struct ConfigResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}

/// Transport-level failure where no HTTP response was produced at all.
#[derive(Clone, Debug, ThisError)]
#[error("Config transport failed: {reason}.")]
pub struct TransportFailure {
	/// Transport-specific reason string.
	pub reason: String,
}
impl TransportFailure {
	/// Wraps a transport-specific failure.
	pub fn new(reason: impl Into<String>) -> Self {
		Self { reason: reason.into() }
	}
}

/// Abstraction over HTTP stacks capable of fetching the config document.
///
/// The trait is the gateway's only dependency on an HTTP client. The default
/// `reqwest` feature ships [`ReqwestConfigTransport`]; tests substitute a
/// canned in-process transport.
pub trait ConfigTransport
where
	Self: 'static + Send + Sync,
{
	/// Issues one GET against the config endpoint.
	fn fetch(&self, endpoint: &Url) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestConfigTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestConfigTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl ConfigTransport for ReqwestConfigTransport {
	fn fetch(&self, endpoint: &Url) -> TransportFuture<'_> {
		let request = self.0.get(endpoint.clone());

		Box::pin(async move {
			let response =
				request.send().await.map_err(|e| TransportFailure::new(e.to_string()))?;
			let status = response.status().as_u16();
			let body = response
				.bytes()
				.await
				.map_err(|e| TransportFailure::new(e.to_string()))?
				.to_vec();

			Ok(ConfigResponse { status, body })
		})
	}
}

/// Fetches and memoizes the server configuration.
///
/// The memo is a shared success-only cache: concurrent callers collapse onto a
/// single in-flight request via an async guard, a failed fetch leaves the memo
/// empty so the next call retries, and a resolved config is immutable until
/// [`ConfigGateway::reset`].
pub struct ConfigGateway {
	endpoint: Url,
	transport: Arc<dyn ConfigTransport>,
	memo: RwLock<Option<Arc<ServerConfig>>>,
	inflight: AsyncMutex<()>,
}
impl ConfigGateway {
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_transport(endpoint: Url, transport: Arc<dyn ConfigTransport>) -> Self {
		Self { endpoint, transport, memo: RwLock::new(None), inflight: AsyncMutex::new(()) }
	}

	/// Creates a gateway with the crate's default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn new(endpoint: Url) -> Self {
		Self::with_transport(endpoint, Arc::new(ReqwestConfigTransport::default()))
	}

	/// Returns the memoized configuration, fetching it on first use.
	///
	/// Callers arriving while a fetch is in flight await the same request
	/// instead of issuing their own.
	pub async fn config(&self) -> Result<Arc<ServerConfig>> {
		if let Some(config) = self.cached() {
			return Ok(config);
		}

		let _singleflight = self.inflight.lock().await;

		// A concurrent caller may have filled the memo while this one waited.
		if let Some(config) = self.cached() {
			return Ok(config);
		}

		let config = Arc::new(self.fetch_fresh().await?);

		*self.memo.write() = Some(config.clone());

		Ok(config)
	}

	/// Returns the memoized configuration without ever touching the network.
	pub fn cached(&self) -> Option<Arc<ServerConfig>> {
		self.memo.read().clone()
	}

	/// Clears the memo so the next [`ConfigGateway::config`] call re-fetches.
	pub fn reset(&self) {
		*self.memo.write() = None;
	}

	async fn fetch_fresh(&self) -> Result<ServerConfig> {
		let response = self.transport.fetch(&self.endpoint).await.map_err(|e| {
			tracing::warn!(endpoint = %self.endpoint, error = %e, "Config fetch produced no response.");

			Error::config_transport_failure()
		})?;

		if !(200..300).contains(&response.status) {
			return Err(Error::ConfigUnavailable {
				status: response.status,
				body: Some(String::from_utf8_lossy(&response.body).into_owned()),
			});
		}

		ServerConfig::from_slice(&response.body)
	}
}
impl Debug for ConfigGateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigGateway")
			.field("endpoint", &self.endpoint.as_str())
			.field("resolved", &self.cached().is_some())
			.finish()
	}
}
