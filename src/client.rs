//! Signed transport client for resource wrappers.
//!
//! [`OAuth1Client`] owns the configuration, the signer, the credential store, and the
//! [`HttpTransport`]. The handshake legs live in [`crate::flows`]; the JSON verbs and the
//! streamed transfers live in the `verbs` and `stream` submodules.

mod stream;
mod verbs;

// crates.io
use http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenUpdate},
	config::OAuth1Config,
	error::SigningError,
	flows::RefreshMetrics,
	http::HttpTransport,
	signing::{Signer, SigningRequest},
	store::{CredentialStore, MemoryStore},
};
#[cfg(feature = "reqwest")] use crate::http::{ProxyAgent, ReqwestConnector};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest connector.
pub type ReqwestOAuth1Client = OAuth1Client<ReqwestConnector>;

/// OAuth 1.0a client that signs every call with the stored access token.
///
/// Clones share the transport, the credential store, the refresh guard, and the metrics, so
/// concurrent callers on different clones still coordinate a single refresh.
pub struct OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Shared refresh counters.
	pub refresh_metrics: Arc<RefreshMetrics>,
	pub(crate) config: Arc<OAuth1Config>,
	pub(crate) signer: Signer,
	pub(crate) store: Arc<dyn CredentialStore>,
	pub(crate) default_headers: Arc<HeaderMap>,
	pub(crate) refresh_guard: Arc<AsyncMutex<()>>,
	pub(crate) auto_refresh: bool,
	pub(crate) refresh_window: Duration,
}
impl<T> OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	const DEFAULT_REFRESH_WINDOW: Duration = Duration::seconds(30);

	/// Creates a client over a caller-provided transport with an empty in-memory store.
	pub fn with_transport(config: OAuth1Config, transport: impl Into<Arc<T>>) -> Result<Self> {
		config.validate()?;

		let signer = Signer::from_config(&config)?;
		let default_headers = config.default_headers()?;

		Ok(Self {
			transport: transport.into(),
			refresh_metrics: Default::default(),
			config: Arc::new(config),
			signer,
			store: Arc::new(MemoryStore::default()),
			default_headers: Arc::new(default_headers),
			refresh_guard: Default::default(),
			auto_refresh: true,
			refresh_window: Self::DEFAULT_REFRESH_WINDOW,
		})
	}

	/// Swaps the credential store, e.g. for a [`crate::store::FileStore`].
	pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = store;

		self
	}

	/// Seeds an in-memory store with a previously persisted access token.
	pub fn with_access_token(self, token: AccessToken) -> Self {
		self.with_store(Arc::new(MemoryStore::seeded(token)))
	}

	/// Enables or disables proactive and 401-driven refreshes (enabled by default).
	pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
		self.auto_refresh = enabled;

		self
	}

	/// Sets how close to expiry a token is refreshed proactively (30 seconds by default).
	pub fn with_refresh_window(mut self, window: Duration) -> Self {
		self.refresh_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Overrides the advertised `oauth_version` (defaults to `1.0A`).
	pub fn with_oauth_version(mut self, version: impl Into<String>) -> Self {
		self.signer = self.signer.with_version(version);

		self
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &OAuth1Config {
		&self.config
	}

	/// Signer used for every request.
	pub fn signer(&self) -> &Signer {
		&self.signer
	}

	/// Returns the stored access token, if any.
	pub async fn credentials(&self) -> Result<Option<AccessToken>> {
		Ok(self.store.fetch().await?)
	}

	/// Shallow-merges `update` into the stored access token.
	pub async fn set_credentials(&self, update: impl Into<AccessTokenUpdate>) -> Result<AccessToken> {
		Ok(self.store.merge(update.into()).await?)
	}

	/// Forgets the stored access token.
	pub async fn clear_credentials(&self) -> Result<Option<AccessToken>> {
		Ok(self.store.clear().await?)
	}

	/// Fetches the stored token or fails with [`Error::MissingAccessToken`].
	pub(crate) async fn require_access_token(&self) -> Result<AccessToken> {
		self.store.fetch().await?.ok_or(Error::MissingAccessToken)
	}

	/// Signs `request` and returns the merged headers carrying `Authorization`.
	pub(crate) fn signed_headers(
		&self,
		request: SigningRequest<'_>,
		custom: Option<&HeaderMap>,
	) -> Result<HeaderMap> {
		let signed = self.signer.sign(request)?;
		let authorization = HeaderValue::from_str(&signed.authorization)
			.map_err(|source| SigningError::InvalidHeader { source })?;
		let mut headers = self.merged_headers(custom);

		headers.insert(AUTHORIZATION, authorization);

		Ok(headers)
	}

	/// Clones the defaults and overlays per-call headers.
	pub(crate) fn merged_headers(&self, custom: Option<&HeaderMap>) -> HeaderMap {
		let mut headers = HeaderMap::clone(&self.default_headers);

		if let Some(custom) = custom {
			for (name, value) in custom {
				headers.insert(name, value.clone());
			}
		}

		headers
	}
}
#[cfg(feature = "reqwest")]
impl OAuth1Client<ReqwestConnector> {
	/// Creates a client backed by a default reqwest connector.
	pub fn new(config: OAuth1Config) -> Result<Self> {
		let connector = ReqwestConnector::builder().build()?;

		Self::with_transport(config, connector)
	}

	/// Creates a client whose connections go through `agent`.
	pub fn with_proxy(config: OAuth1Config, agent: ProxyAgent) -> Result<Self> {
		let connector = ReqwestConnector::builder().proxy(agent).build()?;

		Self::with_transport(config, connector)
	}
}
impl<T> Clone for OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			config: self.config.clone(),
			signer: self.signer.clone(),
			store: self.store.clone(),
			default_headers: self.default_headers.clone(),
			refresh_guard: self.refresh_guard.clone(),
			auto_refresh: self.auto_refresh,
			refresh_window: self.refresh_window,
		}
	}
}
impl<T> Debug for OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth1Client")
			.field("consumer_key", &self.config.consumer_key)
			.field("api_base_url", &self.config.api_base_url)
			.field("signature_method", &self.signer.method())
			.field("auto_refresh", &self.auto_refresh)
			.field("refresh_window", &self.refresh_window)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::http::{InboundResponse, OutboundRequest, TransportFuture};

	struct NeverCalled(AtomicUsize);
	impl HttpTransport for NeverCalled {
		fn dispatch(&self, _: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
			self.0.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { Ok(InboundResponse::from_bytes(StatusCode::OK, HeaderMap::new(), "")) })
		}
	}

	fn client() -> OAuth1Client<NeverCalled> {
		let config = OAuth1Config::builder("key", "secret", "https://api.example.com")
			.build()
			.expect("Fixture configuration should be valid.");

		OAuth1Client::with_transport(config, NeverCalled(AtomicUsize::new(0)))
			.expect("Client should build.")
	}

	#[test]
	fn merged_headers_overlay_custom_values() {
		let client = client();
		let mut custom = HeaderMap::new();

		custom.insert(http::header::ACCEPT, HeaderValue::from_static("application/pdf"));
		custom.insert("if-modified-since", HeaderValue::from_static("Mon, 01 Jan 2024 00:00:00 GMT"));

		let merged = client.merged_headers(Some(&custom));

		assert_eq!(merged.get(http::header::ACCEPT), custom.get(http::header::ACCEPT));
		assert!(merged.contains_key("if-modified-since"));
		assert!(merged.contains_key(http::header::USER_AGENT));
		assert_eq!(
			client.default_headers.get(http::header::ACCEPT).and_then(|v| v.to_str().ok()),
			Some("application/json")
		);
	}

	#[tokio::test]
	async fn credential_lifecycle_goes_through_store() {
		let client = client();

		assert!(client.credentials().await.expect("Fetch should succeed.").is_none());
		assert!(matches!(client.require_access_token().await, Err(Error::MissingAccessToken)));

		client
			.set_credentials(AccessToken::new("a", "s").with_session_handle("h"))
			.await
			.expect("Seeding a full token should succeed.");

		let clone = client.clone();
		let merged = clone
			.set_credentials(AccessTokenUpdate::token_pair("b", "t"))
			.await
			.expect("Clones share the same store.");

		assert_eq!(merged.session_handle.as_ref().map(|h| h.expose()), Some("h"));
		assert!(client.clear_credentials().await.expect("Clear should succeed.").is_some());
		assert_eq!(client.transport.0.load(Ordering::SeqCst), 0);
	}
}
