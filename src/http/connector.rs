//! reqwest-backed connection factory with optional forward-proxy support.

// std
use std::time::Duration as StdDuration;
// crates.io
use futures_util::TryStreamExt;
use reqwest::{NoProxy, Proxy, redirect::Policy};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError},
	http::{HttpTransport, InboundResponse, OutboundRequest, TransportFuture},
};

/// Forward proxy the connector routes every request through.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAgent {
	/// Proxy URL (`http://`, `https://`, or `socks5://` where supported).
	pub url: String,
	/// Optional proxy credentials.
	#[serde(default)]
	pub basic_auth: Option<(String, TokenSecret)>,
	/// Comma-separated hosts that bypass the proxy.
	#[serde(default)]
	pub no_proxy: Option<String>,
}
impl ProxyAgent {
	/// Creates an agent for `url`.
	pub fn new(url: impl Into<String>) -> Self {
		Self { url: url.into(), basic_auth: None, no_proxy: None }
	}

	/// Attaches proxy credentials.
	pub fn with_basic_auth(
		mut self,
		username: impl Into<String>,
		password: impl Into<TokenSecret>,
	) -> Self {
		self.basic_auth = Some((username.into(), password.into()));

		self
	}

	/// Sets the bypass list.
	pub fn with_no_proxy(mut self, hosts: impl Into<String>) -> Self {
		self.no_proxy = Some(hosts.into());

		self
	}

	fn to_reqwest(&self) -> Result<Proxy, ConfigError> {
		let mut proxy = Proxy::all(&self.url).map_err(|e| ConfigError::InvalidProxy {
			url: self.url.clone(),
			source: Box::new(e),
		})?;

		if let Some((username, password)) = &self.basic_auth {
			proxy = proxy.basic_auth(username, password.expose());
		}
		if let Some(hosts) = &self.no_proxy {
			proxy = proxy.no_proxy(NoProxy::from_string(hosts));
		}

		Ok(proxy)
	}
}
impl Debug for ProxyAgent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProxyAgent")
			.field("url", &self.url)
			.field("basic_auth", &self.basic_auth.as_ref().map(|(user, _)| (user, "<redacted>")))
			.field("no_proxy", &self.no_proxy)
			.finish()
	}
}

/// [`HttpTransport`] over a shared reqwest client; redirects are never followed.
#[derive(Clone, Debug)]
pub struct ReqwestConnector {
	client: ReqwestClient,
	proxy: Option<ProxyAgent>,
}
impl ReqwestConnector {
	/// Starts a connector builder.
	pub fn builder() -> ReqwestConnectorBuilder {
		ReqwestConnectorBuilder::default()
	}

	/// Wraps an existing client; configure it with `redirect::Policy::none()`.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, proxy: None }
	}

	/// Proxy agent configured at construction, if any.
	pub fn proxy(&self) -> Option<&ProxyAgent> {
		self.proxy.as_ref()
	}
}
impl HttpTransport for ReqwestConnector {
	fn dispatch(&self, request: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
		Box::pin(async move {
			#[cfg(feature = "tracing")]
			if let Some(target) = request.target() {
				tracing::debug!(
					method = %request.method,
					host = %target.host,
					port = target.port,
					tls = target.tls,
					proxied = self.proxy.is_some(),
					"dispatching signed request"
				);
			}

			let OutboundRequest { method, url, headers, body } = request;
			let mut builder = self.client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(map_reqwest_error)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes_stream().map_err(map_reqwest_error);

			Ok(InboundResponse::new(status, headers, Box::pin(body)))
		})
	}
}

/// Builder for [`ReqwestConnector`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestConnectorBuilder {
	proxy: Option<ProxyAgent>,
	timeout: Option<StdDuration>,
	connect_timeout: Option<StdDuration>,
	accept_invalid_certs: bool,
}
impl ReqwestConnectorBuilder {
	/// Routes every request through `agent`.
	pub fn proxy(mut self, agent: ProxyAgent) -> Self {
		self.proxy = Some(agent);

		self
	}

	/// Sets the total per-request deadline.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Sets the connect-phase deadline.
	pub fn connect_timeout(mut self, timeout: StdDuration) -> Self {
		self.connect_timeout = Some(timeout);

		self
	}

	/// Disables certificate and hostname validation; only for local test servers.
	pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
		self.accept_invalid_certs = accept;

		self
	}

	/// Builds the connector.
	pub fn build(self) -> Result<ReqwestConnector, ConfigError> {
		let mut builder = ReqwestClient::builder()
			.redirect(Policy::none())
			.danger_accept_invalid_certs(self.accept_invalid_certs)
			.danger_accept_invalid_hostnames(self.accept_invalid_certs);

		if let Some(agent) = &self.proxy {
			builder = builder.proxy(agent.to_reqwest()?);
		}
		if let Some(timeout) = self.timeout {
			builder = builder.timeout(timeout);
		}
		if let Some(timeout) = self.connect_timeout {
			builder = builder.connect_timeout(timeout);
		}

		let client = builder.build().map_err(ConfigError::http_client_build)?;

		Ok(ReqwestConnector { client, proxy: self.proxy })
	}
}

fn map_reqwest_error(err: ReqwestError) -> TransportError {
	if err.is_timeout() { TransportError::timeout(err) } else { TransportError::network(err) }
}
