//! Immutable OAuth 1.0a client configuration.
//!
//! Build values through [`OAuth1Config::builder`], which applies defaults and validates the
//! result. Deserialized values should be checked with [`OAuth1Config::validate`]; client
//! constructors do this before use.

pub mod builder;

pub use builder::*;

// crates.io
use http::header::{ACCEPT, USER_AGENT};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	signing::{SignatureMethod, key, percent_encode},
};

/// Default request-token endpoint path.
pub const DEFAULT_REQUEST_TOKEN_PATH: &str = "/oauth/RequestToken";
/// Default access-token endpoint path.
pub const DEFAULT_ACCESS_TOKEN_PATH: &str = "/oauth/AccessToken";
/// Path of the user authorization page.
pub const AUTHORIZE_PATH: &str = "/oauth/Authorize";
/// Default `Accept` header value.
pub const DEFAULT_ACCEPT: &str = "application/json";

/// Consumer credentials, endpoints, and default headers for one application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Config {
	/// `oauth_consumer_key`.
	pub consumer_key: String,
	/// Consumer secret; the PEM private key for RSA-SHA1 applications.
	pub consumer_secret: TokenSecret,
	/// Optional tenant type appended to the request-token URL.
	#[serde(default)]
	pub tenant_type: Option<String>,
	/// API origin; a trailing `/` is ignored.
	pub api_base_url: String,
	/// Prefix inserted between the origin and every API endpoint.
	#[serde(default)]
	pub api_base_path: String,
	/// Request-token endpoint path.
	pub request_token_path: String,
	/// Access-token endpoint path, also used for refresh.
	pub access_token_path: String,
	/// Signature method.
	#[serde(default)]
	pub signature_method: SignatureMethod,
	/// Default `Accept` header.
	pub accept: String,
	/// Default `User-Agent` header.
	pub user_agent: String,
	/// `oauth_callback` sent with the request-token call.
	#[serde(default)]
	pub callback_url: Option<String>,
}
impl OAuth1Config {
	/// Starts a builder with the mandatory fields.
	pub fn builder(
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<TokenSecret>,
		api_base_url: impl Into<String>,
	) -> OAuth1ConfigBuilder {
		OAuth1ConfigBuilder::new(consumer_key, consumer_secret, api_base_url)
	}

	/// Checks every invariant the builder enforces.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.consumer_key.is_empty() {
			return Err(ConfigError::MissingField { field: "consumer_key" });
		}

		let base = Url::parse(&self.api_base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
			return Err(ConfigError::UnsupportedBaseUrl { url: self.api_base_url.clone() });
		}

		validate_path("api_base", &self.api_base_path)?;
		validate_path("request_token", &self.request_token_path)?;
		validate_path("access_token", &self.access_token_path)?;
		self.default_headers()?;

		if self.signature_method == SignatureMethod::RsaSha1 {
			key::parse_private_key(self.consumer_secret.expose())?;
		}

		Ok(())
	}

	/// Request-token URL, with `tenantType` appended when configured.
	pub fn request_token_url(&self) -> Result<Url, ConfigError> {
		let mut url = self.join(&self.request_token_path)?;

		if let Some(tenant_type) = self.tenant_type.as_deref().filter(|t| !t.is_empty()) {
			url.query_pairs_mut().append_pair("tenantType", tenant_type);
		}

		Ok(url)
	}

	/// Access-token URL, shared by the exchange and refresh calls.
	pub fn access_token_url(&self) -> Result<Url, ConfigError> {
		self.join(&self.access_token_path)
	}

	/// Authorize page URL for `token`, without validation of the token itself.
	pub fn authorize_url(&self, token: &str) -> String {
		format!("{}{AUTHORIZE_PATH}?oauth_token={}", self.origin(), percent_encode(token))
	}

	/// Absolute API URL: `{api_base_url}{api_base_path}{endpoint}`.
	pub fn api_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		let raw =
			format!("{}{}{endpoint}", self.origin(), self.api_base_path.trim_end_matches('/'));

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: raw, source })
	}

	/// Default `Accept` and `User-Agent` headers, merged under per-call headers.
	pub fn default_headers(&self) -> Result<HeaderMap, ConfigError> {
		let mut headers = HeaderMap::new();

		headers.insert(ACCEPT, header_value("accept", &self.accept)?);
		headers.insert(USER_AGENT, header_value("user_agent", &self.user_agent)?);

		Ok(headers)
	}

	// Deserialized values skip the builder's trimming.
	fn origin(&self) -> &str {
		self.api_base_url.trim_end_matches('/')
	}

	fn join(&self, path: &str) -> Result<Url, ConfigError> {
		let raw = format!("{}{path}", self.origin());

		Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: raw, source })
	}
}

fn validate_path(name: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.is_empty() || value.starts_with('/') {
		Ok(())
	} else {
		Err(ConfigError::InvalidPath { name, value: value.to_owned() })
	}
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
	HeaderValue::from_str(value).map_err(|source| ConfigError::InvalidHeaderValue { name, source })
}
