//! Validating builder for [`OAuth1Config`](crate::config::OAuth1Config).

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::{DEFAULT_ACCEPT, DEFAULT_ACCESS_TOKEN_PATH, DEFAULT_REQUEST_TOKEN_PATH, OAuth1Config},
	error::ConfigError,
	signing::SignatureMethod,
};

/// Builder for [`OAuth1Config`] values.
#[derive(Debug)]
pub struct OAuth1ConfigBuilder {
	/// Consumer key.
	pub consumer_key: String,
	/// Consumer secret or PEM private key.
	pub consumer_secret: TokenSecret,
	/// API origin.
	pub api_base_url: String,
	/// API path prefix.
	pub api_base_path: String,
	/// Request-token endpoint path.
	pub request_token_path: String,
	/// Access-token endpoint path.
	pub access_token_path: String,
	/// Optional tenant type.
	pub tenant_type: Option<String>,
	/// Signature method.
	pub signature_method: SignatureMethod,
	/// `Accept` header.
	pub accept: String,
	/// `User-Agent` header.
	pub user_agent: String,
	/// Optional `oauth_callback`.
	pub callback_url: Option<String>,
}
impl OAuth1ConfigBuilder {
	/// Creates a builder seeded with defaults.
	pub fn new(
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<TokenSecret>,
		api_base_url: impl Into<String>,
	) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			api_base_url: api_base_url.into(),
			api_base_path: String::new(),
			request_token_path: DEFAULT_REQUEST_TOKEN_PATH.into(),
			access_token_path: DEFAULT_ACCESS_TOKEN_PATH.into(),
			tenant_type: None,
			signature_method: SignatureMethod::default(),
			accept: DEFAULT_ACCEPT.into(),
			user_agent: concat!("oauth1-transport/", env!("CARGO_PKG_VERSION")).into(),
			callback_url: None,
		}
	}

	/// Sets the API path prefix (e.g. `/api.xro/2.0`).
	pub fn api_base_path(mut self, path: impl Into<String>) -> Self {
		self.api_base_path = path.into();

		self
	}

	/// Overrides the request-token endpoint path.
	pub fn request_token_path(mut self, path: impl Into<String>) -> Self {
		self.request_token_path = path.into();

		self
	}

	/// Overrides the access-token endpoint path.
	pub fn access_token_path(mut self, path: impl Into<String>) -> Self {
		self.access_token_path = path.into();

		self
	}

	/// Sets the tenant type appended to the request-token URL.
	pub fn tenant_type(mut self, tenant_type: impl Into<String>) -> Self {
		self.tenant_type = Some(tenant_type.into());

		self
	}

	/// Selects the signature method.
	pub fn signature_method(mut self, method: SignatureMethod) -> Self {
		self.signature_method = method;

		self
	}

	/// Overrides the default `Accept` header.
	pub fn accept(mut self, accept: impl Into<String>) -> Self {
		self.accept = accept.into();

		self
	}

	/// Overrides the default `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = user_agent.into();

		self
	}

	/// Sets the `oauth_callback` URL.
	pub fn callback_url(mut self, url: impl Into<String>) -> Self {
		self.callback_url = Some(url.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<OAuth1Config, ConfigError> {
		let api_base_url = self.api_base_url.trim_end_matches('/').to_owned();
		let api_base_path = self.api_base_path.trim_end_matches('/').to_owned();
		let config = OAuth1Config {
			consumer_key: self.consumer_key,
			consumer_secret: self.consumer_secret,
			tenant_type: self.tenant_type,
			api_base_url,
			api_base_path,
			request_token_path: self.request_token_path,
			access_token_path: self.access_token_path,
			signature_method: self.signature_method,
			accept: self.accept,
			user_agent: self.user_agent,
			callback_url: self.callback_url,
		};

		config.validate()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn builder_applies_defaults() {
		let config = OAuth1Config::builder("key", "secret", "https://api.example.com")
			.build()
			.expect("Defaults should validate.");

		assert_eq!(config.request_token_path, "/oauth/RequestToken");
		assert_eq!(config.access_token_path, "/oauth/AccessToken");
		assert_eq!(config.signature_method, SignatureMethod::HmacSha1);
		assert_eq!(config.accept, "application/json");
		assert!(config.tenant_type.is_none());
		assert!(config.callback_url.is_none());
	}

	#[test]
	fn builder_rejects_invalid_inputs() {
		assert!(matches!(
			OAuth1Config::builder("", "secret", "https://api.example.com").build(),
			Err(ConfigError::MissingField { field: "consumer_key" })
		));
		assert!(matches!(
			OAuth1Config::builder("key", "secret", "not a url").build(),
			Err(ConfigError::InvalidBaseUrl { .. })
		));
		assert!(matches!(
			OAuth1Config::builder("key", "secret", "ftp://api.example.com").build(),
			Err(ConfigError::UnsupportedBaseUrl { .. })
		));
		assert!(matches!(
			OAuth1Config::builder("key", "secret", "https://api.example.com")
				.api_base_path("api.xro")
				.build(),
			Err(ConfigError::InvalidPath { name: "api_base", .. })
		));
		assert!(matches!(
			OAuth1Config::builder("key", "secret", "https://api.example.com")
				.user_agent("bad\nagent")
				.build(),
			Err(ConfigError::InvalidHeaderValue { name: "user_agent", .. })
		));
		assert!(matches!(
			OAuth1Config::builder("key", "not-a-pem", "https://api.example.com")
				.signature_method(SignatureMethod::RsaSha1)
				.build(),
			Err(ConfigError::InvalidPrivateKey { .. })
		));
	}
}
