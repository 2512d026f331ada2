//! OAuth 1.0a request signing.
//!
//! [`Signer`] owns the consumer credentials and prepared key material. Each call builds a
//! fresh parameter bag (protocol parameters, URL query parameters, and any form-encoded body
//! parameters), normalizes it into the signature base string, signs it, and renders the
//! `Authorization` header. JSON and binary bodies are passed as [`SignablePayload::Opaque`]
//! and never enter the parameter set.

pub mod encode;
pub mod key;
pub mod params;

pub use encode::{form_decode, form_encode, percent_encode};
pub use key::SignatureMethod;
pub use params::{OAUTH_VERSION, ProtocolParams};

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken},
	config::OAuth1Config,
	error::{ConfigError, SigningError},
	signing::key::SigningKey,
};

/// Body parameters that take part in signing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignablePayload<'a> {
	/// No body, or a JSON/binary body that is excluded from the signature.
	Opaque,
	/// Form-encoded parameters; `oauth_`-prefixed entries are echoed into the header.
	Form(&'a [(String, String)]),
}

/// Token pair used as the second half of the signing key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenCredentials<'a> {
	/// Public `oauth_token`.
	pub token: &'a str,
	/// Matching token secret.
	pub secret: &'a str,
}
impl<'a> From<&'a RequestToken> for TokenCredentials<'a> {
	fn from(value: &'a RequestToken) -> Self {
		Self { token: &value.token, secret: value.token_secret.expose() }
	}
}
impl<'a> From<&'a AccessToken> for TokenCredentials<'a> {
	fn from(value: &'a AccessToken) -> Self {
		Self { token: &value.token, secret: value.token_secret.expose() }
	}
}
impl Debug for TokenCredentials<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCredentials")
			.field("token", &self.token)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Inputs for a single signature.
#[derive(Clone, Copy, Debug)]
pub struct SigningRequest<'a> {
	/// HTTP method.
	pub method: &'a Method,
	/// Absolute request URL, query included.
	pub url: &'a Url,
	/// Token pair; `None` only for the request-token leg.
	pub token: Option<TokenCredentials<'a>>,
	/// Body parameters.
	pub payload: SignablePayload<'a>,
}
impl<'a> SigningRequest<'a> {
	/// Creates a request with an opaque payload.
	pub fn new(method: &'a Method, url: &'a Url, token: Option<TokenCredentials<'a>>) -> Self {
		Self { method, url, token, payload: SignablePayload::Opaque }
	}

	/// Attaches form parameters that take part in signing.
	pub fn with_form(mut self, form: &'a [(String, String)]) -> Self {
		self.payload = SignablePayload::Form(form);

		self
	}
}

/// Output of a signature computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// Full `Authorization` header value.
	pub authorization: String,
	/// Signature base string that was signed.
	pub base_string: String,
	/// Base64 signature before header encoding.
	pub signature: String,
}

/// Computes OAuth 1.0a signatures for one consumer.
#[derive(Clone, Debug)]
pub struct Signer {
	consumer_key: String,
	method: SignatureMethod,
	key: Arc<SigningKey>,
	version: String,
}
impl Signer {
	/// Prepares a signer; RSA-SHA1 expects the consumer secret to be a PEM private key.
	pub fn new(
		consumer_key: impl Into<String>,
		consumer_secret: &str,
		method: SignatureMethod,
	) -> Result<Self, ConfigError> {
		let consumer_key = consumer_key.into();

		if consumer_key.is_empty() {
			return Err(ConfigError::MissingField { field: "consumer_key" });
		}

		let key = SigningKey::from_method(method, consumer_secret)?;

		Ok(Self { consumer_key, method, key: Arc::new(key), version: OAUTH_VERSION.to_owned() })
	}

	/// Builds a signer from validated configuration.
	pub fn from_config(config: &OAuth1Config) -> Result<Self, ConfigError> {
		Self::new(
			config.consumer_key.clone(),
			config.consumer_secret.expose(),
			config.signature_method,
		)
	}

	/// Overrides the advertised `oauth_version`.
	pub fn with_version(mut self, version: impl Into<String>) -> Self {
		self.version = version.into();

		self
	}

	/// Returns the configured signature method.
	pub fn method(&self) -> SignatureMethod {
		self.method
	}

	/// Returns the consumer key.
	pub fn consumer_key(&self) -> &str {
		&self.consumer_key
	}

	/// Signs with a fresh nonce and the current timestamp.
	pub fn sign(&self, request: SigningRequest<'_>) -> Result<SignedRequest, SigningError> {
		self.sign_with(request, &params::generate_nonce(), params::unix_timestamp())
	}

	/// Signs with an explicit nonce and timestamp; deterministic for equal inputs.
	pub fn sign_with(
		&self,
		request: SigningRequest<'_>,
		nonce: &str,
		timestamp: i64,
	) -> Result<SignedRequest, SigningError> {
		if request.token.is_some_and(|t| t.token.is_empty()) {
			return Err(SigningError::EmptyToken { context: "signed request" });
		}

		let base_uri = params::base_string_uri(request.url)?;
		let protocol = ProtocolParams {
			consumer_key: &self.consumer_key,
			nonce,
			signature_method: self.method.as_str(),
			timestamp,
			token: request.token.map(|t| t.token),
			version: &self.version,
		}
		.to_pairs();
		let form = match request.payload {
			SignablePayload::Opaque => &[][..],
			SignablePayload::Form(form) => form,
		};
		let signed_params = protocol
			.iter()
			.cloned()
			.chain(request.url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())))
			.chain(form.iter().cloned());
		let normalized = params::normalize_parameters(signed_params);
		let base_string = params::signature_base_string(request.method, &base_uri, &normalized);
		let signature = self.key.sign(&base_string, request.token.map_or("", |t| t.secret))?;
		let header_params = params::encode_and_sort(
			protocol.into_iter().chain(form.iter().filter(|(k, _)| k.starts_with("oauth_")).cloned()),
		);
		let mut authorization = String::from("OAuth ");

		for (key, value) in header_params {
			authorization.push_str(&format!("{key}=\"{value}\","));
		}

		authorization.push_str(&format!("oauth_signature=\"{}\"", percent_encode(&signature)));

		Ok(SignedRequest { authorization, base_string, signature })
	}
}
