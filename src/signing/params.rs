//! Protocol parameters, normalization, and the signature base string.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, error::SigningError, signing::encode::percent_encode};

/// Protocol version advertised in `oauth_version`.
pub const OAUTH_VERSION: &str = "1.0A";

const NONCE_LEN: usize = 32;

/// Per-call OAuth protocol parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolParams<'a> {
	/// `oauth_consumer_key`.
	pub consumer_key: &'a str,
	/// `oauth_nonce`.
	pub nonce: &'a str,
	/// `oauth_signature_method`.
	pub signature_method: &'a str,
	/// `oauth_timestamp` in unix seconds.
	pub timestamp: i64,
	/// `oauth_token`, absent for the request-token leg.
	pub token: Option<&'a str>,
	/// `oauth_version`.
	pub version: &'a str,
}
impl ProtocolParams<'_> {
	/// Returns the parameters as owned key/value pairs.
	pub fn to_pairs(&self) -> Vec<(String, String)> {
		let mut pairs = vec![
			("oauth_consumer_key".to_owned(), self.consumer_key.to_owned()),
			("oauth_nonce".to_owned(), self.nonce.to_owned()),
			("oauth_signature_method".to_owned(), self.signature_method.to_owned()),
			("oauth_timestamp".to_owned(), self.timestamp.to_string()),
		];

		if let Some(token) = self.token {
			pairs.push(("oauth_token".to_owned(), token.to_owned()));
		}

		pairs.push(("oauth_version".to_owned(), self.version.to_owned()));

		pairs
	}
}

/// Generates a fresh alphanumeric nonce.
pub fn generate_nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

/// Current wall-clock time in unix seconds.
pub fn unix_timestamp() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

/// Encodes every pair and sorts by encoded key, then encoded value.
pub fn encode_and_sort<I>(params: I) -> Vec<(String, String)>
where
	I: IntoIterator<Item = (String, String)>,
{
	let mut encoded = params
		.into_iter()
		.map(|(key, value)| (percent_encode(&key), percent_encode(&value)))
		.collect::<Vec<_>>();

	encoded.sort();

	encoded
}

/// Builds the normalized parameter string (`k=v` joined by `&`).
pub fn normalize_parameters<I>(params: I) -> String
where
	I: IntoIterator<Item = (String, String)>,
{
	encode_and_sort(params)
		.into_iter()
		.map(|(key, value)| format!("{key}={value}"))
		.collect::<Vec<_>>()
		.join("&")
}

/// Base string URI: scheme and host lower-cased, default ports dropped, no query or fragment.
pub fn base_string_uri(url: &Url) -> Result<String, SigningError> {
	let host = url
		.host_str()
		.filter(|_| matches!(url.scheme(), "http" | "https"))
		.ok_or_else(|| SigningError::UnsupportedUrl { url: url.to_string() })?;
	let port = url.port().map(|port| format!(":{port}")).unwrap_or_default();

	Ok(format!(
		"{}://{}{port}{}",
		url.scheme().to_ascii_lowercase(),
		host.to_ascii_lowercase(),
		url.path()
	))
}

/// Builds `METHOD&encoded(base-uri)&encoded(normalized-parameters)`.
pub fn signature_base_string(method: &Method, base_uri: &str, normalized: &str) -> String {
	format!(
		"{}&{}&{}",
		method.as_str().to_ascii_uppercase(),
		percent_encode(base_uri),
		percent_encode(normalized)
	)
}
