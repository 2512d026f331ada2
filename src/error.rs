//! Transport-level error types shared across the handshake, signer, and API calls.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Signing could not proceed with the supplied inputs.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Transport failure (DNS, TCP, TLS, timeouts, stream I/O).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be interpreted.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Request body could not be serialized as JSON.
	#[error("Request body could not be serialized as JSON.")]
	Encode(#[source] serde_json::Error),

	/// A signed call was attempted before any access token was available.
	#[error(
		"Missing access token. Complete the OAuth 1.0a handshake or seed the credential store."
	)]
	MissingAccessToken,
	/// The stored access token carries no session handle, so it cannot be refreshed.
	#[error("Stored access token has no session handle to refresh with.")]
	MissingSessionHandle,
	/// Remote service answered with a non-2xx status.
	#[error("Upstream rejected the request with HTTP {status}.")]
	UpstreamRejected {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
		/// Response headers.
		headers: HeaderMap,
	},
}
impl Error {
	/// Returns the HTTP status associated with the failure, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UpstreamRejected { status, .. } => Some(*status),
			Self::Decode(DecodeError::Json { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the upstream rejected the call as unauthorized (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::UpstreamRejected { status: 401, .. })
	}
}

/// Configuration and validation failures raised while building clients.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A mandatory configuration field is empty.
	#[error("Configuration field `{field}` must not be empty.")]
	MissingField {
		/// Field name.
		field: &'static str,
	},
	/// API base URL cannot be parsed.
	#[error("API base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// API base URL parsed but is unusable (scheme or host).
	#[error("API base URL `{url}` must be an absolute http(s) URL with a host.")]
	UnsupportedBaseUrl {
		/// Offending URL.
		url: String,
	},
	/// An endpoint could not be joined onto the base URL.
	#[error("Endpoint URL `{endpoint}` is invalid.")]
	InvalidEndpoint {
		/// Joined URL that failed to parse.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured path does not start with `/`.
	#[error("Configured {name} path `{value}` must be empty or start with `/`.")]
	InvalidPath {
		/// Which path failed validation.
		name: &'static str,
		/// Offending value.
		value: String,
	},
	/// A default header value contains characters HTTP does not allow.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeaderValue {
		/// Header name.
		name: &'static str,
		/// Underlying validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// RSA-SHA1 was selected but the consumer secret is not a PEM RSA private key.
	#[error("Consumer secret is not a valid PEM-encoded RSA private key.")]
	InvalidPrivateKey {
		/// Underlying key parsing failure.
		#[source]
		source: BoxError,
	},
	/// Signature method label is not recognized.
	#[error("Signature method `{method}` is not supported.")]
	UnsupportedSignatureMethod {
		/// Offending label.
		method: String,
	},
	/// Proxy agent URL could not be used.
	#[error("Proxy agent `{url}` is invalid.")]
	InvalidProxy {
		/// Proxy URL.
		url: String,
		/// Underlying failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Signing preconditions that make producing a signature impossible.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// A token required for the operation was empty.
	#[error("The {context} requires a non-empty token.")]
	EmptyToken {
		/// Operation that required the token.
		context: &'static str,
	},
	/// The URL cannot be normalized into a signature base URI.
	#[error("URL `{url}` cannot be used as a signature base URI.")]
	UnsupportedUrl {
		/// Offending URL.
		url: String,
	},
	/// The rendered `Authorization` value is not a valid header value.
	#[error("Authorization header value is invalid.")]
	InvalidHeader {
		/// Underlying validation failure.
		#[source]
		source: http::header::InvalidHeaderValue,
	},
	/// HMAC key setup failed.
	#[error("HMAC-SHA1 key could not be initialized.")]
	Hmac,
	/// RSA signing failed.
	#[error("RSA-SHA1 signing failed.")]
	Rsa {
		/// Underlying signature failure.
		#[source]
		source: BoxError,
	},
}

/// Transport-level failures (network, timeouts, stream I/O).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the remote service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request did not complete before the configured deadline.
	#[error("Request to the remote service timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying I/O failure while moving a streamed body.
	#[error("I/O error occurred while streaming a request or response body.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}

/// Response bodies that could not be interpreted.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// JSON body did not match the requested type.
	#[error("Response body is not valid JSON for the requested type.")]
	Json {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// A token endpoint response omitted a mandatory field.
	#[error("Token endpoint response is missing `{field}`.")]
	MissingField {
		/// Missing form field.
		field: &'static str,
	},
	/// Response body could not be read as text.
	#[error("Response body could not be decoded: {message}.")]
	Body {
		/// Human-readable failure.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn upstream_rejection_exposes_status() {
		let err = Error::UpstreamRejected {
			status: 401,
			body: "oauth_problem=token_expired".into(),
			headers: HeaderMap::new(),
		};

		assert_eq!(err.status(), Some(401));
		assert!(err.is_unauthorized());
		assert_eq!(err.to_string(), "Upstream rejected the request with HTTP 401.");
		assert_eq!(Error::MissingAccessToken.status(), None);
	}

	#[test]
	fn transport_error_keeps_source() {
		let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed");
		let err: Error = TransportError::from(io).into();
		let source =
			std::error::Error::source(&err).expect("Transport errors should expose their source.");

		assert!(source.to_string().contains("sink closed"));
	}
}
