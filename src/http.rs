//! Connection seam between the signed client and the network.
//!
//! [`HttpTransport`] is the only dependency the client and the handshake have on an HTTP
//! stack. The bundled [`ReqwestConnector`] (feature `reqwest`) honours an optional forward
//! proxy; tests plug in fakes that record [`OutboundRequest`]s and replay canned
//! [`InboundResponse`]s.

#[cfg(feature = "reqwest")] pub mod connector;
#[cfg(feature = "reqwest")] pub use connector::*;

// crates.io
use bytes::BytesMut;
use futures_util::{Stream, StreamExt, stream};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport`] implementations.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Response body delivered chunk by chunk.
pub type ResponseBody = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Dispatches fully prepared (already signed) requests.
///
/// Implementations must not follow redirects: a redirected request would carry a signature
/// computed for a different URL.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the status line and headers arrive.
	fn dispatch(&self, request: OutboundRequest) -> TransportFuture<'_, InboundResponse>;
}

/// Socket-level destination derived from a request URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
	/// Host name or address.
	pub host: String,
	/// Port, defaulted from the scheme.
	pub port: u16,
	/// Path plus query.
	pub path: String,
	/// Whether the connection uses TLS.
	pub tls: bool,
}
impl ConnectionTarget {
	/// Derives the target from an absolute http(s) URL.
	pub fn from_url(url: &Url) -> Option<Self> {
		let tls = match url.scheme() {
			"https" => true,
			"http" => false,
			_ => return None,
		};
		let host = url.host_str()?.to_owned();
		let port = url.port_or_known_default()?;
		let path = match url.query() {
			Some(query) => format!("{}?{query}", url.path()),
			None => url.path().to_owned(),
		};

		Some(Self { host, port, path, tls })
	}
}

/// Signed request handed to a transport.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL.
	pub url: Url,
	/// Final header set, `Authorization` included.
	pub headers: HeaderMap,
	/// Fully buffered body.
	pub body: Option<Bytes>,
}
impl OutboundRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, url: Url, headers: HeaderMap) -> Self {
		Self { method, url, headers, body: None }
	}

	/// Attaches a body.
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Socket-level destination of this request.
	pub fn target(&self) -> Option<ConnectionTarget> {
		ConnectionTarget::from_url(&self.url)
	}
}

/// Response status, headers, and streamed body.
pub struct InboundResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Body chunks in arrival order.
	pub body: ResponseBody,
}
impl InboundResponse {
	/// Wraps an already-open body stream.
	pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
		Self { status, headers, body }
	}

	/// Builds a response whose body is delivered as the given chunks.
	pub fn from_chunks<I>(status: StatusCode, headers: HeaderMap, chunks: I) -> Self
	where
		I: IntoIterator<Item = Bytes>,
		I::IntoIter: 'static + Send,
	{
		Self::new(status, headers, Box::pin(stream::iter(chunks.into_iter().map(Ok))))
	}

	/// Builds a response with a single-chunk body.
	pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
		Self::from_chunks(status, headers, [body.into()])
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Drains the body into one buffer.
	pub async fn collect(mut self) -> Result<Bytes, TransportError> {
		let mut buf = BytesMut::new();

		while let Some(chunk) = self.body.next().await {
			buf.extend_from_slice(&chunk?);
		}

		Ok(buf.freeze())
	}
}
impl Debug for InboundResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("InboundResponse")
			.field("status", &self.status)
			.field("headers", &self.headers)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn connection_target_defaults_ports_from_scheme() {
		let https = Url::parse("https://api.example.com/api.xro/2.0/Invoices?page=1")
			.expect("Fixture URL should parse.");
		let target = ConnectionTarget::from_url(&https).expect("HTTPS URLs have a target.");

		assert_eq!(
			target,
			ConnectionTarget {
				host: "api.example.com".into(),
				port: 443,
				path: "/api.xro/2.0/Invoices?page=1".into(),
				tls: true,
			}
		);

		let http = Url::parse("http://127.0.0.1:8080/oauth/RequestToken")
			.expect("Fixture URL should parse.");
		let target = ConnectionTarget::from_url(&http).expect("HTTP URLs have a target.");

		assert_eq!((target.port, target.tls), (8080, false));

		let other = Url::parse("ftp://example.com/file").expect("Fixture URL should parse.");

		assert!(ConnectionTarget::from_url(&other).is_none());
	}

	#[tokio::test]
	async fn collect_concatenates_chunks_in_order() {
		let response = InboundResponse::from_chunks(
			StatusCode::OK,
			HeaderMap::new(),
			vec![Bytes::from_static(b"ab"), Bytes::new(), Bytes::from_static(b"cd")],
		);

		assert!(response.is_success());
		assert_eq!(response.collect().await.expect("Chunks should collect."), "abcd");
	}
}
