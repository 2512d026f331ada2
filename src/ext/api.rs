//! Signed JSON verbs and streamed transfers.

// crates.io
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};
// self
use crate::{_prelude::*, client::OAuth1Client, ext::CapabilityFuture, http::HttpTransport};

/// Signed calls against the remote API, keyed by endpoint paths relative to the base path.
pub trait ApiTransport
where
	Self: Send + Sync,
{
	/// Signed `GET`.
	fn get<'a, R>(
		&'a self,
		endpoint: &'a str,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		R: 'a + DeserializeOwned + Send;

	/// Signed `PUT` with a JSON body.
	fn put<'a, B, R>(
		&'a self,
		endpoint: &'a str,
		body: &'a B,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		B: ?Sized + Serialize + Sync,
		R: 'a + DeserializeOwned + Send;

	/// Signed `POST` with a JSON body.
	fn post<'a, B, R>(
		&'a self,
		endpoint: &'a str,
		body: &'a B,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		B: ?Sized + Serialize + Sync,
		R: 'a + DeserializeOwned + Send;

	/// Signed `PATCH` with a JSON body.
	fn patch<'a, B, R>(
		&'a self,
		endpoint: &'a str,
		body: &'a B,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		B: ?Sized + Serialize + Sync,
		R: 'a + DeserializeOwned + Send;

	/// Signed `DELETE`.
	fn delete<'a, R>(
		&'a self,
		endpoint: &'a str,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		R: 'a + DeserializeOwned + Send;

	/// Streams a binary response of type `mime` into `sink`, returning the bytes written.
	fn stream_download<'a, W>(
		&'a self,
		endpoint: &'a str,
		mime: &'a str,
		sink: &'a mut W,
	) -> CapabilityFuture<'a, u64>
	where
		W: ?Sized + AsyncWrite + Unpin + Send;

	/// Uploads everything `source` yields as `mime` and parses the JSON reply.
	fn stream_upload<'a, Rd, R>(
		&'a self,
		endpoint: &'a str,
		mime: &'a str,
		source: &'a mut Rd,
	) -> CapabilityFuture<'a, R>
	where
		Rd: ?Sized + AsyncRead + Unpin + Send,
		R: 'a + DeserializeOwned + Send;
}
impl<T> ApiTransport for OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn get<'a, R>(
		&'a self,
		endpoint: &'a str,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		R: 'a + DeserializeOwned + Send,
	{
		Box::pin(OAuth1Client::get(self, endpoint, headers))
	}

	fn put<'a, B, R>(
		&'a self,
		endpoint: &'a str,
		body: &'a B,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		B: ?Sized + Serialize + Sync,
		R: 'a + DeserializeOwned + Send,
	{
		Box::pin(OAuth1Client::put(self, endpoint, body, headers))
	}

	fn post<'a, B, R>(
		&'a self,
		endpoint: &'a str,
		body: &'a B,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		B: ?Sized + Serialize + Sync,
		R: 'a + DeserializeOwned + Send,
	{
		Box::pin(OAuth1Client::post(self, endpoint, body, headers))
	}

	fn patch<'a, B, R>(
		&'a self,
		endpoint: &'a str,
		body: &'a B,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		B: ?Sized + Serialize + Sync,
		R: 'a + DeserializeOwned + Send,
	{
		Box::pin(OAuth1Client::patch(self, endpoint, body, headers))
	}

	fn delete<'a, R>(
		&'a self,
		endpoint: &'a str,
		headers: Option<&'a HeaderMap>,
	) -> CapabilityFuture<'a, R>
	where
		R: 'a + DeserializeOwned + Send,
	{
		Box::pin(OAuth1Client::delete(self, endpoint, headers))
	}

	fn stream_download<'a, W>(
		&'a self,
		endpoint: &'a str,
		mime: &'a str,
		sink: &'a mut W,
	) -> CapabilityFuture<'a, u64>
	where
		W: ?Sized + AsyncWrite + Unpin + Send,
	{
		Box::pin(self.download_to(endpoint, mime, sink))
	}

	fn stream_upload<'a, Rd, R>(
		&'a self,
		endpoint: &'a str,
		mime: &'a str,
		source: &'a mut Rd,
	) -> CapabilityFuture<'a, R>
	where
		Rd: ?Sized + AsyncRead + Unpin + Send,
		R: 'a + DeserializeOwned + Send,
	{
		Box::pin(self.upload_from(endpoint, mime, source))
	}
}
