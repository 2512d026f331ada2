//! Binary transfers that bypass JSON parsing on the request or response side.

// crates.io
use futures_util::StreamExt;
use http::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
// self
use crate::{
	_prelude::*,
	client::{OAuth1Client, verbs},
	error::{ConfigError, TransportError},
	http::HttpTransport,
	obs::{self, FlowKind},
};

impl<T> OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Streams a signed `GET` of `endpoint` into `sink` and returns the bytes written.
	///
	/// `mime` becomes the `Accept` header. Each chunk is written before the next one is
	/// polled, so a slow sink slows the download instead of queueing chunks. The sink is
	/// flushed and shut down on every exit path, including rejections and mid-stream
	/// failures; the first error is the one returned.
	pub async fn download_to<W>(&self, endpoint: &str, mime: &str, sink: &mut W) -> Result<u64>
	where
		W: ?Sized + AsyncWrite + Unpin + Send,
	{
		obs::observe(FlowKind::Download, "download_to", async move {
			let transferred = self.pipe_download(endpoint, mime, &mut *sink).await;
			let finalized = finalize(sink).await;
			let written = transferred?;

			finalized?;

			Ok(written)
		})
		.await
	}

	/// Buffers `source` and POSTs it to `endpoint` as `mime`, parsing the JSON reply.
	///
	/// The body never takes part in the signature. `Content-Length` is the buffered length.
	pub async fn upload_from<Rd, R>(&self, endpoint: &str, mime: &str, source: &mut Rd) -> Result<R>
	where
		Rd: ?Sized + AsyncRead + Unpin + Send,
		R: DeserializeOwned,
	{
		obs::observe(FlowKind::Upload, "upload_from", async move {
			let url = self.config.api_url(endpoint)?;
			let mut headers = HeaderMap::new();

			headers.insert(CONTENT_TYPE, mime_header("content-type", mime)?);

			let mut buf = Vec::new();

			source.read_to_end(&mut buf).await.map_err(TransportError::from)?;
			headers.insert(CONTENT_LENGTH, HeaderValue::from(buf.len()));

			let response = self.dispatch_signed(Method::POST, url, headers, Some(buf.into())).await?;
			let status = response.status;
			let bytes = response.collect().await?;

			Ok(verbs::decode_json(status, &bytes)?)
		})
		.await
	}

	async fn pipe_download<W>(&self, endpoint: &str, mime: &str, sink: &mut W) -> Result<u64>
	where
		W: ?Sized + AsyncWrite + Unpin + Send,
	{
		let url = self.config.api_url(endpoint)?;
		let mut headers = HeaderMap::new();

		headers.insert(ACCEPT, mime_header("accept", mime)?);

		let mut response = self.dispatch_signed(Method::GET, url, headers, None).await?;
		let mut written = 0_u64;

		while let Some(chunk) = response.body.next().await {
			let chunk = chunk?;

			sink.write_all(&chunk).await.map_err(TransportError::from)?;

			written += chunk.len() as u64;
		}

		Ok(written)
	}
}

fn mime_header(name: &'static str, mime: &str) -> Result<HeaderValue, ConfigError> {
	HeaderValue::from_str(mime).map_err(|source| ConfigError::InvalidHeaderValue { name, source })
}

async fn finalize<W>(sink: &mut W) -> Result<(), TransportError>
where
	W: ?Sized + AsyncWrite + Unpin,
{
	sink.flush().await?;
	sink.shutdown().await?;

	Ok(())
}
