//! JSON verbs plus the signed dispatch shared with the streamed transfers.

// crates.io
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::OAuth1Client,
	error::DecodeError,
	flows::common,
	http::{HttpTransport, InboundResponse, OutboundRequest},
	obs::{self, FlowKind},
	signing::{SigningRequest, TokenCredentials},
};

const JSON_CONTENT_TYPE: &str = "application/json";

impl<T> OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Signed `GET` of `endpoint`, parsing the JSON response into `R`.
	///
	/// An empty 2xx body deserializes from JSON `null`, so `Option<_>`, `()`, and
	/// `serde_json::Value` callers accept bodiless responses.
	pub async fn get<R>(&self, endpoint: &str, headers: Option<&HeaderMap>) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.json_call(Method::GET, "get", endpoint, None, headers).await
	}

	/// Signed `PUT` with a JSON body.
	pub async fn put<B, R>(&self, endpoint: &str, body: &B, headers: Option<&HeaderMap>) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = encode_json(body)?;

		self.json_call(Method::PUT, "put", endpoint, Some(body), headers).await
	}

	/// Signed `POST` with a JSON body.
	pub async fn post<B, R>(&self, endpoint: &str, body: &B, headers: Option<&HeaderMap>) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = encode_json(body)?;

		self.json_call(Method::POST, "post", endpoint, Some(body), headers).await
	}

	/// Signed `PATCH` with a JSON body.
	pub async fn patch<B, R>(
		&self,
		endpoint: &str,
		body: &B,
		headers: Option<&HeaderMap>,
	) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let body = encode_json(body)?;

		self.json_call(Method::PATCH, "patch", endpoint, Some(body), headers).await
	}

	/// Signed `DELETE` of `endpoint`.
	pub async fn delete<R>(&self, endpoint: &str, headers: Option<&HeaderMap>) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.json_call(Method::DELETE, "delete", endpoint, None, headers).await
	}

	/// Runs a JSON call with an already serialized body.
	pub(crate) async fn json_call<R>(
		&self,
		method: Method,
		stage: &'static str,
		endpoint: &str,
		body: Option<Bytes>,
		custom: Option<&HeaderMap>,
	) -> Result<R>
	where
		R: DeserializeOwned,
	{
		obs::observe(FlowKind::Api, stage, async move {
			let url = self.config.api_url(endpoint)?;
			let mut headers = custom.cloned().unwrap_or_default();

			if body.is_some() {
				headers.entry(CONTENT_TYPE).or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));
			}

			let response = self.dispatch_signed(method, url, headers, body).await?;
			let status = response.status;
			let bytes = response.collect().await?;

			Ok(decode_json(status, &bytes)?)
		})
		.await
	}

	/// Signs and sends one call, refreshing and replaying it once after a 401.
	///
	/// `headers` are merged over the client defaults. Only 2xx responses are returned; any
	/// other status becomes [`Error::UpstreamRejected`].
	pub(crate) async fn dispatch_signed(
		&self,
		method: Method,
		url: Url,
		headers: HeaderMap,
		body: Option<Bytes>,
	) -> Result<InboundResponse> {
		let token = self.ensure_fresh_access_token().await?;
		let response = self.sign_and_send(&token, &method, &url, &headers, body.clone()).await?;

		if response.status != StatusCode::UNAUTHORIZED || !self.can_replay(&token) {
			return ensure_success(response).await;
		}

		#[cfg(feature = "tracing")]
		tracing::debug!(%method, %url, "Signed call was rejected with 401, refreshing once.");

		drop(response);

		let token = self.refresh_observed(&token).await?;
		let response = self.sign_and_send(&token, &method, &url, &headers, body).await?;

		ensure_success(response).await
	}

	fn can_replay(&self, token: &AccessToken) -> bool {
		self.auto_refresh && token.can_refresh_at(OffsetDateTime::now_utc())
	}

	async fn sign_and_send(
		&self,
		token: &AccessToken,
		method: &Method,
		url: &Url,
		headers: &HeaderMap,
		body: Option<Bytes>,
	) -> Result<InboundResponse> {
		let signed = self.signed_headers(
			SigningRequest::new(method, url, Some(TokenCredentials::from(token))),
			Some(headers),
		)?;
		let mut request = OutboundRequest::new(method.clone(), url.clone(), signed);

		request.body = body;

		Ok(self.transport.dispatch(request).await?)
	}
}

/// Parses a 2xx body, treating an empty one as JSON `null`.
pub(crate) fn decode_json<R>(status: StatusCode, body: &[u8]) -> Result<R, DecodeError>
where
	R: DeserializeOwned,
{
	let body = if body.iter().all(u8::is_ascii_whitespace) { b"null".as_slice() } else { body };
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| DecodeError::Json { source, status: status.as_u16() })
}

fn encode_json<B>(body: &B) -> Result<Bytes>
where
	B: ?Sized + Serialize,
{
	serde_json::to_vec(body).map(Bytes::from).map_err(Error::Encode)
}

async fn ensure_success(response: InboundResponse) -> Result<InboundResponse> {
	if response.is_success() { Ok(response) } else { Err(common::upstream_rejected(response).await) }
}
