//! Shared helpers for the token endpoints (form POSTs, response parsing, rejections).

// crates.io
use http::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::{AccessTokenUpdate, RequestToken, TokenSecret},
	client::OAuth1Client,
	error::DecodeError,
	http::{HttpTransport, InboundResponse, OutboundRequest},
	signing::{self, SigningRequest, TokenCredentials},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parsed `application/x-www-form-urlencoded` token endpoint response.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenResponse {
	/// `oauth_token`.
	pub token: String,
	/// `oauth_token_secret`.
	pub token_secret: TokenSecret,
	/// `oauth_session_handle`, when the provider issues one.
	pub session_handle: Option<TokenSecret>,
	/// `oauth_expires_in` in seconds.
	pub expires_in: Option<i64>,
	/// `oauth_authorization_expires_in` in seconds.
	pub authorization_expires_in: Option<i64>,
}
impl TokenResponse {
	/// Parses a token endpoint body; `oauth_token` and `oauth_token_secret` are mandatory.
	pub fn parse(body: &str) -> Result<Self, DecodeError> {
		let mut fields = signing::form_decode(body);
		let token = fields
			.remove("oauth_token")
			.filter(|t| !t.is_empty())
			.ok_or(DecodeError::MissingField { field: "oauth_token" })?;
		let token_secret = fields
			.remove("oauth_token_secret")
			.ok_or(DecodeError::MissingField { field: "oauth_token_secret" })?;
		let seconds = |raw: Option<String>| raw.and_then(|value| value.trim().parse::<i64>().ok());

		Ok(Self {
			token,
			token_secret: token_secret.into(),
			session_handle: fields
				.remove("oauth_session_handle")
				.filter(|h| !h.is_empty())
				.map(TokenSecret::from),
			expires_in: seconds(fields.remove("oauth_expires_in")),
			authorization_expires_in: seconds(fields.remove("oauth_authorization_expires_in")),
		})
	}

	/// Converts relative lifetimes into absolute instants measured from `issued_at`.
	pub fn into_update(self, issued_at: OffsetDateTime) -> AccessTokenUpdate {
		AccessTokenUpdate {
			token: Some(self.token),
			token_secret: Some(self.token_secret),
			session_handle: self.session_handle,
			expires_at: self
				.expires_in
				.and_then(|secs| issued_at.checked_add(Duration::seconds(secs))),
			authorization_expires_at: self
				.authorization_expires_in
				.and_then(|secs| issued_at.checked_add(Duration::seconds(secs))),
		}
	}
}
impl From<TokenResponse> for RequestToken {
	fn from(value: TokenResponse) -> Self {
		RequestToken::new(value.token, value.token_secret)
	}
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("token", &self.token)
			.field("token_secret", &"<redacted>")
			.field("session_handle", &self.session_handle.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.field("authorization_expires_in", &self.authorization_expires_in)
			.finish()
	}
}

/// Drains a non-2xx response into [`Error::UpstreamRejected`].
pub(crate) async fn upstream_rejected(response: InboundResponse) -> Error {
	let status = response.status.as_u16();
	let headers = response.headers.clone();

	match response.collect().await {
		Ok(body) => Error::UpstreamRejected {
			status,
			body: String::from_utf8_lossy(&body).into_owned(),
			headers,
		},
		Err(e) => e.into(),
	}
}

/// Reads a 2xx body as UTF-8 text.
pub(crate) async fn read_text(response: InboundResponse) -> Result<String> {
	let body = response.collect().await?;

	String::from_utf8(body.to_vec())
		.map_err(|e| DecodeError::Body { message: e.to_string() }.into())
}

impl<T> OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Signs and POSTs `form` to a token endpoint, returning the parsed response.
	pub(crate) async fn post_token_form(
		&self,
		url: Url,
		token: Option<TokenCredentials<'_>>,
		form: Vec<(String, String)>,
	) -> Result<TokenResponse> {
		let mut headers = self
			.signed_headers(SigningRequest::new(&Method::POST, &url, token).with_form(&form), None)?;

		headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

		let request = OutboundRequest::new(Method::POST, url, headers)
			.with_body(signing::form_encode(&form));
		let response = self.transport.dispatch(request).await?;

		if !response.is_success() {
			return Err(upstream_rejected(response).await);
		}

		Ok(TokenResponse::parse(&read_text(response).await?)?)
	}
}
