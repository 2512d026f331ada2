//! OAuth 1.0a handshake legs as an object-safe capability.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken},
	client::OAuth1Client,
	ext::CapabilityFuture,
	http::HttpTransport,
};

/// Three-legged handshake plus session-handle refresh.
pub trait TokenHandshake
where
	Self: Send + Sync,
{
	/// Obtains temporary credentials.
	fn get_request_token(&self) -> CapabilityFuture<'_, RequestToken>;

	/// Builds the authorization page URL for `request_token`.
	fn build_authorise_url(&self, request_token: &RequestToken) -> Result<String>;

	/// Exchanges an authorized request token and verifier for an access token.
	fn exchange_token<'a>(
		&'a self,
		request_token: &'a RequestToken,
		verifier: &'a str,
	) -> CapabilityFuture<'a, AccessToken>;

	/// Rotates the stored access token with its session handle.
	fn refresh_token(&self) -> CapabilityFuture<'_, AccessToken>;
}
impl<T> TokenHandshake for OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn get_request_token(&self) -> CapabilityFuture<'_, RequestToken> {
		Box::pin(OAuth1Client::get_request_token(self))
	}

	fn build_authorise_url(&self, request_token: &RequestToken) -> Result<String> {
		OAuth1Client::build_authorise_url(self, request_token)
	}

	fn exchange_token<'a>(
		&'a self,
		request_token: &'a RequestToken,
		verifier: &'a str,
	) -> CapabilityFuture<'a, AccessToken> {
		Box::pin(self.swap_request_token_for_access_token(request_token, verifier))
	}

	fn refresh_token(&self) -> CapabilityFuture<'_, AccessToken> {
		Box::pin(self.refresh_access_token())
	}
}
