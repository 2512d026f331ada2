//! Three-legged handshake: request token, authorize URL, verifier exchange.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, RequestToken},
	client::OAuth1Client,
	error::SigningError,
	http::HttpTransport,
	obs::{self, FlowKind},
	signing::TokenCredentials,
	store::StoreError,
};

impl<T> OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Obtains temporary credentials from the request-token endpoint.
	///
	/// The call is signed with the consumer credentials only and carries `oauth_callback` when
	/// one is configured.
	pub async fn get_request_token(&self) -> Result<RequestToken> {
		obs::observe(FlowKind::RequestToken, "get_request_token", async move {
			let url = self.config.request_token_url()?;
			let form = self
				.config
				.callback_url
				.iter()
				.map(|callback| ("oauth_callback".to_owned(), callback.clone()))
				.collect();
			let response = self.post_token_form(url, None, form).await?;

			Ok(RequestToken::from(response))
		})
		.await
	}

	/// Builds the page URL the user visits to authorize `request_token`.
	pub fn build_authorise_url(&self, request_token: &RequestToken) -> Result<String> {
		if request_token.token.is_empty() {
			return Err(SigningError::EmptyToken { context: "authorize URL" }.into());
		}

		Ok(self.config.authorize_url(&request_token.token))
	}

	/// Exchanges an authorized request token and its verifier for an access token.
	///
	/// The result replaces whatever the credential store held; lifetimes are measured from the
	/// moment the exchange was sent.
	pub async fn swap_request_token_for_access_token(
		&self,
		request_token: &RequestToken,
		verifier: &str,
	) -> Result<AccessToken> {
		obs::observe(FlowKind::AccessToken, "swap_request_token_for_access_token", async move {
			if request_token.token.is_empty() {
				return Err(SigningError::EmptyToken { context: "access token exchange" }.into());
			}

			let url = self.config.access_token_url()?;
			let form = vec![("oauth_verifier".to_owned(), verifier.to_owned())];
			let issued_at = OffsetDateTime::now_utc();
			let response = self
				.post_token_form(url, Some(TokenCredentials::from(request_token)), form)
				.await?;
			let token = response.into_update(issued_at).apply(None).map_err(StoreError::from)?;
			// Serialized with refreshes so an in-flight merge cannot land on the new token.
			let _writer = self.refresh_guard.lock().await;

			self.store.replace(token.clone()).await?;

			Ok(token)
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration as StdDuration,
	};
	// self
	use super::*;
	use crate::{
		config::OAuth1Config,
		http::{InboundResponse, OutboundRequest, TransportFuture},
	};

	#[derive(Default)]
	struct Counting(AtomicUsize);
	impl HttpTransport for Counting {
		fn dispatch(&self, _: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
			self.0.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { Ok(InboundResponse::from_bytes(StatusCode::OK, HeaderMap::new(), "")) })
		}
	}

	struct Issuing;
	impl HttpTransport for Issuing {
		fn dispatch(&self, _: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
			Box::pin(async {
				Ok(InboundResponse::from_bytes(
					StatusCode::OK,
					HeaderMap::new(),
					"oauth_token=AT-new&oauth_token_secret=secret-new",
				))
			})
		}
	}

	fn client() -> OAuth1Client<Counting> {
		let config = OAuth1Config::builder("key", "secret", "https://api.example.com/")
			.build()
			.expect("Fixture configuration should be valid.");

		OAuth1Client::with_transport(config, Counting::default()).expect("Client should build.")
	}

	#[test]
	fn authorise_url_embeds_token_verbatim() {
		let url = client()
			.build_authorise_url(&RequestToken::new("RT-123_abc", "secret"))
			.expect("Non-empty tokens should build a URL.");

		assert_eq!(url, "https://api.example.com/oauth/Authorize?oauth_token=RT-123_abc");
	}

	#[test]
	fn authorise_url_rejects_empty_token() {
		let err = client()
			.build_authorise_url(&RequestToken::new("", "secret"))
			.expect_err("Empty tokens are a precondition violation.");

		assert!(matches!(err, Error::Signing(SigningError::EmptyToken { .. })));
	}

	#[tokio::test]
	async fn swap_with_empty_request_token_never_dispatches() {
		let client = client();
		let err = client
			.swap_request_token_for_access_token(&RequestToken::new("", "s"), "verifier")
			.await
			.expect_err("Empty request tokens cannot be exchanged.");

		assert!(matches!(err, Error::Signing(SigningError::EmptyToken { .. })));
		assert_eq!(client.transport.0.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn swap_waits_for_an_in_flight_refresh() {
		let config = OAuth1Config::builder("key", "secret", "https://api.example.com")
			.build()
			.expect("Fixture configuration should be valid.");
		let client = OAuth1Client::with_transport(config, Issuing)
			.expect("Client should build.")
			.with_access_token(AccessToken::new("AT-old", "secret-old"));
		let refreshing = client.refresh_guard.lock().await;
		let swapping = client.clone();
		let swap = tokio::spawn(async move {
			swapping
				.swap_request_token_for_access_token(&RequestToken::new("RT-1", "s"), "verifier")
				.await
		});

		tokio::time::sleep(StdDuration::from_millis(50)).await;

		let held = client
			.credentials()
			.await
			.expect("Fetch should succeed.")
			.expect("The seeded token should still be stored.");

		assert_eq!(held.token, "AT-old");

		drop(refreshing);

		let swapped = swap
			.await
			.expect("Swap task should not panic.")
			.expect("Swap should succeed once the guard is released.");
		let stored = client
			.credentials()
			.await
			.expect("Fetch should succeed.")
			.expect("The exchanged token should be stored.");

		assert_eq!(swapped.token, "AT-new");
		assert_eq!(stored, swapped);
	}
}
