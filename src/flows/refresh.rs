//! Session-handle refresh with a singleflight guard and metrics.
//!
//! Every refresh path (explicit, proactive near expiry, and the replay after a 401) funnels
//! through one async mutex. A caller that waited on the guard re-reads the store and reuses
//! the rotated token when another caller already refreshed the one it observed, so
//! concurrent callers trigger exactly one network refresh.

mod metrics;

pub use metrics::{RefreshCounts, RefreshMetrics};

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::OAuth1Client,
	flows::refresh::metrics::RefreshOutcome,
	http::HttpTransport,
	obs::{self, FlowKind},
	signing::TokenCredentials,
};

impl<T> OAuth1Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Rotates the stored access token using its session handle.
	///
	/// The call is signed with the current access token pair. Fails with
	/// [`Error::MissingAccessToken`] before any network call when the store is empty, and with
	/// [`Error::MissingSessionHandle`] when the token cannot be refreshed. A response that
	/// omits `oauth_session_handle` keeps the previous handle.
	pub async fn refresh_access_token(&self) -> Result<AccessToken> {
		let observed = self.require_access_token().await?;

		self.refresh_observed(&observed).await
	}

	/// Returns the stored access token, refreshing it first when it expires within the
	/// refresh window and a usable session handle exists.
	pub async fn ensure_fresh_access_token(&self) -> Result<AccessToken> {
		let current = self.require_access_token().await?;
		let now = OffsetDateTime::now_utc();

		if self.auto_refresh
			&& current.expires_within(now, self.refresh_window)
			&& current.can_refresh_at(now)
		{
			return self.refresh_observed(&current).await;
		}

		Ok(current)
	}

	/// Refreshes unless the store already moved past `observed`.
	pub(crate) async fn refresh_observed(&self, observed: &AccessToken) -> Result<AccessToken> {
		obs::observe(FlowKind::Refresh, "refresh_access_token", async move {
			self.refresh_metrics.record_attempt();

			match self.refresh_guarded(observed).await {
				Ok((token, outcome)) => {
					self.refresh_metrics.record(outcome);

					Ok(token)
				},
				Err(e) => {
					self.refresh_metrics.record(RefreshOutcome::Failed);

					Err(e)
				},
			}
		})
		.await
	}

	async fn refresh_guarded(
		&self,
		observed: &AccessToken,
	) -> Result<(AccessToken, RefreshOutcome)> {
		let _singleflight = self.refresh_guard.lock().await;
		let current = self.require_access_token().await?;

		if !current.same_token(observed) {
			return Ok((current, RefreshOutcome::Coalesced));
		}

		let handle = current.session_handle.clone().ok_or(Error::MissingSessionHandle)?;
		let url = self.config.access_token_url()?;
		let form = vec![("oauth_session_handle".to_owned(), handle.expose().to_owned())];
		let issued_at = OffsetDateTime::now_utc();
		let response =
			self.post_token_form(url, Some(TokenCredentials::from(&current)), form).await?;

		let rotated = self.store.merge(response.into_update(issued_at)).await?;

		Ok((rotated, RefreshOutcome::Rotated))
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		config::OAuth1Config,
		http::{InboundResponse, OutboundRequest, TransportFuture},
	};

	#[derive(Default)]
	struct Refresher(AtomicUsize);
	impl HttpTransport for Refresher {
		fn dispatch(&self, request: OutboundRequest) -> TransportFuture<'_, InboundResponse> {
			let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
			let body = String::from_utf8_lossy(request.body.as_deref().unwrap_or_default())
				.into_owned();

			Box::pin(async move {
				assert!(body.contains("oauth_session_handle=handle"));

				Ok(InboundResponse::from_bytes(
					StatusCode::OK,
					HeaderMap::new(),
					format!("oauth_token=access-{n}&oauth_token_secret=secret-{n}&oauth_expires_in=1800"),
				))
			})
		}
	}

	fn seeded() -> AccessToken {
		AccessToken::new("access-0", "secret-0").with_session_handle("handle")
	}

	fn client() -> OAuth1Client<Refresher> {
		let config = OAuth1Config::builder("key", "secret", "https://api.example.com")
			.build()
			.expect("Fixture configuration should be valid.");

		OAuth1Client::with_transport(config, Refresher::default()).expect("Client should build.")
	}

	#[tokio::test]
	async fn refresh_without_token_fails_before_dispatch() {
		let client = client();
		let err = client.refresh_access_token().await.expect_err("No token means no refresh.");

		assert!(matches!(err, Error::MissingAccessToken));
		assert_eq!(client.transport.0.load(Ordering::SeqCst), 0);
		assert_eq!(client.refresh_metrics.attempts(), 0);
	}

	#[tokio::test]
	async fn refresh_without_session_handle_fails_before_dispatch() {
		let client = client().with_access_token(AccessToken::new("a", "s"));
		let err = client.refresh_access_token().await.expect_err("No handle means no refresh.");

		assert!(matches!(err, Error::MissingSessionHandle));
		assert_eq!(client.transport.0.load(Ordering::SeqCst), 0);
		assert_eq!(client.refresh_metrics.failures(), 1);
	}

	#[tokio::test]
	async fn refresh_merges_and_keeps_session_handle() {
		let client = client().with_access_token(seeded());
		let refreshed = client.refresh_access_token().await.expect("Refresh should succeed.");

		assert_eq!(refreshed.token, "access-1");
		assert_eq!(refreshed.session_handle.as_ref().map(|h| h.expose()), Some("handle"));
		assert!(refreshed.expires_at.is_some());
		assert_eq!(client.refresh_metrics.successes(), 1);
	}

	#[tokio::test]
	async fn stale_observation_reuses_rotated_token() {
		let client = client().with_access_token(seeded());
		let stale = client.credentials().await.expect("Fetch should succeed.").expect("Seeded.");
		let first = client.refresh_observed(&stale).await.expect("First refresh should succeed.");
		let second = client.refresh_observed(&stale).await.expect("Second call should reuse.");

		assert_eq!(first, second);
		assert_eq!(client.transport.0.load(Ordering::SeqCst), 1);
		assert_eq!(
			client.refresh_metrics.snapshot(),
			RefreshCounts { attempts: 2, rotated: 1, coalesced: 1, failed: 0 }
		);
	}

	#[tokio::test]
	async fn ensure_fresh_skips_tokens_outside_window() {
		let client = client()
			.with_access_token(seeded().with_expires_at(OffsetDateTime::now_utc() + Duration::hours(1)));
		let token = client.ensure_fresh_access_token().await.expect("Token should be returned.");

		assert_eq!(token.token, "access-0");
		assert_eq!(client.transport.0.load(Ordering::SeqCst), 0);

		let client = client.with_refresh_window(Duration::hours(2));
		let token = client.ensure_fresh_access_token().await.expect("Refresh should succeed.");

		assert_eq!(token.token, "access-1");
	}
}
