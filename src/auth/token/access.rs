//! Long-lived access token, its lifecycle helpers, and partial updates.

// self
use crate::{
	_prelude::*,
	auth::{RequestToken, TokenSecret},
};

/// Lifecycle status for an [`AccessToken`] at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is usable (or carries no expiry information).
	Active,
	/// Token passed its expiry but the session handle can still refresh it.
	Refreshable,
	/// Token expired and cannot be refreshed.
	Expired,
}

/// Errors produced when applying an [`AccessTokenUpdate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenUpdateError {
	/// The update targets an empty credential slot but omits the token pair.
	#[error("Update must carry both token and token secret when no access token is stored.")]
	MissingTokenPair,
}

/// Access credentials used to sign every API call.
///
/// `session_handle` and the expiry instants are provider extensions: the handle allows the
/// token to be refreshed without another user authorization until
/// `authorization_expires_at`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Public `oauth_token` value.
	pub token: String,
	/// Matching `oauth_token_secret`.
	pub token_secret: TokenSecret,
	/// Session handle that authorizes refresh calls.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_handle: Option<TokenSecret>,
	/// Instant the access token stops being accepted.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Instant the session handle stops being refreshable.
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub authorization_expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Creates an access token without session or expiry metadata.
	pub fn new(token: impl Into<String>, token_secret: impl Into<TokenSecret>) -> Self {
		Self {
			token: token.into(),
			token_secret: token_secret.into(),
			session_handle: None,
			expires_at: None,
			authorization_expires_at: None,
		}
	}

	/// Attaches a session handle.
	pub fn with_session_handle(mut self, handle: impl Into<TokenSecret>) -> Self {
		self.session_handle = Some(handle.into());

		self
	}

	/// Sets the absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the instant after which the session handle can no longer refresh.
	pub fn with_authorization_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.authorization_expires_at = Some(instant);

		self
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		match self.expires_at {
			Some(expires_at) if instant >= expires_at =>
				if self.can_refresh_at(instant) {
					TokenStatus::Refreshable
				} else {
					TokenStatus::Expired
				},
			_ => TokenStatus::Active,
		}
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token expires within `window` of `instant`.
	pub fn expires_within(&self, instant: OffsetDateTime, window: Duration) -> bool {
		self.expires_at.is_some_and(|expires_at| expires_at - instant <= window)
	}

	/// Returns `true` when a session handle exists and its authorization window is open.
	pub fn can_refresh_at(&self, instant: OffsetDateTime) -> bool {
		self.session_handle.is_some()
			&& self.authorization_expires_at.is_none_or(|deadline| instant < deadline)
	}

	/// Returns `true` when both tokens carry the same public `oauth_token` value.
	pub fn same_token(&self, other: &Self) -> bool {
		self.token == other.token
	}
}
impl From<RequestToken> for AccessToken {
	fn from(value: RequestToken) -> Self {
		Self::new(value.token, value.token_secret)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token", &self.token)
			.field("token_secret", &"<redacted>")
			.field("session_handle", &self.session_handle.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("authorization_expires_at", &self.authorization_expires_at)
			.finish()
	}
}

/// Partial update merged into the stored [`AccessToken`].
///
/// Fields left as `None` keep their stored value, so a refresh response that omits the
/// session handle does not erase it. `expires_at` is the exception: it belongs to the token
/// it was issued with, so an update carrying a new `token` also replaces the expiry, clearing
/// it when none is given.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessTokenUpdate {
	/// Replacement `oauth_token`.
	pub token: Option<String>,
	/// Replacement `oauth_token_secret`.
	pub token_secret: Option<TokenSecret>,
	/// Replacement session handle.
	pub session_handle: Option<TokenSecret>,
	/// Replacement expiry instant.
	pub expires_at: Option<OffsetDateTime>,
	/// Replacement session authorization expiry instant.
	pub authorization_expires_at: Option<OffsetDateTime>,
}
impl AccessTokenUpdate {
	/// Creates an update that replaces the token pair.
	pub fn token_pair(token: impl Into<String>, token_secret: impl Into<TokenSecret>) -> Self {
		Self {
			token: Some(token.into()),
			token_secret: Some(token_secret.into()),
			..Default::default()
		}
	}

	/// Sets the session handle.
	pub fn session_handle(mut self, handle: impl Into<TokenSecret>) -> Self {
		self.session_handle = Some(handle.into());

		self
	}

	/// Sets the expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the session authorization expiry instant.
	pub fn authorization_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.authorization_expires_at = Some(instant);

		self
	}

	/// Shallow-merges the update over `current`, producing the next stored token.
	pub fn apply(self, current: Option<&AccessToken>) -> Result<AccessToken, TokenUpdateError> {
		let Some(current) = current else {
			let (Some(token), Some(token_secret)) = (self.token, self.token_secret) else {
				return Err(TokenUpdateError::MissingTokenPair);
			};

			return Ok(AccessToken {
				token,
				token_secret,
				session_handle: self.session_handle,
				expires_at: self.expires_at,
				authorization_expires_at: self.authorization_expires_at,
			});
		};

		let rotated = self.token.is_some();

		Ok(AccessToken {
			token: self.token.unwrap_or_else(|| current.token.clone()),
			token_secret: self.token_secret.unwrap_or_else(|| current.token_secret.clone()),
			session_handle: self.session_handle.or_else(|| current.session_handle.clone()),
			expires_at: if rotated {
				self.expires_at
			} else {
				self.expires_at.or(current.expires_at)
			},
			authorization_expires_at: self
				.authorization_expires_at
				.or(current.authorization_expires_at),
		})
	}
}
impl From<AccessToken> for AccessTokenUpdate {
	fn from(value: AccessToken) -> Self {
		Self {
			token: Some(value.token),
			token_secret: Some(value.token_secret),
			session_handle: value.session_handle,
			expires_at: value.expires_at,
			authorization_expires_at: value.authorization_expires_at,
		}
	}
}
impl Debug for AccessTokenUpdate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenUpdate")
			.field("token", &self.token)
			.field("token_secret", &self.token_secret.as_ref().map(|_| "<redacted>"))
			.field("session_handle", &self.session_handle.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("authorization_expires_at", &self.authorization_expires_at)
			.finish()
	}
}
