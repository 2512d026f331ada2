//! Short-lived request token issued by the first handshake leg.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Temporary credentials returned by the request-token endpoint.
///
/// The pair is only good for building the authorize URL and for the verifier exchange;
/// it is never used to sign API calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
	/// Public `oauth_token` value.
	pub token: String,
	/// Matching `oauth_token_secret`.
	pub token_secret: TokenSecret,
}
impl RequestToken {
	/// Creates a request token from its two halves.
	pub fn new(token: impl Into<String>, token_secret: impl Into<TokenSecret>) -> Self {
		Self { token: token.into(), token_secret: token_secret.into() }
	}
}
impl Debug for RequestToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestToken")
			.field("token", &self.token)
			.field("token_secret", &"<redacted>")
			.finish()
	}
}
