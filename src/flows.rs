//! Token exchange legs and the session-handle refresh, implemented on [`OAuth1Client`].
//!
//! The handshake runs `get_request_token` → `build_authorise_url` →
//! `swap_request_token_for_access_token`. Afterwards the access token lives in the client's
//! credential store and is rotated by `refresh_access_token`, which signs with the current
//! access token pair and never with a request token.
//!
//! [`OAuth1Client`]: crate::client::OAuth1Client

pub mod common;
pub mod handshake;
pub mod refresh;

pub use refresh::{RefreshCounts, RefreshMetrics};
