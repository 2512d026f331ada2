//! OAuth 1.0a signed transport for accounting APIs: the three-legged handshake, session-handle
//! refresh behind a singleflight guard, RFC 5849 request signing (HMAC-SHA1 and RSA-SHA1), and
//! streamed binary downloads and uploads over a pluggable HTTP seam.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ext;
pub mod flows;
pub mod http;
pub mod obs;
pub mod signing;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Re-exports and reqwest helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{OAuth1Client, OAuth1Config, ReqwestOAuth1Client, http::ReqwestConnector};

	/// Builds a connector that trusts the self-signed certificates served by `httpmock`.
	pub fn test_reqwest_connector() -> ReqwestConnector {
		ReqwestConnector::builder()
			.danger_accept_invalid_certs(true)
			.build()
			.expect("Failed to build insecure reqwest connector for tests.")
	}

	/// Constructs a client over [`test_reqwest_connector`] with an empty in-memory store.
	pub fn build_reqwest_test_client(config: OAuth1Config) -> ReqwestOAuth1Client {
		OAuth1Client::with_transport(config, test_reqwest_connector())
			.expect("Test client should build from a valid configuration.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use bytes::Bytes;
	pub use http::{HeaderMap, HeaderValue, Method, StatusCode};
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use client::OAuth1Client;
#[cfg(feature = "reqwest")] pub use client::ReqwestOAuth1Client;
pub use config::OAuth1Config;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
