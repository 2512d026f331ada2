//! Capability traits the resource-wrapper layer is written against.
//!
//! [`ApiTransport`] covers the signed verbs and the streamed transfers; [`TokenHandshake`]
//! covers the OAuth 1.0a legs. [`crate::client::OAuth1Client`] implements both, so wrappers
//! can stay generic and tests can substitute their own implementations.

pub mod api;
pub mod handshake;

pub use api::*;
pub use handshake::*;

// self
use crate::_prelude::*;

/// Boxed future returned by the capability traits.
pub type CapabilityFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;
