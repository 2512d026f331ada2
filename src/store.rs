//! Credential State contracts and the built-in backends.
//!
//! A store holds at most one [`AccessToken`]. Writes go through [`CredentialStore::merge`] or
//! [`CredentialStore::replace`], which apply atomically under the backend's write lock, so a
//! concurrent reader never observes a half-updated token pair.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenUpdate, TokenUpdateError},
};

/// Boxed future returned by [`CredentialStore`] implementations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend for the single access-token slot.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the stored token, if any.
	fn fetch(&self) -> StoreFuture<'_, Option<AccessToken>>;

	/// Shallow-merges `update` into the stored token and returns the result.
	fn merge(&self, update: AccessTokenUpdate) -> StoreFuture<'_, AccessToken>;

	/// Replaces the stored token wholesale.
	fn replace(&self, token: AccessToken) -> StoreFuture<'_, ()>;

	/// Empties the slot, returning the previous token.
	fn clear(&self) -> StoreFuture<'_, Option<AccessToken>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// A partial update was merged into an empty slot.
	#[error("Credential update is incomplete: {0}")]
	IncompleteUpdate(#[from] TokenUpdateError),
}
