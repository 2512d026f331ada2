//! Thread-safe in-memory [`CredentialStore`] for single-process clients and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenUpdate},
	store::{CredentialStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<AccessToken>>>;

/// Keeps the access token in process memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Creates a store seeded with a previously persisted token.
	pub fn seeded(token: AccessToken) -> Self {
		Self(Arc::new(RwLock::new(Some(token))))
	}

	fn merge_now(slot: &Slot, update: AccessTokenUpdate) -> Result<AccessToken, StoreError> {
		let mut guard = slot.write();
		let next = update.apply(guard.as_ref())?;

		*guard = Some(next.clone());

		Ok(next)
	}
}
impl CredentialStore for MemoryStore {
	fn fetch(&self) -> StoreFuture<'_, Option<AccessToken>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn merge(&self, update: AccessTokenUpdate) -> StoreFuture<'_, AccessToken> {
		let slot = self.0.clone();

		Box::pin(async move { Self::merge_now(&slot, update) })
	}

	fn replace(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(token);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, Option<AccessToken>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.write().take()) })
	}
}
