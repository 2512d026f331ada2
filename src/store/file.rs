//! JSON-file [`CredentialStore`] so a session survives restarts without a new handshake.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AccessTokenUpdate},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the access token to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<AccessToken>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Option<AccessToken>, StoreError> {
		if !path.exists() {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(None);
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: Option<&AccessToken>) -> Result<(), StoreError> {
		let serialized =
			serde_json::to_vec_pretty(&contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn fetch(&self) -> StoreFuture<'_, Option<AccessToken>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn merge(&self, update: AccessTokenUpdate) -> StoreFuture<'_, AccessToken> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let next = update.apply(guard.as_ref())?;

			self.persist_locked(Some(&next))?;
			*guard = Some(next.clone());

			Ok(next)
		})
	}

	fn replace(&self, token: AccessToken) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(Some(&token))?;
			*guard = Some(token);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, Option<AccessToken>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			self.persist_locked(None)?;

			Ok(guard.take())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use time::macros;
	use tokio::runtime::Runtime;
	// self
	use super::*;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"oauth1_transport_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn merge_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let seeded = AccessToken::new("access-token", "token-secret")
			.with_session_handle("handle")
			.with_expires_at(macros::datetime!(2030-01-01 00:00 UTC));

		rt.block_on(store.replace(seeded.clone())).expect("Failed to seed the file store.");
		rt.block_on(store.merge(AccessTokenUpdate::token_pair("access-2", "secret-2")))
			.expect("Failed to merge into the file store.");
		drop(store);

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.fetch())
			.expect("Failed to fetch from file store.")
			.expect("File store lost the token after reopen.");

		assert_eq!(fetched.token, "access-2");
		assert_eq!(fetched.session_handle, seeded.session_handle);
		assert_eq!(fetched.expires_at, None);

		rt.block_on(reopened.clear()).expect("Failed to clear the file store.");

		let cleared = FileStore::open(&path).expect("Failed to reopen cleared snapshot.");

		assert!(rt.block_on(cleared.fetch()).expect("Fetch should succeed.").is_none());

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
