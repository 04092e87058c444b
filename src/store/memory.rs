//! Session-scoped in-process [`CredentialBackend`].

// self
use crate::{
	_prelude::*,
	store::{BackendFuture, CredentialBackend},
};

type EntryMap = Arc<RwLock<HashMap<String, String>>>;

/// Keeps entries in-process for the lifetime of the client; the session-storage layer of
/// the store, also handy for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend(EntryMap);
impl MemoryBackend {
	/// Returns a snapshot of every stored entry; mainly for assertions in tests.
	pub fn snapshot(&self) -> HashMap<String, String> {
		self.0.read().clone()
	}
}
impl CredentialBackend for MemoryBackend {
	fn label(&self) -> &'static str {
		"memory"
	}

	fn get<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BackendFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.to_owned(), value.to_owned());

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().remove(key);

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn entries_round_trip_and_delete_is_idempotent() {
		let backend = MemoryBackend::default();

		backend.set("auth_tokens", "payload").await.expect("Set should succeed.");

		assert_eq!(
			backend.get("auth_tokens").await.expect("Get should succeed."),
			Some("payload".to_owned()),
		);

		backend.delete("auth_tokens").await.expect("Delete should succeed.");
		backend.delete("auth_tokens").await.expect("Deleting a missing key should succeed.");

		assert!(backend.get("auth_tokens").await.expect("Get should succeed.").is_none());
	}
}
