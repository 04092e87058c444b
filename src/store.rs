//! Storage contracts and the layered credential store.
//!
//! Credentials live in several physical backends at once (durable, session-scoped, and a
//! cross-subdomain cookie). Reads walk the backends in fixed priority order and the first
//! structurally valid pair wins; writes and deletes fan out to every backend best-effort,
//! so a failing backend never blocks the others.

pub mod cookie;
pub mod file;
pub mod memory;

pub use cookie::{Cookie, CookieAttributes, CookieBackend, CookieJar, MemoryCookieJar, SameSite};
pub use file::FileBackend;
pub use memory::MemoryBackend;

// self
use crate::{
	_prelude::*,
	auth::{CachedUser, TokenPair},
};

/// Future type returned by [`CredentialBackend`] operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Namespace prefix shared by every persisted entry.
pub const STORAGE_KEY_PREFIX: &str = "auth_";

/// One physical persistence mechanism holding a copy of the credential entries.
pub trait CredentialBackend
where
	Self: Send + Sync,
{
	/// Stable backend label used in diagnostics.
	fn label(&self) -> &'static str;

	/// Fetches the raw value stored under `key`, if present.
	fn get<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Option<String>>;

	/// Persists or replaces the raw value stored under `key`.
	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BackendFuture<'a, ()>;

	/// Removes the value stored under `key`. Removing a missing key is not an error.
	fn delete<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ()>;
}

/// Error type produced by [`CredentialBackend`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage mechanism.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Logical entries persisted by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageEntry {
	/// The serialized [`TokenPair`].
	Tokens,
	/// The opaque cached user profile.
	User,
}
impl StorageEntry {
	const ALL: [Self; 2] = [Self::Tokens, Self::User];

	/// Returns the fully namespaced storage key.
	pub const fn key(self) -> &'static str {
		match self {
			Self::Tokens => "auth_tokens",
			Self::User => "auth_user",
		}
	}
}

/// Ordered multi-backend credential store with first-match-wins reads.
pub struct CredentialStore {
	backends: Vec<Arc<dyn CredentialBackend>>,
}
impl CredentialStore {
	/// Builds a store over the provided backends; earlier entries take read priority.
	pub fn new(backends: Vec<Arc<dyn CredentialBackend>>) -> Self {
		Self { backends }
	}

	/// Returns the backends in read-priority order.
	pub fn backends(&self) -> &[Arc<dyn CredentialBackend>] {
		&self.backends
	}

	/// Loads the first structurally valid token pair.
	///
	/// Backend failures and malformed payloads are treated as absence for that backend and
	/// the next one is tried.
	pub async fn load(&self) -> Option<TokenPair> {
		self.load_entry(StorageEntry::Tokens).await
	}

	/// Serializes the pair once and writes it to every backend independently.
	pub async fn save(&self, pair: &TokenPair) {
		self.save_entry(StorageEntry::Tokens, pair).await;
	}

	/// Loads the cached user profile, if any backend holds a parsable copy.
	pub async fn load_user(&self) -> Option<CachedUser> {
		self.load_entry(StorageEntry::User).await
	}

	/// Writes the cached user profile to every backend independently.
	pub async fn save_user(&self, user: &CachedUser) {
		self.save_entry(StorageEntry::User, user).await;
	}

	/// Removes the token and cached-user entries from every backend.
	pub async fn clear(&self) {
		for backend in &self.backends {
			for entry in StorageEntry::ALL {
				if let Err(e) = backend.delete(entry.key()).await {
					note_backend_failure(backend.label(), "delete", &e);
				}
			}
		}
	}

	async fn load_entry<T>(&self, entry: StorageEntry) -> Option<T>
	where
		T: for<'de> Deserialize<'de>,
	{
		for backend in &self.backends {
			let raw = match backend.get(entry.key()).await {
				Ok(Some(raw)) => raw,
				Ok(None) => continue,
				Err(e) => {
					note_backend_failure(backend.label(), "get", &e);

					continue;
				},
			};

			match serde_json::from_str(&raw) {
				Ok(value) => return Some(value),
				// Malformed payloads count as absence; the next backend may hold a good copy.
				Err(_) => continue,
			}
		}

		None
	}

	async fn save_entry<T>(&self, entry: StorageEntry, value: &T)
	where
		T: Serialize,
	{
		let serialized = match serde_json::to_string(value) {
			Ok(serialized) => serialized,
			Err(e) => {
				let failure = StoreError::Serialization { message: e.to_string() };

				note_backend_failure("store", "serialize", &failure);

				return;
			},
		};

		for backend in &self.backends {
			if let Err(e) = backend.set(entry.key(), &serialized).await {
				note_backend_failure(backend.label(), "set", &e);
			}
		}
	}
}
impl Debug for CredentialStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let labels: Vec<_> = self.backends.iter().map(|backend| backend.label()).collect();

		f.debug_struct("CredentialStore").field("backends", &labels).finish()
	}
}

fn note_backend_failure(backend: &'static str, op: &'static str, err: &StoreError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(backend, op, error = %err, "Credential backend operation failed.");

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (backend, op, err);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn pair(access: &str, refresh: &str) -> TokenPair {
		TokenPair::new(access, refresh).expect("Pair fixture should be valid.")
	}

	#[test]
	fn storage_keys_share_the_namespace_prefix() {
		for entry in StorageEntry::ALL {
			assert!(entry.key().starts_with(STORAGE_KEY_PREFIX));
		}

		assert_eq!(StorageEntry::Tokens.key(), "auth_tokens");
		assert_eq!(StorageEntry::User.key(), "auth_user");
	}

	#[tokio::test]
	async fn load_prefers_earlier_backends() {
		let first = Arc::new(MemoryBackend::default());
		let second = Arc::new(MemoryBackend::default());
		let store = CredentialStore::new(vec![first.clone(), second.clone()]);
		let winner = pair("access-first", "refresh-first");
		let loser = pair("access-second", "refresh-second");

		first
			.set(
				StorageEntry::Tokens.key(),
				&serde_json::to_string(&winner).expect("Winner should serialize."),
			)
			.await
			.expect("Seeding the first backend should succeed.");
		second
			.set(
				StorageEntry::Tokens.key(),
				&serde_json::to_string(&loser).expect("Loser should serialize."),
			)
			.await
			.expect("Seeding the second backend should succeed.");

		let loaded = store.load().await.expect("A pair should be found.");

		assert_eq!(loaded.access.expose(), "access-first");
	}

	#[tokio::test]
	async fn load_skips_malformed_payloads() {
		let first = Arc::new(MemoryBackend::default());
		let second = Arc::new(MemoryBackend::default());
		let store = CredentialStore::new(vec![first.clone(), second.clone()]);
		let good = pair("access-good", "refresh-good");

		first
			.set(StorageEntry::Tokens.key(), "{not json")
			.await
			.expect("Seeding malformed data should succeed.");
		second
			.set(
				StorageEntry::Tokens.key(),
				&serde_json::to_string(&good).expect("Good pair should serialize."),
			)
			.await
			.expect("Seeding the second backend should succeed.");

		let loaded = store.load().await.expect("The second backend should win.");

		assert_eq!(loaded.access.expose(), "access-good");
	}

	#[tokio::test]
	async fn save_fans_out_to_all_backends() {
		let first = Arc::new(MemoryBackend::default());
		let second = Arc::new(MemoryBackend::default());
		let store = CredentialStore::new(vec![first.clone(), second.clone()]);
		let saved = pair("access-1", "refresh-1");

		store.save(&saved).await;

		for backend in [&first, &second] {
			let raw = backend
				.get(StorageEntry::Tokens.key())
				.await
				.expect("Reading back should succeed.")
				.expect("Every backend should hold the pair.");
			let parsed: TokenPair =
				serde_json::from_str(&raw).expect("Persisted pair should parse.");

			assert_eq!(parsed.access.expose(), "access-1");
		}
	}

	#[tokio::test]
	async fn user_profile_round_trips_and_clears() {
		let backend = Arc::new(MemoryBackend::default());
		let store = CredentialStore::new(vec![backend.clone()]);
		let user = CachedUser::new(serde_json::json!({ "id": 1 }));

		store.save(&pair("a", "r")).await;
		store.save_user(&user).await;

		assert_eq!(store.load_user().await, Some(user));

		store.clear().await;

		assert!(store.load().await.is_none());
		assert!(store.load_user().await.is_none());
		assert!(
			backend
				.get(StorageEntry::User.key())
				.await
				.expect("Reading a cleared key should succeed.")
				.is_none()
		);
	}
}
