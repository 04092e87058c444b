//! Opaque cached user profile stored beside the token pair.

// self
use crate::_prelude::*;

/// Cached user profile persisted under the `auth_user` entry.
///
/// The client treats the payload as opaque JSON; it is written after login, read back to
/// avoid an extra profile fetch, and purged together with the tokens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CachedUser(serde_json::Value);
impl CachedUser {
	/// Wraps an opaque profile payload.
	pub fn new(profile: serde_json::Value) -> Self {
		Self(profile)
	}

	/// Returns the wrapped profile payload.
	pub fn as_value(&self) -> &serde_json::Value {
		&self.0
	}
}
impl From<serde_json::Value> for CachedUser {
	fn from(profile: serde_json::Value) -> Self {
		Self::new(profile)
	}
}
