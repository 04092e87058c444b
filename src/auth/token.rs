//! Access/refresh token pair with redacted secrets and a non-empty invariant.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
///
/// Serialization is transparent (the raw string), so a persisted [`TokenPair`] reads back as
/// plain `{"access":"...","refresh":"..."}` JSON.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Error raised when a token pair violates the non-empty invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum TokenPairError {
	/// The access token was empty.
	#[error("Access token cannot be empty.")]
	EmptyAccess,
	/// The refresh token was empty.
	#[error("Refresh token cannot be empty.")]
	EmptyRefresh,
}

/// Access/refresh credential bundle used for authenticating API calls and renewing access
/// without re-login.
///
/// Both fields are non-empty by construction; a partially-populated pair read back from
/// storage fails deserialization and is treated as absent by the store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTokenPair")]
pub struct TokenPair {
	/// Short-lived token attached to outgoing API calls.
	pub access: TokenSecret,
	/// Long-lived token exchanged for a fresh access token on 401.
	pub refresh: TokenSecret,
}
impl TokenPair {
	/// Builds a pair after validating that both tokens are non-empty.
	pub fn new(
		access: impl Into<String>,
		refresh: impl Into<String>,
	) -> Result<Self, TokenPairError> {
		let access = access.into();
		let refresh = refresh.into();

		if access.is_empty() {
			return Err(TokenPairError::EmptyAccess);
		}
		if refresh.is_empty() {
			return Err(TokenPairError::EmptyRefresh);
		}

		Ok(Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) })
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access", &"<redacted>")
			.field("refresh", &"<redacted>")
			.finish()
	}
}
impl TryFrom<RawTokenPair> for TokenPair {
	type Error = TokenPairError;

	fn try_from(raw: RawTokenPair) -> Result<Self, Self::Error> {
		Self::new(raw.access, raw.refresh)
	}
}

#[derive(Deserialize)]
struct RawTokenPair {
	access: String,
	refresh: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn pair_rejects_empty_fields() {
		assert_eq!(TokenPair::new("", "r1"), Err(TokenPairError::EmptyAccess));
		assert_eq!(TokenPair::new("a1", ""), Err(TokenPairError::EmptyRefresh));

		let pair = TokenPair::new("a1", "r1").expect("Non-empty pair should be valid.");

		assert_eq!(pair.access.expose(), "a1");
		assert_eq!(pair.refresh.expose(), "r1");
	}

	#[test]
	fn serde_round_trip_matches_wire_form() {
		let pair = TokenPair::new("a1", "r1").expect("Pair fixture should be valid.");
		let payload = serde_json::to_string(&pair).expect("Pair should serialize to JSON.");

		assert_eq!(payload, "{\"access\":\"a1\",\"refresh\":\"r1\"}");

		let parsed: TokenPair =
			serde_json::from_str(&payload).expect("Serialized pair should deserialize.");

		assert_eq!(parsed, pair);
	}

	#[test]
	fn deserialization_enforces_the_invariant() {
		assert!(serde_json::from_str::<TokenPair>("{\"access\":\"\",\"refresh\":\"r\"}").is_err());
		assert!(serde_json::from_str::<TokenPair>("{\"access\":\"a\"}").is_err());
		assert!(serde_json::from_str::<TokenPair>("not json").is_err());
	}

	#[test]
	fn pair_debug_redacts_both_fields() {
		let pair = TokenPair::new("a1", "r1").expect("Pair fixture should be valid.");
		let rendered = format!("{pair:?}");

		assert!(!rendered.contains("a1"));
		assert!(!rendered.contains("r1"));
	}
}
