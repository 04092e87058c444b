//! Cross-subdomain cookie [`CredentialBackend`].
//!
//! The platform cookie primitive stays outside this crate: implement [`CookieJar`] over
//! whatever actually holds cookies (a webview bridge, an embedded browser engine, a test
//! jar) and the backend applies the attribute policy on every write.

// self
use crate::{
	_prelude::*,
	store::{BackendFuture, CredentialBackend},
};

/// `SameSite` cookie attribute values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
	/// Sent on same-site requests only.
	Strict,
	/// Sent on same-site requests and top-level navigations.
	Lax,
	/// Sent cross-site; requires `Secure`.
	None,
}
impl SameSite {
	/// Returns the attribute value as it appears on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			SameSite::Strict => "Strict",
			SameSite::Lax => "Lax",
			SameSite::None => "None",
		}
	}
}
impl Display for SameSite {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Attribute set applied to every credential cookie write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieAttributes {
	/// Cookie path; always `/` so every route sees the credential.
	pub path: String,
	/// Parent domain for cross-subdomain sharing, when the origin belongs to it.
	pub domain: Option<String>,
	/// Mirrors the origin scheme.
	pub secure: bool,
	/// `SameSite` mode picked by the compatibility rule.
	pub same_site: SameSite,
	/// Optional lifetime; `None` makes a session cookie, which is what the credential
	/// entry uses.
	pub max_age: Option<Duration>,
}
impl CookieAttributes {
	/// Computes the attribute set for a client origin.
	///
	/// `domain` is only set when the origin host equals the shared parent domain or is a
	/// subdomain of it; otherwise the cookie stays host-only. `SameSite` defaults to `Lax`
	/// and is relaxed to `None` only over secure transport, except for clients that treat
	/// `None` as `Strict` (older WebKit), which stay on `Lax` via
	/// `same_site_none_incompatible`.
	pub fn for_origin(
		origin: &Url,
		shared_domain: Option<&str>,
		same_site_none_incompatible: bool,
	) -> Self {
		let secure = origin.scheme() == "https";
		let domain = shared_domain
			.filter(|parent| origin.host_str().is_some_and(|host| in_domain_family(host, parent)))
			.map(str::to_owned);
		let same_site = if secure && !same_site_none_incompatible {
			SameSite::None
		} else {
			SameSite::Lax
		};

		Self { path: "/".to_owned(), domain, secure, same_site, max_age: None }
	}
}

/// Returns `true` when `host` is the parent domain itself or one of its subdomains.
fn in_domain_family(host: &str, parent: &str) -> bool {
	let parent = parent.trim_start_matches('.');

	host == parent || host.strip_suffix(parent).is_some_and(|lead| lead.ends_with('.'))
}

/// A cookie write: name, value, and the attributes to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
	/// Cookie name.
	pub name: String,
	/// Cookie value.
	pub value: String,
	/// Attributes applied on write.
	pub attributes: CookieAttributes,
}

/// Capability contract for the platform cookie primitive.
///
/// Implementations are synchronous; platform jars that can fail should treat a failed
/// read as absence and drop failed writes, since the layered store self-heals from the
/// other backends.
pub trait CookieJar
where
	Self: Send + Sync,
{
	/// Returns the live value stored under `name`.
	fn get(&self, name: &str) -> Option<String>;

	/// Stores a cookie, replacing any previous value under the same name.
	fn set(&self, cookie: Cookie);

	/// Removes the cookie stored under `name`, scoped by the same attributes used to set
	/// it.
	fn delete(&self, name: &str, attributes: &CookieAttributes);
}

#[derive(Clone, Debug)]
struct StoredCookie {
	value: String,
	expires_at: Option<OffsetDateTime>,
}

/// In-memory [`CookieJar`] honoring `max_age`, for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryCookieJar(RwLock<HashMap<String, StoredCookie>>);
impl CookieJar for MemoryCookieJar {
	fn get(&self, name: &str) -> Option<String> {
		let guard = self.0.read();
		let stored = guard.get(name)?;

		if stored.expires_at.is_some_and(|instant| instant <= OffsetDateTime::now_utc()) {
			return None;
		}

		Some(stored.value.clone())
	}

	fn set(&self, cookie: Cookie) {
		let expires_at =
			cookie.attributes.max_age.map(|max_age| OffsetDateTime::now_utc() + max_age);

		self.0
			.write()
			.insert(cookie.name, StoredCookie { value: cookie.value, expires_at });
	}

	fn delete(&self, name: &str, _attributes: &CookieAttributes) {
		self.0.write().remove(name);
	}
}

/// Adapts a [`CookieJar`] into the async [`CredentialBackend`] contract.
pub struct CookieBackend {
	jar: Arc<dyn CookieJar>,
	attributes: CookieAttributes,
}
impl CookieBackend {
	/// Builds a backend writing through `jar` with the provided attribute policy.
	pub fn new(jar: Arc<dyn CookieJar>, attributes: CookieAttributes) -> Self {
		Self { jar, attributes }
	}

	/// Returns the attribute policy applied on every write.
	pub fn attributes(&self) -> &CookieAttributes {
		&self.attributes
	}
}
impl CredentialBackend for CookieBackend {
	fn label(&self) -> &'static str {
		"cookie"
	}

	fn get<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Option<String>> {
		Box::pin(async move { Ok(self.jar.get(key)) })
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a str) -> BackendFuture<'a, ()> {
		Box::pin(async move {
			self.jar.set(Cookie {
				name: key.to_owned(),
				value: value.to_owned(),
				attributes: self.attributes.clone(),
			});

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> BackendFuture<'a, ()> {
		Box::pin(async move {
			self.jar.delete(key, &self.attributes);

			Ok(())
		})
	}
}
impl Debug for CookieBackend {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CookieBackend").field("attributes", &self.attributes).finish()
	}
}
