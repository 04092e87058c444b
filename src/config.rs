//! Client configuration and its validating builder.
//!
//! Base-URL resolution is a caller concern: the configuration accepts an already-resolved
//! [`Url`] and only validates and joins against it.

// self
use crate::{_prelude::*, error::ConfigError, store::cookie::CookieAttributes};

/// Default path of the token refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh/";
/// Default path of the login screen, relative to the base origin.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Validated configuration shared by the client pipeline and the cookie backend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base URL every request path is resolved against.
	pub base_url: Url,
	/// Refresh endpoint path, relative to the base URL.
	pub refresh_path: String,
	/// Login screen path, relative to the base origin.
	pub login_path: String,
	/// Shared parent domain for the cross-subdomain cookie backend, when configured.
	pub cookie_domain: Option<String>,
	/// Keeps the credential cookie on `SameSite=Lax` even over secure transport, for
	/// clients that treat `SameSite=None` as `Strict`.
	pub same_site_none_incompatible: bool,
}
impl ClientConfig {
	/// Returns a builder seeded with the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves an absolute request path against the base URL, preserving any base path
	/// prefix.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		if !path.starts_with('/') {
			return Err(ConfigError::RelativePath { kind: "request", path: path.to_owned() });
		}

		let joined = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));

		Url::parse(&joined)
			.map_err(|source| ConfigError::UnresolvablePath { path: path.to_owned(), source })
	}

	/// Resolves the refresh endpoint URL.
	pub fn refresh_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.refresh_path)
	}

	/// Returns the login screen URL at the base origin.
	pub fn login_url(&self) -> Url {
		let mut url = self.base_url.clone();

		url.set_path(&self.login_path);
		url.set_query(None);
		url.set_fragment(None);

		url
	}

	/// Computes the attribute set the cookie backend applies for this origin.
	pub fn cookie_attributes(&self) -> CookieAttributes {
		CookieAttributes::for_origin(
			&self.base_url,
			self.cookie_domain.as_deref(),
			self.same_site_none_incompatible,
		)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL being configured.
	pub base_url: Url,
	/// Refresh endpoint path override.
	pub refresh_path: String,
	/// Login screen path override.
	pub login_path: String,
	/// Shared parent cookie domain override.
	pub cookie_domain: Option<String>,
	/// SameSite compatibility override.
	pub same_site_none_incompatible: bool,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
			login_path: DEFAULT_LOGIN_PATH.to_owned(),
			cookie_domain: None,
			same_site_none_incompatible: false,
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the login screen path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Sets the shared parent domain for the cross-subdomain cookie.
	pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
		self.cookie_domain = Some(domain.into());

		self
	}

	/// Keeps the credential cookie on `SameSite=Lax` regardless of transport security.
	pub fn same_site_none_incompatible(mut self, incompatible: bool) -> Self {
		self.same_site_none_incompatible = incompatible;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.base_url.host_str().is_none() {
			return Err(ConfigError::MissingHost { url: self.base_url.to_string() });
		}
		if !self.refresh_path.starts_with('/') {
			return Err(ConfigError::RelativePath { kind: "refresh", path: self.refresh_path });
		}
		if !self.login_path.starts_with('/') {
			return Err(ConfigError::RelativePath { kind: "login", path: self.login_path });
		}

		let mut base_url = self.base_url;

		// Request paths are appended textually, so the base must stay a bare origin + path.
		base_url.set_query(None);
		base_url.set_fragment(None);

		let config = ClientConfig {
			base_url,
			refresh_path: self.refresh_path,
			login_path: self.login_path,
			cookie_domain: self.cookie_domain,
			same_site_none_incompatible: self.same_site_none_incompatible,
		};

		config.refresh_url()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base(value: &str) -> Url {
		Url::parse(value).expect("Base URL fixture should parse.")
	}

	#[test]
	fn builder_applies_defaults_and_validates() {
		let config = ClientConfig::builder(base("https://api.example.com"))
			.build()
			.expect("Default configuration should validate.");

		assert_eq!(config.refresh_path, DEFAULT_REFRESH_PATH);
		assert_eq!(config.login_path, DEFAULT_LOGIN_PATH);
		assert_eq!(config.login_url().as_str(), "https://api.example.com/login");
		assert_eq!(
			config.refresh_url().expect("Refresh URL should resolve.").as_str(),
			"https://api.example.com/auth/refresh/",
		);
	}

	#[test]
	fn builder_rejects_invalid_inputs() {
		assert!(matches!(
			ClientConfig::builder(base("ftp://api.example.com")).build(),
			Err(ConfigError::UnsupportedScheme { .. }),
		));
		assert!(matches!(
			ClientConfig::builder(base("https://api.example.com"))
				.refresh_path("auth/refresh/")
				.build(),
			Err(ConfigError::RelativePath { kind: "refresh", .. }),
		));
		assert!(matches!(
			ClientConfig::builder(base("https://api.example.com")).login_path("login").build(),
			Err(ConfigError::RelativePath { kind: "login", .. }),
		));
	}

	#[test]
	fn resolve_preserves_base_path_prefix() {
		let config = ClientConfig::builder(base("https://api.example.com/v1/"))
			.build()
			.expect("Prefixed configuration should validate.");
		let resolved = config.resolve("/events/").expect("Path should resolve.");

		assert_eq!(resolved.as_str(), "https://api.example.com/v1/events/");
		assert!(matches!(
			config.resolve("events/"),
			Err(ConfigError::RelativePath { kind: "request", .. }),
		));
	}

	#[test]
	fn login_url_strips_query_and_fragment() {
		let config = ClientConfig::builder(base("https://app.example.com/api?debug=1#frag"))
			.build()
			.expect("Configuration with query should validate.");

		assert_eq!(config.login_url().as_str(), "https://app.example.com/login");
	}
}
