//! Outgoing request decorator: exemption rules + access-token attachment.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	http::{ACCESS_TOKEN_PARAM, ApiRequest, HttpTransport, TransportRequest},
};

/// Path patterns reachable without an access token, matched as substrings of the request
/// path: the OAuth handshake, the refresh endpoint, the development login, and the public
/// calendar export family.
pub const EXEMPT_PATH_PATTERNS: &[&str] = &[
	"/auth/vk/",
	"/auth/refresh/",
	"/auth/dev-user/",
	"/calendar/",
	"/calendar.ics",
	"/calendar/webcal",
];

/// Returns `true` when the path matches any exempt pattern.
pub fn is_exempt_path(path: &str) -> bool {
	EXEMPT_PATH_PATTERNS.iter().any(|pattern| path.contains(pattern))
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Applies the decorator and resolves the request against the base URL.
	///
	/// Exempt paths pass through unmodified. Everything else gets the stored access token
	/// merged into its query parameters; existing parameters are preserved, and a stale
	/// `access_token` entry (from a retry) is overwritten.
	pub(crate) async fn prepare(&self, request: &ApiRequest) -> Result<TransportRequest> {
		let mut query = request.query.clone();

		if !is_exempt_path(&request.path)
			&& let Some(pair) = self.store.load().await
		{
			query.insert(ACCESS_TOKEN_PARAM.to_owned(), pair.access.expose().to_owned());
		}

		let mut url = self.config.resolve(&request.path)?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter()).finish();
		}

		Ok(TransportRequest { method: request.method, url, body: request.body.clone() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::TokenPair,
		config::ClientConfig,
		http::{Method, TransportFuture, TransportResponse},
		store::{CredentialStore, MemoryBackend},
	};

	#[derive(Debug, ThisError)]
	#[error("The decorator tests never dispatch.")]
	struct NeverDispatched;

	struct NullTransport;
	impl HttpTransport for NullTransport {
		type TransportError = NeverDispatched;

		fn execute(&self, _request: TransportRequest) -> TransportFuture<'_, Self::TransportError> {
			Box::pin(async move { Ok(TransportResponse { status: 204, body: Vec::new() }) })
		}
	}

	fn build_client() -> ApiClient<NullTransport> {
		let store = Arc::new(CredentialStore::new(vec![Arc::new(MemoryBackend::default())]));
		let config = ClientConfig::builder(
			Url::parse("https://api.example.com").expect("Base URL fixture should parse."),
		)
		.build()
		.expect("Test configuration should validate.");

		ApiClient::with_transport(store, config, NullTransport)
	}

	#[test]
	fn exemption_covers_the_documented_families() {
		assert!(is_exempt_path("/auth/vk/callback/"));
		assert!(is_exempt_path("/auth/refresh/"));
		assert!(is_exempt_path("/auth/dev-user/"));
		assert!(is_exempt_path("/calendar/42/export/"));
		assert!(is_exempt_path("/teams/7/calendar.ics"));
		assert!(is_exempt_path("/calendar/webcal"));
		assert!(!is_exempt_path("/auth/logout/"));
		assert!(!is_exempt_path("/events/"));
	}

	#[tokio::test]
	async fn exempt_paths_never_carry_the_token() {
		let client = build_client();
		let pair = TokenPair::new("a1", "r1").expect("Pair fixture should be valid.");

		client.store.save(&pair).await;

		let prepared = client
			.prepare(&ApiRequest::get("/calendar/42/export/").with_query("format", "ics"))
			.await
			.expect("Exempt requests should prepare successfully.");

		assert!(prepared.url.query_pairs().all(|(name, _)| name != ACCESS_TOKEN_PARAM));
		assert!(prepared.url.query_pairs().any(|(name, value)| name == "format" && value == "ics"));
	}

	#[tokio::test]
	async fn protected_paths_merge_the_token_into_the_query() {
		let client = build_client();
		let pair = TokenPair::new("a1", "r1").expect("Pair fixture should be valid.");

		client.store.save(&pair).await;

		let prepared = client
			.prepare(&ApiRequest::new(Method::Post, "/events/").with_query("notify", "1"))
			.await
			.expect("Protected requests should prepare successfully.");

		assert!(
			prepared
				.url
				.query_pairs()
				.any(|(name, value)| name == ACCESS_TOKEN_PARAM && value == "a1")
		);
		assert!(prepared.url.query_pairs().any(|(name, value)| name == "notify" && value == "1"));
	}

	#[tokio::test]
	async fn missing_credentials_leave_the_request_bare() {
		let client = build_client();
		let prepared = client
			.prepare(&ApiRequest::get("/events/"))
			.await
			.expect("Requests without credentials should prepare successfully.");

		assert!(prepared.url.query().is_none());
	}
}
