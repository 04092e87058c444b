//! The authenticated client pipeline: decorate, dispatch, recover.

pub mod authenticate;
pub mod redirect;
pub mod refresh;

pub use authenticate::*;
pub use redirect::*;
pub use refresh::*;

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{StatusError, TransportError},
	http::{ACCESS_TOKEN_PARAM, ApiRequest, HttpTransport, TransportResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

const HTTP_UNAUTHORIZED: u16 = 401;

/// Executes API calls with credential attachment and single-retry-on-401 recovery.
///
/// The client is an explicitly constructed value injected into callers; it owns the
/// transport, the layered credential store, the validated configuration, and the login
/// redirect hook, so the pipeline stages can focus on their own step. Cloning is cheap
/// and clones share every collaborator.
pub struct ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound call, including refreshes.
	pub transport: Arc<C>,
	/// Layered credential store consulted by the decorator and the refresh flow.
	pub store: Arc<CredentialStore>,
	/// Validated client configuration.
	pub config: ClientConfig,
	/// Hook invoked when a refresh failure terminates the session.
	pub login_redirect: Arc<dyn LoginRedirect>,
	/// Shared metrics recorder for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<CredentialStore>,
		config: ClientConfig,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			login_redirect: Arc::new(NullRedirect),
			refresh_metrics: Default::default(),
		}
	}

	/// Sets or replaces the login redirect hook.
	pub fn with_login_redirect<R>(mut self, hook: Arc<R>) -> Self
	where
		R: 'static + LoginRedirect,
	{
		self.login_redirect = hook;

		self
	}

	/// Executes an API call through the full pipeline and returns the final response.
	///
	/// A 401 answer triggers at most one refresh-and-retry cycle; the retried call's
	/// outcome, success or failure, is what the caller sees.
	pub async fn execute(&self, request: ApiRequest) -> Result<TransportResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "execute");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let mut call = CallContext { request, retried: false };
		let result = span.instrument(self.dispatch(&mut call)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	async fn dispatch(&self, call: &mut CallContext) -> Result<TransportResponse> {
		loop {
			let prepared = self.prepare(&call.request).await?;
			let response = self
				.transport
				.execute(prepared)
				.await
				.map_err(|e| Error::from(TransportError::network(e)))?;

			if response.status != HTTP_UNAUTHORIZED || call.retried {
				return Self::finish(response);
			}

			// At most one refresh cycle per originating request.
			call.retried = true;

			match self.recover_unauthorized().await {
				RefreshOutcome::Refreshed(pair) => {
					call.request
						.query
						.insert(ACCESS_TOKEN_PARAM.to_owned(), pair.access.expose().to_owned());
				},
				RefreshOutcome::NoRefreshToken =>
					return Err(StatusError { status: response.status, body: response.body }.into()),
				RefreshOutcome::Failed => {
					self.store.clear().await;
					self.login_redirect.redirect_to_login(&self.config.login_url());

					return Err(StatusError { status: response.status, body: response.body }.into());
				},
			}
		}
	}

	fn finish(response: TransportResponse) -> Result<TransportResponse> {
		if response.is_success() {
			Ok(response)
		} else {
			Err(StatusError { status: response.status, body: response.body }.into())
		}
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a new client over the default reqwest transport.
	///
	/// Use [`ApiClient::with_transport`] to bring a custom transport and
	/// [`ApiClient::with_login_redirect`] to wire session-expiry navigation.
	pub fn new(store: Arc<CredentialStore>, config: ClientConfig) -> Self {
		Self::with_transport(store, config, ReqwestTransport::default())
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			login_redirect: self.login_redirect.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("store", &self.store)
			.finish()
	}
}

/// Per-call pipeline state threaded through dispatch.
#[derive(Clone, Debug)]
pub(crate) struct CallContext {
	pub(crate) request: ApiRequest,
	pub(crate) retried: bool,
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::VecDeque;
	// self
	use super::*;
	use crate::{
		auth::TokenPair,
		http::{Method, TransportFuture, TransportRequest},
		store::MemoryBackend,
	};

	#[derive(Debug, ThisError)]
	#[error("Scripted transport ran out of responses.")]
	struct ScriptExhausted;

	/// Serves canned responses in order and records every URL it was asked for.
	struct ScriptedTransport {
		responses: Mutex<VecDeque<TransportResponse>>,
		seen: Mutex<Vec<Url>>,
	}
	impl ScriptedTransport {
		fn new(responses: impl IntoIterator<Item = TransportResponse>) -> Self {
			Self {
				responses: Mutex::new(responses.into_iter().collect()),
				seen: Mutex::new(Vec::new()),
			}
		}

		fn seen(&self) -> Vec<Url> {
			self.seen.lock().clone()
		}
	}
	impl HttpTransport for ScriptedTransport {
		type TransportError = ScriptExhausted;

		fn execute(&self, request: TransportRequest) -> TransportFuture<'_, Self::TransportError> {
			self.seen.lock().push(request.url.clone());

			let next = self.responses.lock().pop_front();

			Box::pin(async move { next.ok_or(ScriptExhausted) })
		}
	}

	fn build_client(
		responses: impl IntoIterator<Item = TransportResponse>,
	) -> (ApiClient<ScriptedTransport>, Arc<ScriptedTransport>, Arc<MemoryBackend>) {
		let transport = Arc::new(ScriptedTransport::new(responses));
		let backend = Arc::new(MemoryBackend::default());
		let store = Arc::new(CredentialStore::new(vec![backend.clone()]));
		let config = crate::config::ClientConfig::builder(
			Url::parse("https://api.example.com").expect("Base URL fixture should parse."),
		)
		.build()
		.expect("Test configuration should validate.");
		let client = ApiClient::with_transport(store, config, transport.clone());

		(client, transport, backend)
	}

	fn response(status: u16, body: &str) -> TransportResponse {
		TransportResponse { status, body: body.as_bytes().to_vec() }
	}

	#[tokio::test]
	async fn success_passes_through_untouched() {
		let (client, transport, _) = build_client([response(200, "ok")]);
		let result = client
			.execute(ApiRequest::get("/events/"))
			.await
			.expect("Successful responses should pass through.");

		assert_eq!(result.status, 200);
		assert_eq!(result.body, b"ok");
		assert_eq!(transport.seen().len(), 1);
	}

	#[tokio::test]
	async fn non_unauthorized_errors_skip_the_refresh_cycle() {
		let (client, transport, _) = build_client([response(500, "boom")]);
		let err = client
			.execute(ApiRequest::get("/events/"))
			.await
			.expect_err("Server errors should surface as status errors.");

		assert_eq!(err.status(), Some(500));
		assert_eq!(transport.seen().len(), 1);
	}

	#[tokio::test]
	async fn unauthorized_without_credentials_passes_through() {
		let (client, transport, _) = build_client([response(401, "expired")]);
		let err = client
			.execute(ApiRequest::get("/events/"))
			.await
			.expect_err("A 401 without a refresh token should surface unchanged.");

		assert_eq!(err.status(), Some(401));
		// No pair in the store, so no refresh call is issued.
		assert_eq!(transport.seen().len(), 1);
	}

	#[tokio::test]
	async fn method_and_query_survive_the_pipeline() {
		let (client, transport, backend) = build_client([response(200, "ok")]);
		let pair = TokenPair::new("a1", "r1").expect("Pair fixture should be valid.");

		client.store.save(&pair).await;

		client
			.execute(ApiRequest::new(Method::Delete, "/events/7/").with_query("cascade", "true"))
			.await
			.expect("The call should succeed.");

		let seen = transport.seen();
		let url = seen.first().expect("The transport should observe one call.");

		assert!(url.as_str().starts_with("https://api.example.com/events/7/"));
		assert!(url.query_pairs().any(|(name, value)| name == "cascade" && value == "true"));
		assert!(url.query_pairs().any(|(name, value)| name == "access_token" && value == "a1"));
		assert!(!backend.snapshot().is_empty());
	}
}
