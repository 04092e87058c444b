//! Request/response models and the transport abstraction.
//!
//! The module exposes [`HttpTransport`] so downstream crates can integrate custom HTTP
//! stacks; the client pipeline only ever sees [`TransportRequest`] and
//! [`TransportResponse`]. The reqwest adapter behind the `reqwest` feature is the default
//! transport.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

/// Query parameter carrying the access token on non-exempt requests.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// HTTP methods used by the API surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the method name as it appears on the wire.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// An API call as constructed by the caller: a base-relative path, query parameters, and
/// an optional JSON body.
#[derive(Clone)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute path resolved against the client's base URL.
	pub path: String,
	/// Query parameters; the authenticator merges the access token in here.
	pub query: BTreeMap<String, String>,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
}
impl ApiRequest {
	/// Builds a request with the provided method and path.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), query: BTreeMap::new(), body: None }
	}

	/// Builds a `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Builds a `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Adds a query parameter, replacing any previous value under the same name.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(name.into(), value.into());

		self
	}

	/// Attaches a JSON body.
	pub fn with_json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}
}
impl Debug for ApiRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let query: BTreeMap<&str, &str> = self
			.query
			.iter()
			.map(|(name, value)| {
				(name.as_str(), if name == ACCESS_TOKEN_PARAM { "<redacted>" } else { value.as_str() })
			})
			.collect();

		f.debug_struct("ApiRequest")
			.field("method", &self.method)
			.field("path", &self.path)
			.field("query", &query)
			.field("body_set", &self.body.is_some())
			.finish()
	}
}

/// A fully resolved request handed to the transport.
#[derive(Clone)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL including query parameters.
	pub url: Url,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
}
impl Debug for TransportRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TransportRequest")
			.field("method", &self.method)
			.field("url", &redact_access_token(&self.url))
			.field("body_set", &self.body.is_some())
			.finish()
	}
}

/// Raw response produced by a transport; any HTTP status is a successful transport
/// outcome.
#[derive(Clone, Debug)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Future type returned by [`HttpTransport::execute`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing API calls.
///
/// The trait is the pipeline's only dependency on an HTTP implementation. Transports
/// resolve to [`TransportResponse`] for every HTTP status and reserve their error type for
/// network-level failures, so the 401 handling stays in the pipeline.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes a request to completion.
	fn execute(&self, request: TransportRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Timeouts and redirect policy stay with the underlying client's defaults; this layer
/// adds none of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn execute(&self, request: TransportRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Patch => reqwest::Method::PATCH,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url);

			if let Some(body) = request.body.as_ref() {
				builder = builder.json(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse { status, body })
		})
	}
}

fn redact_access_token(url: &Url) -> String {
	if !url.query_pairs().any(|(name, _)| name == ACCESS_TOKEN_PARAM) {
		return url.to_string();
	}

	let mut redacted = url.clone();
	let pairs: Vec<(String, String)> = url
		.query_pairs()
		.map(|(name, value)| {
			let value =
				if name == ACCESS_TOKEN_PARAM { "<redacted>".to_owned() } else { value.into_owned() };

			(name.into_owned(), value)
		})
		.collect();

	redacted.query_pairs_mut().clear().extend_pairs(pairs).finish();

	redacted.to_string()
}
