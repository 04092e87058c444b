//! Client-level error types shared across the pipeline, stores, and transports.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The server answered with a non-success HTTP status.
	#[error(transparent)]
	Status(#[from] StatusError),
}
impl Error {
	/// Returns the HTTP status carried by this error, if it is a status error.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status(inner) => Some(inner.status),
			_ => None,
		}
	}
}

/// Non-success HTTP response surfaced to the caller.
///
/// After a failed refresh cycle this carries the *original* 401 response, never the
/// refresh call's own failure.
#[derive(Debug, ThisError)]
#[error("API call failed with HTTP status {status}.")]
pub struct StatusError {
	/// HTTP status code returned by the server.
	pub status: u16,
	/// Raw response body for caller-side inspection.
	pub body: Vec<u8>,
}
impl StatusError {
	/// Lossy UTF-8 view of the response body.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL must use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Offending base URL.
		url: String,
	},
	/// Base URL is missing a host component.
	#[error("Base URL is missing a host: {url}.")]
	MissingHost {
		/// Offending base URL.
		url: String,
	},
	/// Endpoint paths must be absolute.
	#[error("The {kind} path must start with `/`: {path}.")]
	RelativePath {
		/// Which configured path failed validation.
		kind: &'static str,
		/// Offending path value.
		path: String,
	},
	/// A request path could not be joined onto the base URL.
	#[error("Request path cannot be resolved against the base URL: {path}.")]
	UnresolvablePath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
