//! Token refresh recovery for the retry-once-on-401 protocol.
//!
//! When a protected call answers 401, the pipeline asks this module to renew the pair:
//! load the stored credentials, issue the dedicated unauthenticated refresh call, persist
//! the renewed pair (keeping the old refresh token when the server does not rotate), and
//! hand the new access token back for the single retry. A failed refresh terminates the
//! session instead: credentials are purged and the login redirect fires, while the caller
//! still sees the original 401.
//!
//! Concurrent 401s refresh independently; the client deliberately does not coalesce
//! in-flight refreshes, so the server must treat the refresh call as idempotent.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::TokenPair,
	client::ApiClient,
	error::{ConfigError, StatusError, TransportError},
	http::{HttpTransport, Method, TransportRequest},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Result of a single refresh recovery attempt.
#[derive(Debug)]
pub(crate) enum RefreshOutcome {
	/// A renewed pair was persisted; retry with its access token.
	Refreshed(TokenPair),
	/// No stored pair to refresh with; the original 401 stands as-is.
	NoRefreshToken,
	/// The refresh call failed; purge credentials and end the session.
	Failed,
}

#[derive(Debug, ThisError)]
enum RefreshCallError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error(transparent)]
	Endpoint(#[from] StatusError),
	#[error("Refresh endpoint returned malformed JSON.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
	#[error("Refresh endpoint returned an empty token.")]
	EmptyToken,
}

#[derive(Debug, Deserialize)]
struct RefreshResponseBody {
	access: String,
	// Refresh-token rotation is optional server-side.
	refresh: Option<String>,
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Attempts one refresh cycle on behalf of a 401'd request.
	pub(crate) async fn recover_unauthorized(&self) -> RefreshOutcome {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "recover_unauthorized");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let outcome = span.instrument(self.refresh_once()).await;

		match &outcome {
			RefreshOutcome::Refreshed(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			_ => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		outcome
	}

	async fn refresh_once(&self) -> RefreshOutcome {
		self.refresh_metrics.record_attempt();

		let Some(current) = self.store.load().await else {
			self.refresh_metrics.record_failure();

			return RefreshOutcome::NoRefreshToken;
		};
		let renewed = match self.call_refresh_endpoint(current.refresh.expose()).await {
			Ok(body) => body,
			Err(e) => {
				note_refresh_failure(&e);
				self.refresh_metrics.record_failure();

				return RefreshOutcome::Failed;
			},
		};
		// Keep the previous refresh token when the server does not rotate it.
		let refresh = renewed.refresh.unwrap_or_else(|| current.refresh.expose().to_owned());
		let pair = match TokenPair::new(renewed.access, refresh) {
			Ok(pair) => pair,
			Err(_) => {
				note_refresh_failure(&RefreshCallError::EmptyToken);
				self.refresh_metrics.record_failure();

				return RefreshOutcome::Failed;
			},
		};

		self.store.save(&pair).await;
		self.refresh_metrics.record_success();

		RefreshOutcome::Refreshed(pair)
	}

	async fn call_refresh_endpoint(
		&self,
		refresh: &str,
	) -> Result<RefreshResponseBody, RefreshCallError> {
		let request = TransportRequest {
			method: Method::Post,
			url: self.config.refresh_url()?,
			body: Some(serde_json::json!({ "refresh": refresh })),
		};
		let response =
			self.transport.execute(request).await.map_err(TransportError::network)?;

		if !response.is_success() {
			return Err(StatusError { status: response.status, body: response.body }.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

		Ok(serde_path_to_error::deserialize(&mut deserializer)?)
	}
}

fn note_refresh_failure(err: &RefreshCallError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(error = %err, "Token refresh failed; ending the session.");

	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}
