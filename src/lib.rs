//! Authenticated HTTP API client with automatic token refresh and layered credential
//! persistence - query-parameter auth, retry-once-on-401, and durable/session/cookie
//! token stores in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ApiClient, LoginRedirect},
		config::ClientConfig,
		http::ReqwestTransport,
		store::{CookieBackend, CredentialBackend, CredentialStore, MemoryBackend, MemoryCookieJar},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// In-memory stand-ins for the three persistence layers, plus the captured redirects.
	pub struct TestHarness {
		/// Durable-layer stand-in.
		pub durable: Arc<MemoryBackend>,
		/// Session-layer stand-in.
		pub session: Arc<MemoryBackend>,
		/// Cookie jar backing the cookie layer.
		pub jar: Arc<MemoryCookieJar>,
		/// Login redirects observed during the test.
		pub redirects: Arc<RecordingRedirect>,
	}

	/// [`LoginRedirect`] implementation that records every redirect target.
	#[derive(Debug, Default)]
	pub struct RecordingRedirect(Mutex<Vec<Url>>);
	impl RecordingRedirect {
		/// Returns the redirect targets captured so far.
		pub fn captured(&self) -> Vec<Url> {
			self.0.lock().clone()
		}
	}
	impl LoginRedirect for RecordingRedirect {
		fn redirect_to_login(&self, login_url: &Url) {
			self.0.lock().push(login_url.clone());
		}
	}

	/// Constructs an [`ApiClient`] over three in-memory backends, the reqwest transport used
	/// across integration tests, and a recording login-redirect hook.
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestTestClient, TestHarness) {
		let config =
			ClientConfig::builder(Url::parse(base_url).expect("Failed to parse test base URL."))
				.build()
				.expect("Failed to build test client configuration.");
		let durable = Arc::new(MemoryBackend::default());
		let session = Arc::new(MemoryBackend::default());
		let jar = Arc::new(MemoryCookieJar::default());
		let cookie = Arc::new(CookieBackend::new(jar.clone(), config.cookie_attributes()));
		let backends: Vec<Arc<dyn CredentialBackend>> =
			vec![durable.clone(), session.clone(), cookie];
		let store = Arc::new(CredentialStore::new(backends));
		let redirects = Arc::new(RecordingRedirect::default());
		let client = ApiClient::new(store, config).with_login_redirect(redirects.clone());

		(client, TestHarness { durable, session, jar, redirects })
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {authed_client as _, color_eyre as _, httpmock as _};
