//! Session-expiry navigation hook.

// self
use crate::_prelude::*;

/// Receives the login URL when an unrecoverable auth failure ends the session.
///
/// The crate cannot navigate anywhere itself; hosts implement this over whatever owns the
/// screen (a webview bridge, a TUI router, a desktop shell) and inject it via
/// [`ApiClient::with_login_redirect`](crate::client::ApiClient::with_login_redirect).
pub trait LoginRedirect
where
	Self: Send + Sync,
{
	/// Called after credentials have been purged.
	fn redirect_to_login(&self, login_url: &Url);
}

/// Default hook that only records the event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRedirect;
impl LoginRedirect for NullRedirect {
	fn redirect_to_login(&self, login_url: &Url) {
		#[cfg(feature = "tracing")]
		tracing::info!(%login_url, "Session expired; login redirect requested.");

		#[cfg(not(feature = "tracing"))]
		{
			let _ = login_url;
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn null_redirect_is_a_noop() {
		let url = Url::parse("https://app.example.com/login").expect("URL fixture should parse.");

		NullRedirect.redirect_to_login(&url);
	}
}
