use super::common::ClientError;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;

/// Connect timeout applied to every request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound of idle pooled connections kept per host.
const POOL_MAX_SIZE: usize = 10;

/// A thin wrapper around `reqwest::Client` acting as the dispatcher's session.
///
/// The session owns the connection pool and the bearer credential attachment.
/// Closing it drops the pool and with it all open connections.
#[derive(Debug)]
pub(crate) struct HTTPClient {
    /// The pooled client, `None` once the session has been closed.
    client: Option<reqwest::Client>,
    /// `Bearer <token>`, attached to every outgoing request once logged in.
    auth: Option<HeaderValue>,
    /// Base URL for the API, prepended to all resource paths.
    base_url: String,
    token: String,
    ssl_check: bool,
}

impl HTTPClient {
    /// Opens a new session against `base_url` and attaches the credential.
    ///
    /// Certificate validation is only performed if `ssl_check` is set.
    pub(crate) fn new(
        base_url: &str,
        token: &str,
        ssl_check: bool,
    ) -> Result<HTTPClient, ClientError> {
        let mut session = HTTPClient {
            client: None,
            auth: None,
            base_url: String::from(base_url),
            token: String::from(token),
            ssl_check,
        };
        session.login()?;
        Ok(session)
    }

    /// Only `Accept` is a session default; `Content-Type` comes with a JSON body.
    fn build_client(ssl_check: bool) -> Result<reqwest::Client, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(POOL_MAX_SIZE)
            .danger_accept_invalid_certs(!ssl_check)
            .build()
            .map_err(|e| ClientError::new("HTTPClient", 500, format!("cannot build session: {e}")))
    }

    /// (Re-)attaches the bearer credential, reopening the session if it was closed.
    pub(crate) fn login(&mut self) -> Result<(), ClientError> {
        if self.client.is_none() {
            self.client = Some(Self::build_client(self.ssl_check)?);
        }
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ClientError::new("HTTPClient", 500, "api token is not a valid header value"))?;
        value.set_sensitive(true);
        self.auth = Some(value);
        Ok(())
    }

    /// Starts a request with the credential already attached.
    ///
    /// Returns `None` if the session has been closed.
    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> Option<reqwest::RequestBuilder> {
        let client = self.client.as_ref()?;
        let builder = client.request(method, url);
        Some(match &self.auth {
            Some(auth) => builder.header(reqwest::header::AUTHORIZATION, auth.clone()),
            None => builder,
        })
    }

    /// Drops the connection pool. Calling this twice is a no-op.
    pub(crate) fn close(&mut self) {
        self.client = None;
        self.auth = None;
    }

    pub(crate) fn is_closed(&self) -> bool { self.client.is_none() }
    /// Returns the base URL that the client was initialized with.
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }
}
