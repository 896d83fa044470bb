use std::fmt;

/// Status used when a failure carries no HTTP status of its own.
pub const SERVICE_UNAVAILABLE: u16 = 503;

/// The single failure type of the dispatcher.
///
/// Every failed call, be it a refused connection, a timeout or a non-2xx
/// response, ends up as a `ClientError` carrying the name of the failing
/// component, an HTTP-like status code and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    source: &'static str,
    code: u16,
    message: String,
}

impl ClientError {
    pub fn new(source: &'static str, code: u16, message: impl Into<String>) -> Self {
        Self { source, code, message: message.into() }
    }

    /// Maps a transport level failure: the upstream status if the error has one, else 503.
    pub(crate) fn from_transport(source: &'static str, err: &reqwest::Error, url: &str) -> Self {
        let code = err.status().map_or(SERVICE_UNAVAILABLE, |status| status.as_u16());
        Self::new(source, code, format!("HTTP Server Error: {err} - {url}"))
    }

    /// Name of the component that raised the error.
    pub fn source_name(&self) -> &'static str { self.source }
    pub fn code(&self) -> u16 { self.code }
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error {}: {}", self.source, self.code, self.message)
    }
}

impl std::error::Error for ClientError {}
