use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use strum_macros::{Display, EnumString};

/// Keyword parameters of a call: query parameters for `GET`/`DELETE`,
/// payload fields for `POST`/`PUT`/`PATCH`.
pub type Params = serde_json::Map<String, Value>;

/// Characters left untouched when encoding query keys and values.
const QUERY_ENCODE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-').remove(b'~').remove(b'/');

const GET_READ_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// The five HTTP verbs the dispatcher understands.
#[derive(Debug, Display, EnumString, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum HTTPRequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HTTPRequestMethod {
    /// Lenient parse: the name is trimmed and lower-cased first.
    pub fn parse(name: &str) -> Option<Self> {
        Self::from_str(name.trim().to_lowercase().as_str()).ok()
    }

    /// Like [`parse`](Self::parse), but unknown verbs fall back to `GET`.
    pub fn from_name(name: &str) -> Self { Self::parse(name).unwrap_or(HTTPRequestMethod::Get) }

    /// Whether keyword parameters of this verb go into a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, HTTPRequestMethod::Post | HTTPRequestMethod::Put | HTTPRequestMethod::Patch)
    }

    /// Deadline for the whole exchange, from sending the request until the
    /// body has been read: 120 s for `GET`, 30 s otherwise. A response that
    /// is still streaming when it expires fails as a timeout.
    pub(crate) fn read_timeout(self) -> Duration {
        match self {
            HTTPRequestMethod::Get => GET_READ_TIMEOUT,
            _ => DEFAULT_READ_TIMEOUT,
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            HTTPRequestMethod::Get => reqwest::Method::GET,
            HTTPRequestMethod::Post => reqwest::Method::POST,
            HTTPRequestMethod::Put => reqwest::Method::PUT,
            HTTPRequestMethod::Delete => reqwest::Method::DELETE,
            HTTPRequestMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

/// Joins the non-empty path segments with `/`.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Renders the parameters as `key=value&...` with both sides percent-encoded.
///
/// Strings are used as-is, every other JSON value in its JSON text form.
pub fn encode_query(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(&raw, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends `resource` to `base_url`.
///
/// A single leading `/` of the resource is dropped, a resource that is only
/// a query string (`?a=1`) is appended without separator and an empty
/// resource yields the base URL itself.
pub fn build_url(base_url: &str, resource: &str) -> String {
    let resource = resource.trim();
    let resource = resource.strip_prefix('/').unwrap_or(resource);
    if resource.is_empty() {
        base_url.to_string()
    } else if resource.starts_with('?') {
        format!("{base_url}{resource}")
    } else {
        format!("{base_url}/{resource}")
    }
}

/// Whether the last path segment names a login endpoint, which must never
/// trigger a re-authentication.
pub(crate) fn is_login_resource(resource: &str) -> bool {
    resource.rsplit('/').next().is_some_and(|last| last.contains("login"))
}
