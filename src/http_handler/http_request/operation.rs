use super::request_common::{HTTPRequestMethod, join_path};
use std::str::FromStr;

/// A named call of the shape `<verb>[_<segment>...]`, e.g. `get_devices_4`.
///
/// The verb picks the HTTP method, the remaining underscore separated tokens
/// form the leading part of the resource path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    method: HTTPRequestMethod,
    segments: Vec<String>,
}

impl Operation {
    pub fn new(method: HTTPRequestMethod) -> Self { Self { method, segments: Vec::new() } }

    /// Resolves an operation name, `None` if its verb prefix is not one of
    /// the lower-case verbs `get`, `post`, `put`, `patch` or `delete`.
    pub fn parse(name: &str) -> Option<Self> {
        let mut tokens = name.split('_');
        let method = HTTPRequestMethod::from_str(tokens.next()?).ok()?;
        let segments = tokens.filter(|t| !t.is_empty()).map(String::from).collect();
        Some(Self { method, segments })
    }

    pub fn method(&self) -> HTTPRequestMethod { self.method }
    pub fn segments(&self) -> &[String] { &self.segments }

    /// The resource path of this operation extended by `extra` segments.
    pub fn resource<S: AsRef<str>>(&self, extra: &[S]) -> String {
        let mut all: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        all.extend(extra.iter().map(AsRef::as_ref));
        join_path(&all)
    }
}
