use super::common::{ClientError, SERVICE_UNAVAILABLE};
use super::http_client::HTTPClient;
use super::http_request::operation::Operation;
use super::http_request::request_common::{
    HTTPRequestMethod, Params, build_url, encode_query, is_login_resource,
};
use super::http_response::response_common::{RawResponse, Reply};
use crate::config::DispatcherConfig;
use crate::logger;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::Dispatch;

/// Name reported in every [`ClientError`] raised by the dispatcher.
const SOURCE: &str = "RequestDispatcher";
/// Number of re-authentication cycles a single call may go through.
const MAX_REAUTH: u8 = 2;
const UNAUTHORIZED: u16 = 401;

/// Issues ad-hoc REST calls against a single API server.
///
/// The dispatcher owns the session (connection pool plus bearer credential)
/// and funnels every call through [`query`](Self::query). Calls take
/// `&mut self`, so there is never more than one in flight per dispatcher.
///
/// The outcome of the most recent call is kept for introspection, see
/// [`error_msg`](Self::error_msg), [`error_code`](Self::error_code) and
/// [`reply_msg`](Self::reply_msg).
pub struct RequestDispatcher {
    session: HTTPClient,
    /// Subscriber all events are routed to; `None` uses the caller's current one.
    logger: Option<Dispatch>,
    simulation: bool,
    /// Overrides the per-verb request deadline.
    deadline: Option<Duration>,
    last_reply: Option<Reply>,
    last_error: Option<String>,
    last_error_code: Option<u16>,
}

impl RequestDispatcher {
    /// Opens a dispatcher that logs to the console at the configured verbosity.
    pub fn new(config: &DispatcherConfig) -> Result<Self, ClientError> {
        Self::with_logger(config, logger::console(config.verbose()))
    }

    /// Opens a dispatcher that reports to the given subscriber.
    pub fn with_logger(config: &DispatcherConfig, logger: Dispatch) -> Result<Self, ClientError> {
        Self::open(config, Some(logger), &config.base_url())
    }

    /// Opens a dispatcher whose events go to whatever subscriber is current
    /// where a call runs, for hosts that already set up `tracing` themselves.
    pub fn with_current_subscriber(config: &DispatcherConfig) -> Result<Self, ClientError> {
        Self::open(config, None, &config.base_url())
    }

    /// Points the dispatcher at an arbitrary base URL, e.g. a plain HTTP mock server.
    #[cfg(test)]
    pub(crate) fn with_base_url(
        config: &DispatcherConfig,
        logger: Option<Dispatch>,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        Self::open(config, logger, base_url)
    }

    #[cfg(test)]
    pub(crate) fn set_deadline(&mut self, deadline: Duration) { self.deadline = Some(deadline); }

    fn open(
        config: &DispatcherConfig,
        logger: Option<Dispatch>,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        let session = HTTPClient::new(base_url, config.api_token(), config.ssl_check())?;
        let dispatcher = Self {
            session,
            logger,
            simulation: config.simulation(),
            deadline: None,
            last_reply: None,
            last_error: None,
            last_error_code: None,
        };
        dispatcher.emit(|| tracing::debug!("{SOURCE} ready for {base_url}"));
        Ok(dispatcher)
    }

    /// Performs a single logical call.
    ///
    /// `method` is trimmed and lower-cased; anything that is not one of
    /// `get`, `post`, `put`, `patch` or `delete` is treated as `get`.
    /// For `get`/`delete` the `params` are appended as query string, for the
    /// other verbs they become the JSON payload unless `payload` is given.
    ///
    /// A `401` answer triggers up to two re-authentication cycles unless the
    /// resource is a login endpoint. Any non-2xx outcome is an error.
    pub async fn query(
        &mut self,
        resource: &str,
        method: &str,
        payload: Option<Value>,
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.dispatch(HTTPRequestMethod::from_name(method), resource, payload, params)
            .await
    }

    /// Runs a named operation, the operation's segments followed by `segments`
    /// forming the resource path.
    pub async fn call<S: AsRef<str>>(
        &mut self,
        operation: &Operation,
        segments: &[S],
        payload: Option<Value>,
        params: Params,
    ) -> Result<Reply, ClientError> {
        let resource = operation.resource(segments);
        self.dispatch(operation.method(), &resource, payload, params).await
    }

    /// Looks up an operation like `get_devices`; `None` if the verb is unknown.
    pub fn resolve(name: &str) -> Option<Operation> { Operation::parse(name) }

    pub async fn get<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.call(&Operation::new(HTTPRequestMethod::Get), segments, None, params).await
    }

    pub async fn delete<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.call(&Operation::new(HTTPRequestMethod::Delete), segments, None, params).await
    }

    pub async fn post<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        payload: Option<Value>,
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.call(&Operation::new(HTTPRequestMethod::Post), segments, payload, params).await
    }

    pub async fn put<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        payload: Option<Value>,
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.call(&Operation::new(HTTPRequestMethod::Put), segments, payload, params).await
    }

    pub async fn patch<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        payload: Option<Value>,
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.call(&Operation::new(HTTPRequestMethod::Patch), segments, payload, params).await
    }

    /// Runs `operation` and returns the elapsed wall-clock time in seconds.
    pub async fn timeit<S: AsRef<str>>(
        &mut self,
        operation: &Operation,
        segments: &[S],
        payload: Option<Value>,
        params: Params,
    ) -> Result<f64, ClientError> {
        let tic = Instant::now();
        let reply = self.call(operation, segments, payload, params).await?;
        self.emit(|| tracing::debug!("{reply:?}"));
        Ok(tic.elapsed().as_secs_f64())
    }

    /// Message of the last failed call, reset at the start of every call.
    pub fn error_msg(&self) -> Option<&str> { self.last_error.as_deref() }
    pub fn error_code(&self) -> Option<u16> { self.last_error_code }
    /// The last successful reply.
    pub fn reply_msg(&self) -> Option<&Reply> { self.last_reply.as_ref() }
    pub fn base_url(&self) -> &str { self.session.url() }
    pub fn is_closed(&self) -> bool { self.session.is_closed() }

    /// Re-attaches the bearer credential, reopening a closed session.
    pub fn login(&mut self) -> Result<(), ClientError> { self.session.login() }

    /// Closes all pooled connections. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.session.is_closed() {
            self.emit(|| tracing::debug!("Closing session"));
            self.session.close();
        }
    }

    async fn dispatch(
        &mut self,
        method: HTTPRequestMethod,
        resource: &str,
        payload: Option<Value>,
        params: Params,
    ) -> Result<Reply, ClientError> {
        self.last_error = None;
        self.last_error_code = None;

        let mut resource = resource.trim().to_string();
        let mut payload = payload;
        if !params.is_empty() {
            if !method.carries_body() {
                let query = encode_query(&params);
                self.emit(|| tracing::debug!("Query: {query}"));
                resource = format!("{resource}?{query}");
            } else if payload.as_ref().is_none_or(is_blank) {
                payload = Some(Value::Object(params));
            }
        }

        let url = build_url(self.session.url(), &resource);
        self.emit(|| tracing::info!("Final URL: {url}, Method: {method}"));
        if let Some(body) = &payload {
            self.emit(|| tracing::debug!("Payload: {body}"));
        }

        if self.simulation {
            let reply = Reply::simulated(payload.unwrap_or(Value::Null));
            self.last_reply = Some(reply.clone());
            return Ok(reply);
        }

        let mut reauth = 0;
        let response = loop {
            let response = self.send(method, &url, payload.as_ref()).await?;
            if response.status == UNAUTHORIZED && reauth < MAX_REAUTH && !is_login_resource(&resource) {
                reauth += 1;
                self.emit(|| tracing::debug!("Attempting Re-Auth: {reauth} attempt"));
                self.session.login().map_err(|e| self.record(e))?;
                continue;
            }
            break response;
        };
        self.parse_response(response)
    }

    /// One round trip. Transport failures are never retried.
    async fn send(
        &mut self,
        method: HTTPRequestMethod,
        url: &str,
        payload: Option<&Value>,
    ) -> Result<RawResponse, ClientError> {
        let Some(mut request) = self.session.request(method.to_reqwest(), url) else {
            return Err(self.record(ClientError::new(SOURCE, SERVICE_UNAVAILABLE, "session closed")));
        };
        request = request.timeout(self.deadline.unwrap_or_else(|| method.read_timeout()));
        if let (true, Some(body)) = (method.carries_body(), payload) {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = ClientError::from_transport(SOURCE, &e, url);
                self.emit(|| tracing::error!("{err}"));
                return Err(self.record(err));
            }
        };
        RawResponse::read(SOURCE, response, url).await.map_err(|e| self.record(e))
    }

    fn parse_response(&mut self, response: RawResponse) -> Result<Reply, ClientError> {
        if response.is_success() {
            let reply = response.into_reply(SOURCE).map_err(|e| self.record(e))?;
            self.last_reply = Some(reply.clone());
            Ok(reply)
        } else {
            self.emit(|| tracing::debug!("Response is not good, parsing error..."));
            Err(self.record(ClientError::new(SOURCE, response.status, response.text)))
        }
    }

    /// Runs `event` with the injected subscriber as the default, if there is one.
    fn emit(&self, event: impl FnOnce()) {
        match &self.logger {
            Some(logger) => tracing::dispatcher::with_default(logger, event),
            None => event(),
        }
    }

    /// Stores `err` as the last error and hands it back.
    fn record(&mut self, err: ClientError) -> ClientError {
        self.last_error = Some(err.message().to_string());
        self.last_error_code = Some(err.code());
        err
    }
}

impl Drop for RequestDispatcher {
    fn drop(&mut self) { self.session.close(); }
}

/// Payloads that yield to keyword parameters: `null`, `""`, `[]` and `{}`.
fn is_blank(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
