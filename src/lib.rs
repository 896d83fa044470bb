//! Bearer-token HTTPS REST client offering one uniform call interface for
//! arbitrary resource paths of a single API server.
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod http_handler;
pub mod logger;

pub use config::{ConfigError, DispatcherConfig};
pub use http_handler::common::ClientError;
pub use http_handler::dispatcher::RequestDispatcher;
pub use http_handler::http_request::operation::Operation;
pub use http_handler::http_request::request_common::{HTTPRequestMethod, Params};
pub use http_handler::http_response::response_common::Reply;
