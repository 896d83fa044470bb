pub use reqwest;
pub use serde;

pub mod common;
pub mod dispatcher;
pub mod http_request;
pub mod http_response;
mod http_client;
