use crate::http_handler::common::ClientError;
use serde_json::Value;

/// Outcome of a successful call.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct Reply {
    status_code: u16,
    /// Decoded JSON body, `null` for an empty body.
    data: Value,
    /// Only set on simulated replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ok: Option<u8>,
}

impl Reply {
    pub fn new(status_code: u16, data: Value) -> Self { Self { status_code, data, ok: None } }

    /// The synthetic echo reply returned in simulation mode.
    pub fn simulated(payload: Value) -> Self { Self { status_code: 200, data: payload, ok: Some(1) } }

    pub fn status_code(&self) -> u16 { self.status_code }
    pub fn data(&self) -> &Value { &self.data }
    pub fn into_data(self) -> Value { self.data }
    pub fn is_simulated(&self) -> bool { self.ok.is_some() }
}

/// A response pulled off the wire: status and raw body text.
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub(crate) status: u16,
    pub(crate) text: String,
}

impl RawResponse {
    pub(crate) async fn read(
        source: &'static str,
        response: reqwest::Response,
        url: &str,
    ) -> Result<Self, ClientError> {
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ClientError::from_transport(source, &e, url))?;
        Ok(Self { status, text })
    }

    pub(crate) fn is_success(&self) -> bool { (200..=299).contains(&self.status) }

    /// Decodes a successful response into a [`Reply`].
    pub(crate) fn into_reply(self, source: &'static str) -> Result<Reply, ClientError> {
        if self.text.trim().is_empty() {
            return Ok(Reply::new(self.status, Value::Null));
        }
        serde_json::from_str(&self.text)
            .map(|data| Reply::new(self.status, data))
            .map_err(|e| ClientError::new(source, self.status, format!("invalid JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{RawResponse, Reply};
    use serde_json::json;

    #[test]
    fn test_reply_decoding() {
        let ok = RawResponse { status: 200, text: r#"{"id": 1}"#.to_string() };
        assert!(ok.is_success());
        assert_eq!(ok.into_reply("test").unwrap(), Reply::new(200, json!({"id": 1})));

        let empty = RawResponse { status: 204, text: String::new() };
        assert_eq!(empty.into_reply("test").unwrap().data(), &serde_json::Value::Null);

        let broken = RawResponse { status: 200, text: "nope".to_string() };
        let err = broken.into_reply("test").unwrap_err();
        assert_eq!(err.code(), 200);
        assert_eq!(err.source_name(), "test");
    }

    #[test]
    fn test_status_range() {
        assert!(RawResponse { status: 299, text: String::new() }.is_success());
        assert!(!RawResponse { status: 300, text: String::new() }.is_success());
        assert!(!RawResponse { status: 199, text: String::new() }.is_success());
    }

    #[test]
    fn test_simulated_reply_shape() {
        let reply = Reply::simulated(json!({"k": "v"}));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"status_code": 200, "data": {"k": "v"}, "ok": 1})
        );
        let plain = Reply::new(200, json!(null));
        assert_eq!(serde_json::to_value(plain).unwrap(), json!({"status_code": 200, "data": null}));
    }
}
