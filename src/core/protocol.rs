//! Telemetry feed protocol types
//!
//! JSON messages pushed by the telemetry server, and the subscription URL the
//! client connects to. Platform-independent and tested without a socket.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error surfaced when a text frame is not a valid feed message
pub const PARSE_ERROR_MESSAGE: &str = "Failed to parse WebSocket message";

/// Error surfaced when the transport fails
pub const TRANSPORT_ERROR_MESSAGE: &str = "WebSocket error occurred";

// =============================================================================
// SERVER MESSAGES (server → client)
// =============================================================================

/// Raw message envelope
///
/// ```json
/// { "success": true, "data": [["realtime.gear", 3]] }
/// { "success": true, "data": { "realtime.gear": 3 } }
/// { "success": false, "errorMessage": "unknown field" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMessage {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// What the client does with one decoded message
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Key/value pairs to merge, in wire order
    Batch(Vec<(String, Value)>),
    /// Server-reported error
    ServerError(String),
    /// Neither data nor error; logged and dropped
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl FeedMessage {
    /// Classify the envelope
    pub fn into_inbound(self) -> Result<Inbound, DecodeError> {
        match (self.success, self.data) {
            (true, Some(data)) if !data.is_null() => Ok(Inbound::Batch(batch_pairs(data)?)),
            _ => match self.error_message {
                Some(message) if !message.is_empty() => Ok(Inbound::ServerError(message)),
                _ => Ok(Inbound::Ignored),
            },
        }
    }
}

/// Decode one text frame
pub fn decode(text: &str) -> Result<Inbound, DecodeError> {
    let message: FeedMessage =
        serde_json::from_str(text).map_err(|e| DecodeError(e.to_string()))?;
    message.into_inbound()
}

/// Normalize `data` to pairs: either `[[key, value], ...]` or `{key: value}`
fn batch_pairs(data: Value) -> Result<Vec<(String, Value)>, DecodeError> {
    match data {
        Value::Array(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                Value::Array(mut pair) if pair.len() == 2 => {
                    let value = pair.pop().unwrap_or(Value::Null);
                    match pair.pop() {
                        Some(Value::String(key)) => Ok((key, value)),
                        _ => Err(DecodeError("pair key is not a string".to_string())),
                    }
                }
                other => Err(DecodeError(format!("malformed pair: {}", other))),
            })
            .collect(),
        Value::Object(map) => Ok(map.into_iter().collect()),
        // Scalars carry no keys
        _ => Ok(Vec::new()),
    }
}

// =============================================================================
// SUBSCRIPTION URL
// =============================================================================

/// `<base>?preview=<bool>&q=<k1,k2,...>`
///
/// Brackets in array keys are percent-encoded so the URI stays valid for the
/// HTTP upgrade request.
pub fn subscription_url(base: &str, preview: bool, keys: &[String]) -> String {
    let query = keys
        .iter()
        .map(|k| k.replace('[', "%5B").replace(']', "%5D"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}?preview={}&q={}", base, preview, query)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -------------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------------

    #[test]
    fn test_decode_pair_batch() {
        let inbound =
            decode(r#"{"success":true,"data":[["realtime.throttle",0.5],["realtime.brake",0]]}"#)
                .unwrap();
        assert_eq!(
            inbound,
            Inbound::Batch(vec![
                ("realtime.throttle".to_string(), json!(0.5)),
                ("realtime.brake".to_string(), json!(0)),
            ])
        );
    }

    #[test]
    fn test_decode_object_batch() {
        let inbound = decode(r#"{"success":true,"data":{"realtime.gear":3}}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Batch(vec![("realtime.gear".to_string(), json!(3))])
        );
    }

    #[test]
    fn test_decode_array_values_inside_pairs() {
        let inbound =
            decode(r#"{"success":true,"data":[["drivers[].position",[1,2,3]]]}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::Batch(vec![("drivers[].position".to_string(), json!([1, 2, 3]))])
        );
    }

    #[test]
    fn test_decode_server_error() {
        let inbound =
            decode(r#"{"success":false,"errorMessage":"Unknown field realtime.foo"}"#).unwrap();
        assert_eq!(
            inbound,
            Inbound::ServerError("Unknown field realtime.foo".to_string())
        );
    }

    #[test]
    fn test_decode_ignored_messages() {
        assert_eq!(decode(r#"{"success":true}"#).unwrap(), Inbound::Ignored);
        assert_eq!(decode(r#"{"success":true,"data":null}"#).unwrap(), Inbound::Ignored);
        assert_eq!(decode(r#"{"hello":"world"}"#).unwrap(), Inbound::Ignored);
    }

    #[test]
    fn test_decode_scalar_data_is_empty_batch() {
        assert_eq!(
            decode(r#"{"success":true,"data":42}"#).unwrap(),
            Inbound::Batch(Vec::new())
        );
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(decode("not json").is_err());
        assert!(decode(r#"{"success":"yes"}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_malformed_pairs() {
        assert!(decode(r#"{"success":true,"data":[["only-key"]]}"#).is_err());
        assert!(decode(r#"{"success":true,"data":[[1,2]]}"#).is_err());
    }

    // -------------------------------------------------------------------------
    // Subscription URL
    // -------------------------------------------------------------------------

    #[test]
    fn test_subscription_url() {
        let keys = vec!["realtime.throttle".to_string(), "realtime.gear".to_string()];
        assert_eq!(
            subscription_url("ws://localhost:42049", false, &keys),
            "ws://localhost:42049?preview=false&q=realtime.throttle,realtime.gear"
        );
    }

    #[test]
    fn test_subscription_url_encodes_brackets() {
        let keys = vec!["drivers[].position".to_string()];
        assert_eq!(
            subscription_url("ws://localhost:42049", true, &keys),
            "ws://localhost:42049?preview=true&q=drivers%5B%5D.position"
        );
    }
}
