use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::JsonRpcVersion;

/// A JSON-RPC notification as written by a client (request without an id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: String, params: Option<Value>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
        }
    }

    /// Create a new notification with no parameters
    pub fn new_no_params(method: String) -> Self {
        Self::new(method, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::decode_request;
    use serde_json::{json, to_string, to_vec};

    #[test]
    fn test_notification_json_format() {
        let notification = JsonRpcNotification::new_no_params("ping".to_string());
        let json_str = to_string(&notification).unwrap();

        assert!(!json_str.contains("\"id\""));
        assert!(!json_str.contains("\"params\""));
        assert!(json_str.contains("\"jsonrpc\":\"2.0\""));
        assert!(json_str.contains("\"method\":\"ping\""));
    }

    #[test]
    fn test_notification_decodes_without_reply() {
        let notification =
            JsonRpcNotification::new("log".to_string(), Some(json!({"level": "info"})));
        let decoded = decode_request(&to_vec(&notification).unwrap(), None).unwrap();

        let record = &decoded.records[0];
        assert!(record.is_valid());
        assert!(record.is_notification());
        assert_eq!(record.params.get("level"), Some(&json!("info")));
    }
}
