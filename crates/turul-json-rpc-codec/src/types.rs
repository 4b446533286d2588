use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Identifier correlating a JSON-RPC request with its response.
///
/// Only unsigned integers and strings are accepted on the wire. A request
/// without an id is a notification and is modelled as `Option::<RequestId>::None`,
/// which keeps it distinct from a present id of `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(u64),
    String(String),
}

impl RequestId {
    /// Interpret a raw `id` member. Returns `None` for values that cannot
    /// be echoed back faithfully (negative or fractional numbers, arrays,
    /// objects, booleans).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(RequestId::Number),
            Value::String(s) => Some(RequestId::String(s.clone())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            RequestId::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Only the exact string `"2.0"` is accepted
impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Cow::<'de, str>::deserialize(deserializer)?;
        if raw == crate::JSONRPC_VERSION {
            Ok(JsonRpcVersion::V2_0)
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Str(&raw),
                &"JSON-RPC version \"2.0\"",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id_serialization() {
        let id_str = RequestId::String("test".to_string());
        let id_num = RequestId::Number(42);

        assert_eq!(serde_json::to_string(&id_str).unwrap(), r#""test""#);
        assert_eq!(serde_json::to_string(&id_num).unwrap(), "42");
    }

    #[test]
    fn test_request_id_from_value() {
        assert_eq!(RequestId::from_value(&json!(0)), Some(RequestId::Number(0)));
        assert_eq!(
            RequestId::from_value(&json!("abc")),
            Some(RequestId::String("abc".to_string()))
        );
        assert_eq!(RequestId::from_value(&json!(-1)), None);
        assert_eq!(RequestId::from_value(&json!(1.5)), None);
        assert_eq!(RequestId::from_value(&json!({"id": 1})), None);
    }

    #[test]
    fn test_string_and_number_ids_differ() {
        assert_ne!(RequestId::Number(1), RequestId::String("1".to_string()));
    }

    #[test]
    fn test_json_rpc_version() {
        let version = JsonRpcVersion::V2_0;
        assert_eq!(version.as_str(), "2.0");
        assert_eq!(serde_json::to_string(&version).unwrap(), r#""2.0""#);
        assert!(serde_json::from_str::<JsonRpcVersion>(r#""1.0""#).is_err());
    }
}
