use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{CodecError, JsonRpcErrorObject};
use crate::types::{JsonRpcVersion, RequestId};

/// A JSON-RPC response envelope.
///
/// Exactly one of `result` and `error` is set; the constructors are the only
/// way to build one. `id` serializes as `null` when the request id could not
/// be determined (parse errors, non-object batch items).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    version: JsonRpcVersion,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcErrorObject>,
    id: Option<RequestId>,
}

/// Keeps `"result": null` distinguishable from a missing `result`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result: Some(result),
            error: None,
            id: Some(id),
        }
    }

    /// Success for a void method (`"result": null`)
    pub fn null(id: RequestId) -> Self {
        Self::success(id, Value::Null)
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn parse_error(err: &CodecError) -> Self {
        Self::error(None, err.to_error_object())
    }

    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        self.error.as_ref()
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The result value, or the error object when the call failed.
    /// `Ok(None)` means the envelope carried neither.
    pub fn into_outcome(self) -> Result<Option<Value>, JsonRpcErrorObject> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

/// What to write back for one inbound payload
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Reply to a single request object
    Single(JsonRpcResponse),
    /// Reply to a batch; notifications have already been left out
    Batch(Vec<JsonRpcResponse>),
    /// Nothing to write (a lone notification, or a batch of notifications)
    Empty,
}

impl ResponseBody {
    /// Assemble a body mirroring the request shape. `None` entries are
    /// notifications and are dropped without leaving a gap.
    pub fn assemble(is_batch: bool, replies: Vec<Option<JsonRpcResponse>>) -> Self {
        let mut responses: Vec<JsonRpcResponse> = replies.into_iter().flatten().collect();
        if is_batch {
            if responses.is_empty() {
                ResponseBody::Empty
            } else {
                ResponseBody::Batch(responses)
            }
        } else {
            match responses.pop() {
                Some(response) => ResponseBody::Single(response),
                None => ResponseBody::Empty,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Empty)
    }

    pub fn responses(&self) -> &[JsonRpcResponse] {
        match self {
            ResponseBody::Single(response) => std::slice::from_ref(response),
            ResponseBody::Batch(responses) => responses,
            ResponseBody::Empty => &[],
        }
    }

    /// Serialize for the transport; `Ok(None)` when there is nothing to write
    pub fn to_bytes(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        match self {
            ResponseBody::Single(response) => encode_single(response).map(Some),
            ResponseBody::Batch(responses) => encode_batch(responses).map(Some),
            ResponseBody::Empty => Ok(None),
        }
    }
}

/// Serialize one response as a JSON object
pub fn encode_single(response: &JsonRpcResponse) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(response)
}

/// Serialize responses as a JSON array, even when there is only one
pub fn encode_batch(responses: &[JsonRpcResponse]) -> Result<Vec<u8>, serde_json::Error> {
    debug!(count = responses.len(), "encoding batch response");
    serde_json::to_vec(responses)
}
