use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::batch::{self, PayloadShape};
use crate::error::{CodecError, InvalidReason};
use crate::params::Params;
use crate::types::{JsonRpcVersion, RequestId};

/// Whether a decoded record can be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(InvalidReason),
}

/// One logical request taken from an inbound payload.
///
/// Records are produced even for malformed envelopes so that a per-item
/// error response can be written without aborting sibling batch items.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub method: String,
    pub params: Params,
    /// `None` for notifications and for items whose id could not be read
    pub id: Option<RequestId>,
    pub validity: Validity,
    notification: bool,
}

impl RequestRecord {
    /// Build a record from one JSON value (a single payload or a batch element)
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(obj) => Self::from_object(obj),
            _ => Self {
                method: String::new(),
                params: Params::Empty,
                id: None,
                validity: Validity::Invalid(InvalidReason::NotAnObject),
                notification: false,
            },
        }
    }

    fn from_object(mut obj: Map<String, Value>) -> Self {
        let mut problems = Vec::new();

        // A null id is treated like an absent one.
        let id = match obj.remove("id") {
            None | Some(Value::Null) => None,
            Some(raw) => {
                let id = RequestId::from_value(&raw);
                if id.is_none() {
                    problems.push(InvalidReason::UnsupportedId);
                }
                id
            }
        };
        let unsupported_id = !problems.is_empty();

        match obj.get("jsonrpc") {
            Some(Value::String(v)) if v == JsonRpcVersion::V2_0.as_str() => {}
            Some(Value::String(v)) => problems.push(InvalidReason::BadVersion(v.clone())),
            Some(other) => problems.push(InvalidReason::BadVersion(other.to_string())),
            None => problems.push(InvalidReason::MissingVersion),
        }

        let method = match obj.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => {
                problems.push(InvalidReason::MethodNotString);
                String::new()
            }
            None => {
                problems.push(InvalidReason::MissingMethod);
                String::new()
            }
        };

        let params = match Params::from_value(obj.remove("params")) {
            Ok(params) => params,
            Err(reason) => {
                problems.push(reason);
                Params::Empty
            }
        };

        let validity = match problems.into_iter().next() {
            None => Validity::Valid,
            Some(reason) => Validity::Invalid(reason),
        };

        Self {
            method,
            params,
            // An id we cannot echo still means the client expects a reply.
            notification: id.is_none() && !unsupported_id,
            id,
            validity,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.validity, Validity::Valid)
    }

    pub fn invalid_reason(&self) -> Option<&InvalidReason> {
        match &self.validity {
            Validity::Valid => None,
            Validity::Invalid(reason) => Some(reason),
        }
    }

    /// A notification is a request object without an id; it is never answered.
    pub fn is_notification(&self) -> bool {
        self.notification
    }

    pub fn expects_response(&self) -> bool {
        !self.is_notification()
    }
}

/// Result of decoding an inbound payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRequest {
    /// Records in payload order; response order follows it
    pub records: Vec<RequestRecord>,
    pub is_batch: bool,
}

impl DecodedRequest {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode a raw payload into request records.
///
/// Only a payload that is not JSON at all, an empty batch, a batch above
/// `max_batch_size`, or a top-level value that is neither object nor array
/// fails as a whole. Everything else yields records, possibly flagged invalid.
pub fn decode_request(
    raw: &[u8],
    max_batch_size: Option<usize>,
) -> Result<DecodedRequest, CodecError> {
    let shape = batch::detect(raw);
    let value: Value = serde_json::from_slice(batch::strip_bom(raw)).map_err(|err| {
        debug!(?shape, "payload is not valid JSON: {}", err);
        CodecError::Parse(err)
    })?;

    match (shape, value) {
        (PayloadShape::Array, Value::Array(items)) => {
            if items.is_empty() {
                return Err(CodecError::EmptyBatch);
            }
            match max_batch_size {
                Some(limit) if items.len() > limit => {
                    return Err(CodecError::BatchTooLarge {
                        got: items.len(),
                        limit,
                    });
                }
                _ => {}
            }
            let records: Vec<RequestRecord> =
                items.into_iter().map(RequestRecord::from_value).collect();
            for (index, record) in records.iter().enumerate() {
                if let Some(reason) = record.invalid_reason() {
                    warn!(index, id = ?record.id, "invalid batch item: {}", reason);
                }
            }
            debug!(count = records.len(), "decoded batch request");
            Ok(DecodedRequest {
                records,
                is_batch: true,
            })
        }
        (PayloadShape::Object, value @ Value::Object(_)) => {
            let record = RequestRecord::from_value(value);
            if let Some(reason) = record.invalid_reason() {
                warn!(id = ?record.id, "invalid request: {}", reason);
            }
            debug!(method = %record.method, id = ?record.id, "decoded single request");
            Ok(DecodedRequest {
                records: vec![record],
                is_batch: false,
            })
        }
        _ => Err(CodecError::InvalidRequest(InvalidReason::NotAnObject)),
    }
}

/// A JSON-RPC request as written by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: RequestId,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: String, params: Option<Value>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method,
            params,
            id,
        }
    }

    /// Create a new request with no parameters
    pub fn new_no_params(id: RequestId, method: String) -> Self {
        Self::new(id, method, None)
    }
}
