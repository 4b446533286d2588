//! Client side of the codec: encoding outgoing calls and reading replies.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::batch;
use crate::error::JsonRpcErrorObject;
use crate::notification::JsonRpcNotification;
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;
use crate::types::RequestId;

/// A reply as seen by a client; same envelope the server writes
pub type ClientResponse = JsonRpcResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    Rpc(JsonRpcErrorObject),

    #[error("unexpected null result")]
    NullResult,
}

/// Random id in the non-negative 63-bit range
pub fn next_request_id() -> RequestId {
    RequestId::Number(rand::random::<u64>() >> 1)
}

fn params_value<A: Serialize>(args: &A) -> Result<Option<Value>, ClientError> {
    match serde_json::to_value(args).map_err(ClientError::Encode)? {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

/// Encode a call to `method` with a freshly generated id.
///
/// `args` is sent as-is: a struct or map goes out by name, a tuple or
/// `Vec` by position, and `()` omits `params` entirely.
pub fn encode_client_request<A: Serialize>(method: &str, args: &A) -> Result<Vec<u8>, ClientError> {
    encode_client_request_with_id(next_request_id(), method, args)
}

pub fn encode_client_request_with_id<A: Serialize>(
    id: RequestId,
    method: &str,
    args: &A,
) -> Result<Vec<u8>, ClientError> {
    let request = JsonRpcRequest::new(id, method.to_string(), params_value(args)?);
    debug!(method, id = %request.id, "encoding client request");
    serde_json::to_vec(&request).map_err(ClientError::Encode)
}

/// Encode a notification; the server will not reply to it
pub fn encode_client_notification<A: Serialize>(
    method: &str,
    args: &A,
) -> Result<Vec<u8>, ClientError> {
    let notification = JsonRpcNotification::new(method.to_string(), params_value(args)?);
    debug!(method, "encoding client notification");
    serde_json::to_vec(&notification).map_err(ClientError::Encode)
}

/// Encode several prepared requests as one batch
pub fn encode_client_batch(requests: &[JsonRpcRequest]) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(requests).map_err(ClientError::Encode)
}

/// Decode a server reply. A single object yields one response, an array
/// yields them in the order the server wrote them.
pub fn decode_client_response(raw: &[u8]) -> Result<Vec<ClientResponse>, ClientError> {
    let raw = batch::strip_bom(raw);
    if batch::is_batch(raw) {
        let responses: Vec<ClientResponse> =
            serde_json::from_slice(raw).map_err(ClientError::Decode)?;
        debug!(count = responses.len(), "decoded batch response");
        Ok(responses)
    } else {
        let response: ClientResponse = serde_json::from_slice(raw).map_err(ClientError::Decode)?;
        Ok(vec![response])
    }
}

impl JsonRpcResponse {
    /// Take the typed result, or the error the server reported
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        match self.into_outcome() {
            Err(error) => Err(ClientError::Rpc(error)),
            Ok(None) => Err(ClientError::NullResult),
            Ok(Some(value)) => serde_json::from_value(value).map_err(ClientError::Decode),
        }
    }
}
