//! The codec: request decoding, parameter binding and response encoding,
//! with an optional per-instance error mapper.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{CodecError, JsonRpcErrorObject, MapperError};
use crate::params::{JsonRpcParams, Params, bind_params};
use crate::request::{DecodedRequest, RequestRecord, decode_request};
use crate::response::{JsonRpcResponse, ResponseBody};
use crate::types::RequestId;

/// Error type returned by method handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Codec settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Reject batches with more elements than this (unlimited when unset)
    pub max_batch_size: Option<usize>,
}

/// Per-call information handed to handlers and to the error mapper
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Method being invoked
    pub method: String,
    /// Request id, `None` for notifications
    pub id: Option<RequestId>,
    /// Transport-supplied metadata (headers, peer address, ...)
    pub metadata: HashMap<String, Value>,
}

impl CallContext {
    pub fn new(method: impl Into<String>, id: Option<RequestId>) -> Self {
        Self {
            method: method.into(),
            id,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Translates handler errors before they are written to the wire.
///
/// Returning a boxed [`JsonRpcErrorObject`] makes it the wire error verbatim;
/// any other error is reported as `-32000` with its `Display` text. Returning
/// the input unchanged passes it through.
///
/// Plain closures `Fn(&CallContext, HandlerError) -> HandlerError` implement
/// this trait.
pub trait ErrorMapper: Send + Sync {
    fn map_error(&self, ctx: &CallContext, error: HandlerError)
    -> Result<HandlerError, MapperError>;
}

impl<F> ErrorMapper for F
where
    F: Fn(&CallContext, HandlerError) -> HandlerError + Send + Sync,
{
    fn map_error(
        &self,
        ctx: &CallContext,
        error: HandlerError,
    ) -> Result<HandlerError, MapperError> {
        Ok(self(ctx, error))
    }
}

/// JSON-RPC 2.0 codec.
///
/// Stateless apart from its configuration; clone it or share it behind an
/// `Arc` across concurrent calls.
#[derive(Clone, Default)]
pub struct JsonRpcCodec {
    config: CodecConfig,
    error_mapper: Option<Arc<dyn ErrorMapper>>,
}

impl fmt::Debug for JsonRpcCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRpcCodec")
            .field("config", &self.config)
            .field("error_mapper", &self.error_mapper.is_some())
            .finish()
    }
}

impl JsonRpcCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> JsonRpcCodecBuilder {
        JsonRpcCodecBuilder::default()
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn has_error_mapper(&self) -> bool {
        self.error_mapper.is_some()
    }

    /// Decode a raw payload into request records
    pub fn decode_request(&self, raw: &[u8]) -> Result<DecodedRequest, CodecError> {
        decode_request(raw, self.config.max_batch_size)
    }

    /// Bind params onto the argument type a method expects
    pub fn bind_params<T: JsonRpcParams>(&self, params: Params) -> Result<T, CodecError> {
        bind_params(params).map_err(CodecError::from)
    }

    pub fn encode_success(&self, id: RequestId, result: Value) -> JsonRpcResponse {
        JsonRpcResponse::success(id, result)
    }

    /// Encode a handler error, routing it through the error mapper.
    ///
    /// A [`CodecError`] returned by a handler keeps its protocol code and
    /// skips the mapper.
    pub fn encode_error(
        &self,
        ctx: &CallContext,
        id: Option<RequestId>,
        err: HandlerError,
    ) -> JsonRpcResponse {
        if let Some(codec_err) = err.downcast_ref::<CodecError>() {
            return self.encode_protocol_error(id, codec_err);
        }

        let err = match &self.error_mapper {
            Some(mapper) => {
                let mapped = catch_unwind(AssertUnwindSafe(|| mapper.map_error(ctx, err)))
                    .unwrap_or(Err(MapperError::Panicked));
                match mapped {
                    Ok(err) => err,
                    Err(mapper_err) => {
                        error!(method = %ctx.method, id = ?id, "{}", mapper_err);
                        return JsonRpcResponse::error(
                            id,
                            JsonRpcErrorObject::internal_error(Some(mapper_err.to_string())),
                        );
                    }
                }
            }
            None => err,
        };

        let error = match err.downcast::<JsonRpcErrorObject>() {
            Ok(error) => *error,
            Err(other) => JsonRpcErrorObject::server_error(&other.to_string()),
        };
        debug!(method = %ctx.method, id = ?id, code = error.code, "encoded handler error");
        JsonRpcResponse::error(id, error)
    }

    /// Encode a codec-originated failure with its fixed code
    pub fn encode_protocol_error(&self, id: Option<RequestId>, err: &CodecError) -> JsonRpcResponse {
        JsonRpcResponse::error(id, err.to_error_object())
    }

    /// Error reply for a record flagged invalid at decode time, or `None`
    /// when the record is a notification
    pub fn encode_invalid(&self, record: &RequestRecord) -> Option<JsonRpcResponse> {
        let reason = record.invalid_reason()?;
        if record.is_notification() {
            warn!(method = %record.method, "dropping invalid notification: {}", reason);
            return None;
        }
        let err = CodecError::InvalidRequest(reason.clone());
        Some(self.encode_protocol_error(record.id.clone(), &err))
    }

    /// Body for a payload that failed as a whole: a single error object with
    /// a null id, whatever shape the payload claimed to have
    pub fn reject(&self, err: &CodecError) -> ResponseBody {
        ResponseBody::Single(self.encode_protocol_error(None, err))
    }

    /// Serialize a response body for the transport
    pub fn encode_body(&self, body: &ResponseBody) -> Result<Option<Vec<u8>>, CodecError> {
        body.to_bytes().map_err(|err| {
            error!("failed to serialize response: {}", err);
            CodecError::Internal(err.to_string())
        })
    }
}

/// Builder for [`JsonRpcCodec`]
#[derive(Default)]
pub struct JsonRpcCodecBuilder {
    config: CodecConfig,
    error_mapper: Option<Arc<dyn ErrorMapper>>,
}

impl JsonRpcCodecBuilder {
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_batch_size(mut self, limit: usize) -> Self {
        self.config.max_batch_size = Some(limit);
        self
    }

    pub fn error_mapper<M>(mut self, mapper: M) -> Self
    where
        M: ErrorMapper + 'static,
    {
        self.error_mapper = Some(Arc::new(mapper));
        self
    }

    pub fn build(self) -> JsonRpcCodec {
        JsonRpcCodec {
            config: self.config,
            error_mapper: self.error_mapper,
        }
    }
}
