use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::codec::{CallContext, CodecConfig, HandlerError, JsonRpcCodec};
use crate::error::{CodecError, JsonRpcErrorObject};
use crate::params::{JsonRpcParams, Params, bind_params};
use crate::request::RequestRecord;
use crate::response::{JsonRpcResponse, ResponseBody};

/// Trait for handling JSON-RPC method calls
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    /// Handle a call. Returning a boxed [`CodecError`] reports a protocol
    /// failure (e.g. bad params) that bypasses the error mapper.
    async fn handle(&self, ctx: CallContext, params: Params) -> Result<Value, HandlerError>;
}

/// Adapts a typed async function `Fn(CallContext, A) -> Result<R, HandlerError>`
/// into a [`JsonRpcHandler`], binding params onto `A` and serializing `R`.
pub struct TypedHandler<A, R, F> {
    handler_fn: F,
    _marker: PhantomData<fn(A) -> R>,
}

impl<A, R, F> TypedHandler<A, R, F> {
    pub fn new(handler_fn: F) -> Self {
        Self {
            handler_fn,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<A, R, F, Fut> JsonRpcHandler for TypedHandler<A, R, F>
where
    A: JsonRpcParams + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(CallContext, A) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
{
    async fn handle(&self, ctx: CallContext, params: Params) -> Result<Value, HandlerError> {
        let args = bind_params::<A>(params).map_err(|err| -> HandlerError {
            Box::new(CodecError::InvalidParams(err))
        })?;
        let result = (self.handler_fn)(ctx, args).await?;
        serde_json::to_value(result)
            .map_err(|err| -> HandlerError { Box::new(CodecError::Internal(err.to_string())) })
    }
}

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub codec: CodecConfig,
    /// Dispatch batch items concurrently; responses keep request order either way
    pub concurrent_batch: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            codec: CodecConfig::default(),
            concurrent_batch: true,
        }
    }
}

/// Minimal method registry driving a [`JsonRpcCodec`].
///
/// Takes raw request bytes from a transport and returns the body to write
/// back. Owns no I/O.
pub struct JsonRpcServer {
    codec: JsonRpcCodec,
    handlers: HashMap<String, Arc<dyn JsonRpcHandler>>,
    concurrent_batch: bool,
}

impl JsonRpcServer {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> JsonRpcServerBuilder {
        JsonRpcServerBuilder::default()
    }

    pub fn codec(&self) -> &JsonRpcCodec {
        &self.codec
    }

    /// Register a handler for a specific method
    pub fn register_method<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Register a typed async function for a method
    pub fn register<A, R, F, Fut>(&mut self, method: impl Into<String>, handler_fn: F)
    where
        A: JsonRpcParams + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(CallContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    {
        self.register_method(method, TypedHandler::new(handler_fn));
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Get all registered methods
    pub fn registered_methods(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Process one inbound payload
    pub async fn handle(&self, body: &[u8], metadata: HashMap<String, Value>) -> ResponseBody {
        let decoded = match self.codec.decode_request(body) {
            Ok(decoded) => decoded,
            Err(err) => {
                debug!("rejecting payload: {}", err);
                return self.codec.reject(&err);
            }
        };

        let is_batch = decoded.is_batch;
        let replies = if is_batch && self.concurrent_batch {
            join_all(
                decoded
                    .records
                    .into_iter()
                    .map(|record| self.dispatch(record, &metadata)),
            )
            .await
        } else {
            let mut replies = Vec::with_capacity(decoded.records.len());
            for record in decoded.records {
                replies.push(self.dispatch(record, &metadata).await);
            }
            replies
        };

        ResponseBody::assemble(is_batch, replies)
    }

    /// Process one inbound payload and serialize the reply; `None` when
    /// there is nothing to write
    pub async fn handle_bytes(
        &self,
        body: &[u8],
        metadata: HashMap<String, Value>,
    ) -> Option<Vec<u8>> {
        let response = self.handle(body, metadata).await;
        match self.codec.encode_body(&response) {
            Ok(bytes) => bytes,
            Err(err) => self.codec.encode_body(&self.codec.reject(&err)).ok().flatten(),
        }
    }

    async fn dispatch(
        &self,
        record: RequestRecord,
        metadata: &HashMap<String, Value>,
    ) -> Option<JsonRpcResponse> {
        if !record.is_valid() {
            return self.codec.encode_invalid(&record);
        }

        let RequestRecord {
            method, params, id, ..
        } = record;
        let ctx = CallContext::new(method, id.clone()).with_metadata(metadata.clone());

        let Some(handler) = self.handlers.get(&ctx.method) else {
            return match id {
                Some(id) => {
                    debug!(method = %ctx.method, "method not found");
                    let err = CodecError::MethodNotFound(ctx.method.clone());
                    Some(self.codec.encode_protocol_error(Some(id), &err))
                }
                None => {
                    debug!(method = %ctx.method, "ignoring notification for unknown method");
                    None
                }
            };
        };

        debug!(method = %ctx.method, id = ?id, "dispatching");
        let outcome = AssertUnwindSafe(handler.handle(ctx.clone(), params))
            .catch_unwind()
            .await;

        match (id, outcome) {
            (Some(id), Ok(Ok(result))) => Some(self.codec.encode_success(id, result)),
            (Some(id), Ok(Err(err))) => Some(self.codec.encode_error(&ctx, Some(id), err)),
            (Some(id), Err(_)) => {
                error!(method = %ctx.method, id = %id, "handler panicked");
                Some(JsonRpcResponse::error(
                    Some(id),
                    JsonRpcErrorObject::internal_error(Some("handler panicked".to_string())),
                ))
            }
            (None, Ok(Ok(_))) => None,
            (None, Ok(Err(err))) => {
                warn!(method = %ctx.method, "notification handler failed: {}", err);
                None
            }
            (None, Err(_)) => {
                error!(method = %ctx.method, "notification handler panicked");
                None
            }
        }
    }
}

impl Default for JsonRpcServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`JsonRpcServer`]
#[derive(Default)]
pub struct JsonRpcServerBuilder {
    config: ServerConfig,
    codec: Option<JsonRpcCodec>,
}

impl JsonRpcServerBuilder {
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a preconfigured codec (e.g. one carrying an error mapper). Its
    /// own settings take precedence over `ServerConfig::codec`.
    pub fn codec(mut self, codec: JsonRpcCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn concurrent_batch(mut self, enabled: bool) -> Self {
        self.config.concurrent_batch = enabled;
        self
    }

    pub fn build(self) -> JsonRpcServer {
        let codec = self
            .codec
            .unwrap_or_else(|| JsonRpcCodec::builder().config(self.config.codec).build());
        JsonRpcServer {
            codec,
            handlers: HashMap::new(),
            concurrent_batch: self.config.concurrent_batch,
        }
    }
}
