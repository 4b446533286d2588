//! # JSON-RPC 2.0 Codec
//!
//! Translates between JSON-RPC 2.0 wire messages and method dispatch. The
//! crate holds no transport code: it takes the raw request body and hands
//! back the bytes to write.
//!
//! ## Features
//! - Single and batch requests, with batch responses in request order
//! - Notifications, which are never answered
//! - Parameters by name or by position, bound onto a typed struct via
//!   `#[derive(JsonRpcParams)]` (`derive` feature)
//! - Fixed error taxonomy with an optional pluggable error mapper
//! - Client-side request encoding and response decoding
//! - A minimal async method registry with the `async` feature
//!
//! ```rust,ignore
//! use turul_json_rpc_codec::prelude::*;
//!
//! #[derive(Default, JsonRpcParams)]
//! #[rpc(rename_all = "UPPERCASE")]
//! struct MultiplyArgs {
//!     a: i64,
//!     b: i64,
//! }
//!
//! let mut server = JsonRpcServer::new();
//! server.register("Service1.Multiply", |_ctx, args: MultiplyArgs| async move {
//!     Ok::<_, HandlerError>(args.a * args.b)
//! });
//! let body = server.handle(br#"{"jsonrpc":"2.0","method":"Service1.Multiply","params":{"A":4,"B":2},"id":1}"#, Default::default()).await;
//! ```

// Lets generated `turul_json_rpc_codec::...` paths resolve inside this crate too.
extern crate self as turul_json_rpc_codec;

pub mod batch;
pub mod client;
pub mod codec;
pub mod error;
pub mod notification;
pub mod params;
pub mod prelude;
pub mod request;
pub mod response;
pub mod types;

#[cfg(feature = "async")]
pub mod r#async;

// Re-export main types
pub use batch::{PayloadShape, detect, is_batch};
pub use client::{
    ClientError, ClientResponse, decode_client_response, encode_client_notification,
    encode_client_request,
};
pub use codec::{CallContext, CodecConfig, ErrorMapper, HandlerError, JsonRpcCodec};
pub use error::{CodecError, InvalidReason, JsonRpcErrorCode, JsonRpcErrorObject, MapperError};
pub use notification::JsonRpcNotification;
pub use params::{BindError, FieldSlot, JsonRpcParams, Params, bind_params};
pub use request::{DecodedRequest, JsonRpcRequest, RequestRecord, Validity, decode_request};
pub use response::{JsonRpcResponse, ResponseBody, encode_batch, encode_single};
pub use types::{JsonRpcVersion, RequestId};

#[cfg(feature = "derive")]
pub use turul_json_rpc_derive::JsonRpcParams;

#[cfg(feature = "async")]
pub use r#async::{JsonRpcHandler, JsonRpcServer, ServerConfig};

// Used by `#[derive(JsonRpcParams)]` expansions
#[doc(hidden)]
pub use serde_json;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Code for handler errors no mapper turned into something specific
    pub const SERVER_ERROR: i32 = -32000;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i32 = -32099;
    pub const SERVER_ERROR_END: i32 = -32000;
}
