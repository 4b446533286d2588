//! # JSON-RPC Codec Prelude
//!
//! Re-exports of the types most hosts need.
//!
//! ```rust
//! use turul_json_rpc_codec::prelude::*;
//! ```

pub use crate::client::{ClientError, decode_client_response, encode_client_request};
pub use crate::codec::{CallContext, CodecConfig, ErrorMapper, HandlerError, JsonRpcCodec};
pub use crate::error::{CodecError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use crate::params::{JsonRpcParams, Params};
pub use crate::request::RequestRecord;
pub use crate::response::{JsonRpcResponse, ResponseBody};
pub use crate::types::RequestId;

#[cfg(feature = "derive")]
pub use turul_json_rpc_derive::JsonRpcParams;

#[cfg(feature = "async")]
pub use crate::r#async::{JsonRpcHandler, JsonRpcServer, ServerConfig};

// Standard error codes
pub use crate::error_codes::*;
