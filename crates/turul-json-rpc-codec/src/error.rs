use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::params::BindError;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    /// Default bucket for handler errors that carry no code of their own
    ServerError,
    /// Application-defined code, usually chosen by an error mapper
    Custom(i32),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            JsonRpcErrorCode::ParseError => crate::error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => crate::error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => crate::error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => crate::error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => crate::error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError => crate::error_codes::SERVER_ERROR,
            JsonRpcErrorCode::Custom(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError => "Server error",
            JsonRpcErrorCode::Custom(_) => "Application error",
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            crate::error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            crate::error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            crate::error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            crate::error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            crate::error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            crate::error_codes::SERVER_ERROR => JsonRpcErrorCode::ServerError,
            other => JsonRpcErrorCode::Custom(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
///
/// Also usable as a handler error: a handler (or error mapper) that returns
/// a boxed `JsonRpcErrorObject` has it written to the wire verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    /// Error with an arbitrary application code
    pub fn custom(code: i32, message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::Custom(code), Some(message.into()), None)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn error_code(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    pub fn parse_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, message, None)
    }

    pub fn invalid_request(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, message, None)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound,
            Some(format!("Method '{}' not found", method)),
            None,
        )
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::InvalidParams,
            Some(message.to_string()),
            None,
        )
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message, None)
    }

    pub fn server_error(message: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::ServerError,
            Some(message.to_string()),
            None,
        )
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorObject {}

/// Why a decoded request record cannot be dispatched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("request must be a JSON object")]
    NotAnObject,

    #[error("unsupported jsonrpc version: {0}")]
    BadVersion(String),

    #[error("missing jsonrpc version")]
    MissingVersion,

    #[error("missing method")]
    MissingMethod,

    #[error("method must be a string")]
    MethodNotString,

    #[error("params must be an object or an array")]
    ParamsNotStructured,

    #[error("id must be an unsigned integer or a string")]
    UnsupportedId,
}

/// Failures that originate in the codec rather than in a handler.
///
/// These always keep their fixed protocol codes and never pass through an
/// error mapper.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(InvalidReason),

    #[error("Empty batch")]
    EmptyBatch,

    #[error("Batch of {got} requests exceeds the limit of {limit}")]
    BatchTooLarge { got: usize, limit: usize },

    #[error("Method '{0}' not found")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(#[from] BindError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CodecError {
    pub fn code(&self) -> JsonRpcErrorCode {
        match self {
            CodecError::Parse(_) => JsonRpcErrorCode::ParseError,
            CodecError::InvalidRequest(_)
            | CodecError::EmptyBatch
            | CodecError::BatchTooLarge { .. } => JsonRpcErrorCode::InvalidRequest,
            CodecError::MethodNotFound(_) => JsonRpcErrorCode::MethodNotFound,
            CodecError::InvalidParams(_) => JsonRpcErrorCode::InvalidParams,
            CodecError::Internal(_) => JsonRpcErrorCode::InternalError,
        }
    }

    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            CodecError::MethodNotFound(method) => JsonRpcErrorObject::method_not_found(method),
            CodecError::InvalidParams(bind) => JsonRpcErrorObject::invalid_params(&bind.to_string()),
            other => JsonRpcErrorObject::new(other.code(), Some(other.to_string()), None),
        }
    }
}

/// Raised by an error mapper that could not produce a replacement error
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("error mapper failed: {0}")]
    Failed(String),

    #[error("error mapper panicked")]
    Panicked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(JsonRpcErrorCode::ParseError.code(), -32700);
        assert_eq!(JsonRpcErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(JsonRpcErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(JsonRpcErrorCode::InvalidParams.code(), -32602);
        assert_eq!(JsonRpcErrorCode::InternalError.code(), -32603);
        assert_eq!(JsonRpcErrorCode::ServerError.code(), -32000);
        assert_eq!(JsonRpcErrorCode::Custom(100).code(), 100);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(JsonRpcErrorCode::from_code(-32700), JsonRpcErrorCode::ParseError);
        assert_eq!(JsonRpcErrorCode::from_code(100), JsonRpcErrorCode::Custom(100));
    }

    #[test]
    fn test_error_serialization() {
        let error = JsonRpcErrorObject::method_not_found("test");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("Method 'test' not found"));
        assert!(!json.contains("data"));
    }

    #[test]
    fn test_error_with_data() {
        let error = JsonRpcErrorObject::custom(7, "nope").with_data(json!({"field": "a"}));
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value, json!({"code": 7, "message": "nope", "data": {"field": "a"}}));
    }

    #[test]
    fn test_codec_error_codes() {
        let parse = serde_json::from_str::<Value>("{").unwrap_err();
        assert_eq!(CodecError::Parse(parse).code(), JsonRpcErrorCode::ParseError);
        assert_eq!(CodecError::EmptyBatch.code(), JsonRpcErrorCode::InvalidRequest);
        assert_eq!(
            CodecError::InvalidRequest(InvalidReason::MissingMethod).code(),
            JsonRpcErrorCode::InvalidRequest
        );
        assert_eq!(
            CodecError::MethodNotFound("x".into()).to_error_object().code,
            -32601
        );
    }
}
