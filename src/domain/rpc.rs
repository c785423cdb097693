//! JSON-RPC 2.0 wire model and error taxonomy
//!
//! Request ids and parameter payloads are kept as raw JSON so that ids are
//! echoed exactly as received and parameters are bound only once the target
//! argument type is known.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use warp::http::StatusCode;

/// Protocol version tag carried by every request and response
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    pub const SERVER_ERROR: i64 = -32000;
}

/// Canonical error codes, extensible with method-supplied codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError,
    Application(i64),
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::ParseError => error_codes::PARSE_ERROR,
            ErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            ErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            ErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            ErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            ErrorCode::ServerError => error_codes::SERVER_ERROR,
            ErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
            ErrorCode::ServerError => "Server error",
            ErrorCode::Application(_) => "Application error",
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => ErrorCode::ParseError,
            error_codes::INVALID_REQUEST => ErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => ErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => ErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => ErrorCode::InternalError,
            error_codes::SERVER_ERROR => ErrorCode::ServerError,
            other => ErrorCode::Application(other),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC request envelope as received
///
/// Every member is optional at this stage; presence and shape are validated
/// by the codec so that each violation maps to its own error code.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub jsonrpc: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,

    #[serde(default)]
    pub params: Option<Box<RawValue>>,

    /// Absent or `null` marks a notification.
    #[serde(default)]
    pub id: Option<Box<RawValue>>,
}

/// `null` reads as the empty value, same as an absent member
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// JSON-RPC response envelope
///
/// Exactly one of `result` / `error` is set; the constructors are the only
/// way to build one.
#[derive(Debug, Serialize)]
pub struct RpcResponse<'a> {
    jsonrpc: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a RpcError>,

    id: Option<&'a RawValue>,
}

impl<'a> RpcResponse<'a> {
    pub fn success(result: &'a Value, id: Option<&'a RawValue>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(error: &'a RpcError, id: Option<&'a RawValue>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(error),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// JSON-RPC error object
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{message}")]
pub struct RpcError {
    pub code: i64,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: impl Into<i64>, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data,
        }
    }

    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code.code(), message, None)
    }

    pub fn parse_error(reason: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::ParseError, reason)
    }

    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InvalidRequest, reason)
    }

    pub fn method_not_specified() -> Self {
        Self::with_code(ErrorCode::MethodNotFound, "method field empty or missing")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::with_code(ErrorCode::MethodNotFound, format!("rpc: can't find method \"{}\"", method))
    }

    pub fn invalid_params(reason: impl Into<String>, payload: Option<Value>) -> Self {
        Self::new(ErrorCode::InvalidParams.code(), reason, payload)
    }

    pub fn internal_error(reason: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::InternalError, reason)
    }

    pub fn server_error(reason: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::ServerError, reason)
    }

    pub fn kind(&self) -> ErrorCode {
        ErrorCode::from(self.code)
    }

    /// Translate a failure returned by an invoked method into a wire error.
    ///
    /// A failure that already is an `RpcError` keeps its code, message and
    /// data. Anything else is reported with `fallback_status` as its code.
    pub fn from_failure(err: &anyhow::Error, fallback_status: StatusCode) -> Self {
        if let Some(rpc_error) = err.downcast_ref::<RpcError>() {
            return rpc_error.clone();
        }

        Self::new(i64::from(fallback_status.as_u16()), err.to_string(), None)
    }
}
