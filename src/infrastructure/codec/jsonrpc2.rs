//! JSON-RPC 2.0 codec

use serde_json::value::RawValue;
use serde_json::Value;
use tracing::debug;

use crate::application::codec::{Codec, DecodeError, DecodedCall, ReplyTo};
use crate::domain::path::path_has_method;
use crate::domain::rpc::{RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
use crate::domain::service::ArgsSlot;

/// Codec for `application/json` JSON-RPC 2.0 bodies
#[derive(Debug, Clone)]
pub struct JsonRpc2Codec {
    /// Write nothing back for requests without an id.
    pub suppress_notification_replies: bool,
    /// Require the last URL path segment to equal the body's method.
    pub check_path: bool,
}

impl Default for JsonRpc2Codec {
    fn default() -> Self {
        Self {
            suppress_notification_replies: false,
            check_path: true,
        }
    }
}

impl JsonRpc2Codec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notification_suppression(mut self, suppress: bool) -> Self {
        self.suppress_notification_replies = suppress;
        self
    }

    pub fn with_path_check(mut self, check_path: bool) -> Self {
        self.check_path = check_path;
        self
    }

    fn write(&self, reply_to: &ReplyTo, response: &RpcResponse<'_>) -> Result<Option<Vec<u8>>, serde_json::Error> {
        if self.suppress_notification_replies && reply_to.is_notification() {
            debug!(is_error = response.is_error(), "notification reply suppressed");
            return Ok(None);
        }
        serde_json::to_vec(response).map(Some)
    }
}

impl Codec for JsonRpc2Codec {
    fn name(&self) -> &'static str {
        "jsonrpc2"
    }

    fn decode(&self, body: &[u8], path: &str) -> Result<DecodedCall, DecodeError> {
        let request: RpcRequest = serde_json::from_slice(body)
            .map_err(|err| DecodeError::protocol(RpcError::parse_error(err.to_string()), ReplyTo::Unknown))?;

        let RpcRequest {
            jsonrpc,
            method,
            params,
            id,
        } = request;
        let reply_to = ReplyTo::from_id(id);

        if jsonrpc != JSONRPC_VERSION {
            let error = RpcError::invalid_request(format!("jsonrpc must be {}", JSONRPC_VERSION));
            return Err(DecodeError::protocol(error, reply_to));
        }

        if method.is_empty() {
            return Err(DecodeError::protocol(RpcError::method_not_specified(), reply_to));
        }

        if self.check_path && !path_has_method(path, &method) {
            return Err(DecodeError::PathMismatch {
                path: path.to_string(),
                method,
            });
        }

        Ok(DecodedCall {
            method,
            params,
            reply_to,
        })
    }

    fn bind_parameters(&self, params: Option<&RawValue>, slot: &mut dyn ArgsSlot) -> Result<(), RpcError> {
        let Some(raw) = params else {
            return Ok(());
        };

        let by_name = match slot.decode_by_name(raw) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        let by_position = match slot.decode_by_position(raw) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        // Report the attempt that matches the payload's shape.
        let reason = if raw.get().trim_start().starts_with('[') {
            by_position
        } else {
            by_name
        };
        debug!(args_type = slot.type_name(), error = %reason, "parameters do not fit argument type");

        let payload = serde_json::from_str::<Value>(raw.get()).ok();
        Err(RpcError::invalid_params(reason.to_string(), payload))
    }

    fn encode_result(&self, reply_to: &ReplyTo, result: &Value) -> Result<Option<Vec<u8>>, serde_json::Error> {
        self.write(reply_to, &RpcResponse::success(result, reply_to.id()))
    }

    fn encode_error(&self, reply_to: &ReplyTo, error: &RpcError) -> Result<Option<Vec<u8>>, serde_json::Error> {
        self.write(reply_to, &RpcResponse::failure(error, reply_to.id()))
    }
}
