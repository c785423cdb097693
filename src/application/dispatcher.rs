//! Request dispatcher
//!
//! `RpcServer` owns one service and a table of codecs and turns one inbound
//! HTTP request into one reply: transport checks, codec selection, decode,
//! method lookup, parameter binding, invocation and encoding.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn, Span};
use warp::http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode};

use crate::application::codec::{media_type, Codec, CodecTable, DecodeError, ReplyTo};
use crate::application::reply::HttpReply;
use crate::domain::context::RequestContext;
use crate::domain::rpc::RpcError;
use crate::domain::service::{ArgsSlot, CallError, LookupError, ServiceDescriptor};
use crate::shared::error::{AppError, AppResult};
use crate::shared::metrics::{DispatchMetrics, Outcome};

/// One HTTP request as seen by the dispatcher
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// How requests that fail to decode are answered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRequestReply {
    /// JSON-RPC error envelope at HTTP 200
    #[default]
    Envelope,
    /// Plain-text HTTP 400 carrying the error message
    Status,
}

/// Dispatcher behaviour knobs
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub malformed_request_reply: MalformedRequestReply,
    /// Error code given to method failures that carry no protocol error
    pub fallback_status: StatusCode,
    /// Largest accepted body in bytes; `None` accepts any size
    pub max_request_size: Option<usize>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            malformed_request_reply: MalformedRequestReply::Envelope,
            fallback_status: StatusCode::BAD_REQUEST,
            max_request_size: None,
        }
    }
}

/// Serves one registered service through the registered codecs
pub struct RpcServer<R> {
    service: ServiceDescriptor<R>,
    codecs: CodecTable,
    options: DispatchOptions,
    metrics: Arc<DispatchMetrics>,
}

impl<R> RpcServer<R> {
    pub fn new(service: ServiceDescriptor<R>) -> AppResult<Self> {
        Ok(Self {
            service,
            codecs: CodecTable::new(),
            options: DispatchOptions::default(),
            metrics: Arc::new(DispatchMetrics::new()?),
        })
    }

    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Serve `content_type` with `codec`. Matching is case-insensitive and a
    /// later registration for the same type replaces the earlier one.
    pub fn register_codec(&mut self, codec: Arc<dyn Codec>, content_type: &str) {
        debug!(codec = codec.name(), content_type = %content_type, "codec registered");
        self.codecs.register(codec, content_type);
    }

    /// True when `method` (`Service.Method`) names a registered method.
    pub fn has_method(&self, method: &str) -> bool {
        self.service.resolve(method).is_ok()
    }

    pub fn service(&self) -> &ServiceDescriptor<R> {
        &self.service
    }

    pub fn codecs(&self) -> &CodecTable {
        &self.codecs
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn metrics(&self) -> &Arc<DispatchMetrics> {
        &self.metrics
    }

    /// Handle one request and produce its reply.
    #[instrument(
        name = "rpc_request",
        skip_all,
        fields(request_id, http_method = %request.method, path = %request.path, rpc_method)
    )]
    pub fn handle(&self, request: InboundRequest) -> HttpReply {
        let started = Instant::now();
        let InboundRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let context = RequestContext::new(path, headers);
        Span::current().record("request_id", context.request_id.as_str());

        let (outcome, reply) = self.dispatch(&method, &body, &context);
        self.metrics.record(outcome, started.elapsed());

        info!(
            status = reply.status.as_u16(),
            outcome = outcome.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        reply
    }

    fn dispatch(&self, method: &Method, body: &[u8], context: &RequestContext) -> (Outcome, HttpReply) {
        if *method != Method::POST {
            return reject(
                StatusCode::METHOD_NOT_ALLOWED,
                format!("rpc: POST method required, received {}", method),
            );
        }

        // Declared lengths are refused by the route; this catches undeclared ones.
        if let Some(limit) = self.options.max_request_size {
            if body.len() > limit {
                let err = AppError::RequestTooLarge { size: body.len(), limit };
                return reject(err.http_status_code(), err.to_string());
            }
        }

        let content_type = context.header(CONTENT_TYPE.as_str()).unwrap_or("");
        let Some(codec) = self.codecs.select(content_type) else {
            return reject(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("rpc: unrecognized Content-Type: {}", media_type(content_type)),
            );
        };

        let call = match codec.decode(body, &context.path) {
            Ok(call) => call,
            Err(err @ DecodeError::PathMismatch { .. }) => {
                return reject(StatusCode::NOT_FOUND, err.to_string());
            }
            Err(DecodeError::Protocol { error, reply_to }) => {
                debug!(code = error.code, error = %error, "malformed request");
                return match self.options.malformed_request_reply {
                    MalformedRequestReply::Envelope => {
                        (Outcome::ProtocolError, error_reply(codec, &reply_to, &error))
                    }
                    MalformedRequestReply::Status => reject(StatusCode::BAD_REQUEST, error.message),
                };
            }
        };

        let qualified = self.service.qualify(&call.method);
        Span::current().record("rpc_method", qualified.as_str());

        let method = match self.service.resolve(&qualified) {
            Ok(method) => method,
            Err(LookupError::UnknownMethod(_)) => {
                let error = RpcError::method_not_found(&qualified);
                return (Outcome::ProtocolError, error_reply(codec, &call.reply_to, &error));
            }
            Err(err) => {
                let status = AppError::from(err.clone()).http_status_code();
                return reject(status, err.to_string());
            }
        };

        let params = call.params.as_deref();
        let bind = |slot: &mut dyn ArgsSlot| codec.bind_parameters(params, slot);

        match method.invoke(self.service.receiver(), context, &bind) {
            Ok(result) => (Outcome::Success, result_reply(codec, &call.reply_to, &result)),
            Err(CallError::Bind(error)) => {
                debug!(code = error.code, error = %error, "parameter binding failed");
                (Outcome::ProtocolError, error_reply(codec, &call.reply_to, &error))
            }
            Err(CallError::Method(err)) => {
                let error = RpcError::from_failure(&err, self.options.fallback_status);
                warn!(code = error.code, error = %err, "method returned an error");
                (Outcome::MethodError, error_reply(codec, &call.reply_to, &error))
            }
            Err(err @ CallError::Encode(_)) => {
                warn!(error = %err, "result could not be encoded");
                let error = RpcError::internal_error(err.to_string());
                (Outcome::ProtocolError, error_reply(codec, &call.reply_to, &error))
            }
        }
    }
}

fn reject(status: StatusCode, message: impl Into<String>) -> (Outcome, HttpReply) {
    let message = message.into();
    debug!(status = status.as_u16(), reason = %message, "request rejected");
    (Outcome::Rejected, HttpReply::plain(status, message))
}

fn result_reply(codec: &dyn Codec, reply_to: &ReplyTo, result: &serde_json::Value) -> HttpReply {
    protocol_reply(codec.encode_result(reply_to, result))
}

fn error_reply(codec: &dyn Codec, reply_to: &ReplyTo, error: &RpcError) -> HttpReply {
    protocol_reply(codec.encode_error(reply_to, error))
}

fn protocol_reply(encoded: Result<Option<Vec<u8>>, serde_json::Error>) -> HttpReply {
    match encoded {
        Ok(Some(body)) => HttpReply::json(body),
        Ok(None) => HttpReply::empty(),
        Err(err) => {
            warn!(error = %err, "response serialization failed");
            HttpReply::plain(StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}
