//! Codec contract
//!
//! A codec turns an HTTP body into a call description, binds the call's
//! parameters into the target argument type, and encodes the outcome. Codecs
//! are selected per request by the media type of the `Content-Type` header.

use serde_json::value::RawValue;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::rpc::RpcError;
use crate::domain::service::ArgsSlot;

/// Where (and whether) a reply goes
#[derive(Debug, Clone)]
pub enum ReplyTo {
    /// The body could not be read far enough to find an id.
    Unknown,

    /// The request carried no id.
    Notification,

    /// The request id, kept verbatim.
    Id(Box<RawValue>),
}

impl ReplyTo {
    pub fn from_id(id: Option<Box<RawValue>>) -> Self {
        match id {
            Some(raw) if raw.get().trim() != "null" => ReplyTo::Id(raw),
            _ => ReplyTo::Notification,
        }
    }

    /// Id to echo; `None` serializes as `null`.
    pub fn id(&self) -> Option<&RawValue> {
        match self {
            ReplyTo::Id(raw) => Some(raw),
            ReplyTo::Unknown | ReplyTo::Notification => None,
        }
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, ReplyTo::Notification)
    }
}

impl PartialEq for ReplyTo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ReplyTo::Unknown, ReplyTo::Unknown) => true,
            (ReplyTo::Notification, ReplyTo::Notification) => true,
            (ReplyTo::Id(a), ReplyTo::Id(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

/// A request body decoded into a call
#[derive(Debug)]
pub struct DecodedCall {
    pub method: String,
    pub params: Option<Box<RawValue>>,
    pub reply_to: ReplyTo,
}

impl PartialEq for DecodedCall {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
            && self.params.as_deref().map(RawValue::get) == other.params.as_deref().map(RawValue::get)
            && self.reply_to == other.reply_to
    }
}

/// Why a body could not be turned into a call
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body violates the protocol; answered with an error envelope.
    #[error("{error}")]
    Protocol { error: RpcError, reply_to: ReplyTo },

    /// The URL path does not name the method in the body.
    #[error("rpc: URL.Path '{path}' does not end with method name '{method}'")]
    PathMismatch { path: String, method: String },
}

impl DecodeError {
    pub fn protocol(error: RpcError, reply_to: ReplyTo) -> Self {
        DecodeError::Protocol { error, reply_to }
    }
}

/// Wire codec for one content type
pub trait Codec: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Decode a request body received on `path`.
    fn decode(&self, body: &[u8], path: &str) -> Result<DecodedCall, DecodeError>;

    /// Fill the argument behind `slot` from the call's parameters. Absent
    /// parameters leave the argument at its default.
    fn bind_parameters(&self, params: Option<&RawValue>, slot: &mut dyn ArgsSlot) -> Result<(), RpcError>;

    /// Encode a successful result. `None` means no body is written.
    fn encode_result(&self, reply_to: &ReplyTo, result: &Value) -> Result<Option<Vec<u8>>, serde_json::Error>;

    /// Encode an error. `None` means no body is written.
    fn encode_error(&self, reply_to: &ReplyTo, error: &RpcError) -> Result<Option<Vec<u8>>, serde_json::Error>;
}

/// Media type of a `Content-Type` header: parameters dropped, whitespace trimmed
pub fn media_type(header: &str) -> &str {
    header.split(';').next().unwrap_or(header).trim()
}

/// Registered codecs keyed by lowercase media type
#[derive(Clone, Default)]
pub struct CodecTable {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for `content_type`, replacing any earlier entry.
    pub fn register(&mut self, codec: Arc<dyn Codec>, content_type: &str) {
        self.codecs.insert(content_type.trim().to_lowercase(), codec);
    }

    /// Codec for a `Content-Type` header value. With a single registered
    /// codec an empty header selects it.
    pub fn select(&self, header: &str) -> Option<&dyn Codec> {
        let media_type = media_type(header);
        if media_type.is_empty() && self.codecs.len() == 1 {
            return self.codecs.values().next().map(Arc::as_ref);
        }
        self.codecs.get(&media_type.to_lowercase()).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Registered media types, sorted
    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for CodecTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.codecs.iter().map(|(content_type, codec)| (content_type, codec.name())))
            .finish()
    }
}
