//! Transport-neutral HTTP reply produced by the dispatcher

use warp::http::StatusCode;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Status, headers and body of one HTTP reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub content_type: Option<&'static str>,
    /// Adds `X-Content-Type-Options: nosniff`
    pub nosniff: bool,
    pub body: Vec<u8>,
}

impl HttpReply {
    /// Plain-text transport error
    pub fn plain(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(CONTENT_TYPE_TEXT),
            nosniff: false,
            body: message.into().into_bytes(),
        }
    }

    /// Protocol reply written by a codec
    pub fn json(body: Vec<u8>) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: Some(CONTENT_TYPE_JSON),
            nosniff: true,
            body,
        }
    }

    /// Successful call with nothing to write back
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: None,
            nosniff: true,
            body: Vec::new(),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
