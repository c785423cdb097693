//! Call context handed to every invoked method

use chrono::{DateTime, Utc};
use warp::http::HeaderMap;

/// Per-request context for tracking and logging
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID
    pub request_id: String,

    /// URL path the request arrived on
    pub path: String,

    /// Request headers as received
    pub headers: HeaderMap,

    /// Request timestamp
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            path: path.into(),
            headers,
            received_at: Utc::now(),
        }
    }

    /// Header value as text, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
