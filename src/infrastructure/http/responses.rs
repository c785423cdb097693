//! HTTP responses module
//!
//! Conversion of dispatcher replies into warp responses, plus the JSON body
//! of the health endpoint.

use serde::Serialize;
use warp::http::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use warp::reply::Response;
use warp::Reply;

use crate::application::reply::HttpReply;
use crate::shared::metrics::MetricsSummary;

impl Reply for HttpReply {
    fn into_response(self) -> Response {
        let HttpReply {
            status,
            content_type,
            nosniff,
            body,
        } = self;

        let mut response = body.into_response();
        *response.status_mut() = status;

        let headers = response.headers_mut();
        match content_type {
            Some(content_type) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            None => {
                headers.remove(CONTENT_TYPE);
            }
        }
        if nosniff {
            headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        }

        response
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: String,
    pub methods: Vec<String>,
    pub content_types: Vec<String>,
    pub timestamp: String,
    pub metrics: MetricsSummary,
}

/// Response formatter for auxiliary endpoints
pub struct ResponseFormatter;

impl ResponseFormatter {
    /// Format a health check response
    pub fn health(health: &HealthResponse) -> warp::reply::Json {
        warp::reply::json(health)
    }

    /// Format prometheus text exposition
    pub fn metrics(text: String) -> impl Reply {
        warp::reply::with_header(text, CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")
    }
}
