//! Metrics handler module

use std::sync::Arc;
use tracing::error;
use warp::http::StatusCode;
use warp::Reply;

use crate::application::reply::HttpReply;
use crate::infrastructure::http::responses::ResponseFormatter;
use crate::shared::metrics::DispatchMetrics;

/// Handle Prometheus metrics requests
pub async fn handle_metrics_request(metrics: Arc<DispatchMetrics>) -> Result<warp::reply::Response, warp::reject::Rejection> {
    match metrics.gather_text() {
        Ok(text) => Ok(ResponseFormatter::metrics(text).into_response()),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            Ok(HttpReply::plain(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response())
        }
    }
}
