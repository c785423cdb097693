//! Metrics routes module

use std::sync::Arc;
use warp::Filter;

use crate::infrastructure::http::handlers::handle_metrics_request;
use crate::infrastructure::http::utils::with_metrics;
use crate::shared::metrics::DispatchMetrics;

/// Metrics routes configuration
pub struct MetricsRoutes;

impl MetricsRoutes {
    /// Create the Prometheus metrics endpoint route
    pub fn create_metrics_route(
        metrics: Arc<DispatchMetrics>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("metrics")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_metrics(metrics))
            .and_then(handle_metrics_request)
    }
}
