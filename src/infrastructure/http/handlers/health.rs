//! Health check handler module

use std::sync::Arc;
use warp::Reply;

use crate::application::dispatcher::RpcServer;
use crate::infrastructure::http::responses::{HealthResponse, ResponseFormatter};

/// Handle health check requests
pub async fn handle_health_request<R>(server: Arc<RpcServer<R>>) -> Result<impl Reply, warp::reject::Rejection>
where
    R: Send + Sync + 'static,
{
    let health = HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: server.service().name().to_string(),
        methods: server
            .service()
            .method_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        content_types: server
            .codecs()
            .content_types()
            .into_iter()
            .map(str::to_string)
            .collect(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        metrics: server.metrics().summary(),
    };

    Ok(ResponseFormatter::health(&health))
}
