//! Health routes module

use std::sync::Arc;
use warp::Filter;

use crate::application::dispatcher::RpcServer;
use crate::infrastructure::http::handlers::handle_health_request;
use crate::infrastructure::http::utils::with_server;

/// Health routes configuration
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health check endpoint route
    pub fn create_health_route<R>(
        server: Arc<RpcServer<R>>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
    where
        R: Send + Sync + 'static,
    {
        warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_server(server))
            .and_then(handle_health_request::<R>)
    }
}
