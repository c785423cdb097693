//! Route builder module
//!
//! Combines the auxiliary endpoints with the RPC endpoint. The auxiliary
//! routes are tried first so an empty mount path does not shadow them.

use std::sync::Arc;
use warp::Filter;

use crate::application::dispatcher::RpcServer;
use crate::config::AppConfig;
use crate::infrastructure::http::routes::{HealthRoutes, MetricsRoutes, RpcRoutes};

/// Route builder that orchestrates the creation of all application routes
pub struct RouteBuilder;

impl RouteBuilder {
    /// Build all application routes
    pub fn build_routes<R>(
        config: &AppConfig,
        server: Arc<RpcServer<R>>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
    where
        R: Send + Sync + 'static,
    {
        let health_route = HealthRoutes::create_health_route(server.clone());
        let metrics_route = MetricsRoutes::create_metrics_route(server.metrics().clone());
        let rpc_route = RpcRoutes::create_rpc_route(&config.mount_segments(), server);

        health_route.or(metrics_route).or(rpc_route)
    }
}
