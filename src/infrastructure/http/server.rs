//! HTTP server implementation
//!
//! Wires a service into a dispatcher according to `AppConfig` and serves it
//! with warp.

use std::sync::Arc;
use tracing::{info, instrument};
use warp::{Filter, Reply};

use crate::application::dispatcher::RpcServer;
use crate::config::AppConfig;
use crate::domain::service::ServiceDescriptor;
use crate::infrastructure::codec::JsonRpc2Codec;
use crate::infrastructure::http::routes::RouteBuilder;
use crate::shared::error::AppResult;

/// HTTP front end for one RPC service
pub struct HttpServer<R> {
    config: AppConfig,
    server: Arc<RpcServer<R>>,
}

impl<R> HttpServer<R>
where
    R: Send + Sync + 'static,
{
    /// Serve an already assembled dispatcher
    pub fn new(config: AppConfig, server: RpcServer<R>) -> Self {
        Self {
            config,
            server: Arc::new(server),
        }
    }

    /// Build the dispatcher for `service` from the configuration: one
    /// JSON-RPC 2.0 codec per configured content type.
    pub fn from_config(config: AppConfig, service: ServiceDescriptor<R>) -> AppResult<Self> {
        let server = Self::build_dispatcher(&config, service)?;
        Ok(Self::new(config, server))
    }

    pub fn build_dispatcher(config: &AppConfig, service: ServiceDescriptor<R>) -> AppResult<RpcServer<R>> {
        let codec = Arc::new(
            JsonRpc2Codec::new()
                .with_notification_suppression(config.rpc.suppress_notification_replies)
                .with_path_check(config.rpc.check_path_method),
        );

        let mut server = RpcServer::new(service)?.with_options(config.dispatch_options()?);
        for content_type in &config.rpc.content_types {
            server.register_codec(codec.clone(), content_type);
        }
        Ok(server)
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<RpcServer<R>> {
        &self.server
    }

    /// All routes of this server
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = warp::Rejection> + Clone {
        RouteBuilder::build_routes(&self.config, self.server.clone())
    }

    /// Run the HTTP server until the process is stopped
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let addr = self.config.socket_addr();
        let mount_path = format!("/{}", self.config.mount_segments().join("/"));

        info!(
            address = %addr,
            service = %self.server.service().name(),
            methods = ?self.server.service().method_names(),
            mount_path = %mount_path,
            "Starting RPC server"
        );

        warp::serve(self.routes()).run(addr).await;

        Ok(())
    }
}
