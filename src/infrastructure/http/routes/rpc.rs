//! RPC routes module
//!
//! Every HTTP method is accepted under the mount path; the dispatcher decides
//! what is allowed. A declared Content-Length above the limit is refused
//! before the body is read.

use std::sync::Arc;
use warp::Filter;

use crate::application::dispatcher::RpcServer;
use crate::infrastructure::http::handlers::{handle_rpc_rejection, handle_rpc_request};
use crate::infrastructure::http::utils::{mount, with_server, within_length_limit};

/// RPC routes configuration
pub struct RpcRoutes;

impl RpcRoutes {
    /// Create the RPC endpoint route under `mount_segments`
    pub fn create_rpc_route<R>(
        mount_segments: &[String],
        server: Arc<RpcServer<R>>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
    where
        R: Send + Sync + 'static,
    {
        let limit = server.options().max_request_size;

        mount(mount_segments)
            .and(warp::method())
            .and(warp::path::full())
            .and(warp::header::headers_cloned())
            .and(within_length_limit(limit))
            .and(warp::body::bytes())
            .and(with_server(server))
            .and_then(handle_rpc_request::<R>)
            .recover(handle_rpc_rejection)
    }
}
