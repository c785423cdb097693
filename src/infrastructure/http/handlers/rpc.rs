//! RPC request handler module
//!
//! Hands the raw request to the dispatcher on the blocking pool, since
//! service methods are plain synchronous functions.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, error};
use warp::http::{HeaderMap, Method, StatusCode};
use warp::path::FullPath;
use warp::Reply;

use crate::application::dispatcher::{InboundRequest, RpcServer};
use crate::application::reply::HttpReply;
use crate::infrastructure::http::utils::BodyTooLarge;
use crate::shared::error::AppError;

/// Handle RPC requests
pub async fn handle_rpc_request<R>(
    method: Method,
    path: FullPath,
    headers: HeaderMap,
    body: Bytes,
    server: Arc<RpcServer<R>>,
) -> Result<impl Reply, warp::reject::Rejection>
where
    R: Send + Sync + 'static,
{
    let request = InboundRequest {
        method,
        path: path.as_str().to_string(),
        headers,
        body,
    };

    let reply = match tokio::task::spawn_blocking(move || server.handle(request)).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(error = %e, "RPC handler task failed");
            HttpReply::plain(StatusCode::INTERNAL_SERVER_ERROR, "rpc: internal server error")
        }
    };

    Ok(reply)
}

/// Answer an over-long declared body with a plain 413; other rejections pass on.
pub async fn handle_rpc_rejection(rejection: warp::Rejection) -> Result<HttpReply, warp::Rejection> {
    if let Some(too_large) = rejection.find::<BodyTooLarge>() {
        debug!(length = too_large.length, limit = too_large.limit, "request body over limit");
        let err = AppError::RequestTooLarge {
            size: usize::try_from(too_large.length).unwrap_or(usize::MAX),
            limit: too_large.limit,
        };
        return Ok(HttpReply::plain(err.http_status_code(), err.to_string()));
    }

    Err(rejection)
}
