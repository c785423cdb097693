//! HTTP utilities - Filter helpers shared by the routes

use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::reject::{Reject, Rejection};
use warp::Filter;

use crate::application::dispatcher::RpcServer;
use crate::shared::metrics::DispatchMetrics;

/// Helper function to inject the dispatcher into route
pub fn with_server<R>(
    server: Arc<RpcServer<R>>,
) -> impl Filter<Extract = (Arc<RpcServer<R>>,), Error = std::convert::Infallible> + Clone
where
    R: Send + Sync + 'static,
{
    warp::any().map(move || server.clone())
}

/// Helper function to inject dispatch metrics into route
pub fn with_metrics(
    metrics: Arc<DispatchMetrics>,
) -> impl Filter<Extract = (Arc<DispatchMetrics>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || metrics.clone())
}

/// Filter matching the given path segments in order
pub fn mount<S: AsRef<str>>(segments: &[S]) -> BoxedFilter<()> {
    segments.iter().fold(warp::any().boxed(), |filter, segment| {
        filter.and(warp::path(segment.as_ref().to_string())).boxed()
    })
}

/// Rejection for a declared Content-Length above the configured limit
#[derive(Debug)]
pub struct BodyTooLarge {
    pub length: u64,
    pub limit: usize,
}

impl Reject for BodyTooLarge {}

/// Reject on the declared Content-Length before any body byte is read.
///
/// Requests without the header pass; their size is checked once buffered.
pub fn within_length_limit(limit: Option<usize>) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and_then(move |length: Option<u64>| async move {
            match (length, limit) {
                (Some(length), Some(limit)) if length > limit as u64 => {
                    Err(warp::reject::custom(BodyTooLarge { length, limit }))
                }
                _ => Ok::<(), Rejection>(()),
            }
        })
        .untuple_one()
}
