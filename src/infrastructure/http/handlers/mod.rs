//! HTTP route handlers module
//!
//! One handler per endpoint type.

pub mod health;
pub mod metrics;
pub mod rpc;

pub use health::handle_health_request;
pub use metrics::handle_metrics_request;
pub use rpc::{handle_rpc_rejection, handle_rpc_request};
