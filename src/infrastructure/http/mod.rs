//! HTTP infrastructure module
//!
//! warp integration: server, routes, handlers and reply conversion.

pub mod handlers;
pub mod responses;
pub mod routes;
pub mod server;
pub mod utils;

pub use responses::{HealthResponse, ResponseFormatter};
pub use server::HttpServer;
