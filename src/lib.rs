//! rpc-dispatch - JSON-RPC 2.0 over HTTP
//!
//! A single receiver's methods are published as RPC endpoints. Requests are
//! decoded by a content-type selected codec, routed to the named method,
//! and the result or error is encoded back.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

#[cfg(test)]
mod tests;

pub use application::{Codec, HttpReply, InboundRequest, MalformedRequestReply, RpcServer};
pub use config::AppConfig;
pub use domain::{RequestContext, RpcError, ServiceDescriptor};
pub use infrastructure::{HttpServer, JsonRpc2Codec};
pub use shared::error::{AppError, AppResult};
