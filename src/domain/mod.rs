//! Domain layer - Core RPC model
//!
//! Wire-level request/response/error types, the service registry and the
//! per-call context. Nothing here depends on the HTTP stack beyond header and
//! status types.

pub mod context;
pub mod path;
pub mod rpc;
pub mod service;

pub use context::RequestContext;
pub use rpc::{ErrorCode, RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
pub use service::{
    ArgsSlot, CallError, LookupError, MethodDescriptor, RegistrationError, ServiceBuilder,
    ServiceDescriptor, TypeMarker, TypedSlot,
};
