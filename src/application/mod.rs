//! Application layer - Codec contract and request dispatch
//!
//! This module turns transport-neutral HTTP requests into service calls and
//! their outcomes back into HTTP replies.

pub mod codec;
pub mod dispatcher;
pub mod reply;

pub use codec::{Codec, CodecTable, DecodeError, DecodedCall, ReplyTo};
pub use dispatcher::{DispatchOptions, InboundRequest, MalformedRequestReply, RpcServer};
pub use reply::HttpReply;
