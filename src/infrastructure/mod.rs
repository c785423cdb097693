//! Infrastructure layer - Wire codecs and HTTP serving
//!
//! Concrete codecs and the warp-based HTTP front end.

pub mod codec;
pub mod http;

pub use codec::JsonRpc2Codec;
pub use http::HttpServer;
