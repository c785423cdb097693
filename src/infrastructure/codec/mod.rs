//! Wire codecs

pub mod jsonrpc2;

pub use jsonrpc2::JsonRpc2Codec;
