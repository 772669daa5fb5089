//! Codec module - serialization helpers for method arguments.
//!
//! Task arguments are opaque bytes on the wire. Handlers registered with
//! [`HandlerRegistry::register_typed`](crate::handler::HandlerRegistry::register_typed)
//! decode them with [`MsgPackCodec`] and encode their result the same way.

mod msgpack;

pub use msgpack::MsgPackCodec;
