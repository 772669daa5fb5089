//! Handler module - method handlers and dispatch.
//!
//! Provides:
//! - [`HandlerRegistry`] - maps method names to handlers
//! - [`TaskContext`] - task-level data a handler may need besides the request
//! - [`EchoHandler`] - the baseline handler: the result is the payload itself
//!
//! # Example
//!
//! ```
//! use armonik_worker::handler::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::new();
//!
//! // Return the raw arguments unchanged
//! registry.register("identity", |request, _ctx| async move {
//!     Ok(request.arguments_bytes())
//! });
//!
//! // MsgPack-typed arguments and result
//! registry.register_typed("add_floats", |(a, b): (f32, f32), _ctx| async move {
//!     Ok(a + b)
//! });
//! ```

mod context;
mod registry;

pub use context::TaskContext;
pub use registry::{
    BoxFuture, EchoHandler, FnHandler, Handler, HandlerRegistry, HandlerResult, TypedHandler,
};
