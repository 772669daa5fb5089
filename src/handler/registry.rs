//! Handler registry for dispatching requests by method name.
//!
//! # Example
//!
//! ```
//! use armonik_worker::handler::HandlerRegistry;
//! use bytes::Bytes;
//!
//! let mut registry = HandlerRegistry::new();
//!
//! registry.register("reverse", |request, _ctx| async move {
//!     let mut out = request.arguments().to_vec();
//!     out.reverse();
//!     Ok(Bytes::from(out))
//! });
//!
//! registry.register_typed("add_ints", |(a, b): (i32, i32), _ctx| async move {
//!     Ok(a + b)
//! });
//!
//! assert_eq!(registry.names(), ["add_ints", "reverse"]);
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::TaskContext;
use crate::codec::MsgPackCodec;
use crate::error::{Result, WorkerError};
use crate::protocol::Request;

/// Result type for handler functions: the bytes to send as the task result.
pub type HandlerResult = Result<Bytes>;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for task handlers.
pub trait Handler: Send + Sync + 'static {
    /// Run the operation for a decoded request.
    fn call(&self, request: Request, ctx: TaskContext) -> BoxFuture<'static, HandlerResult>;
}

/// Adapter for closures taking the raw `Request`.
pub struct FnHandler<F, Fut>
where
    F: Fn(Request, TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnHandler<F, Fut>
where
    F: Fn(Request, TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Wrap a closure.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Handler for FnHandler<F, Fut>
where
    F: Fn(Request, TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, request: Request, ctx: TaskContext) -> BoxFuture<'static, HandlerResult> {
        Box::pin((self.handler)(request, ctx))
    }
}

/// Wrapper that decodes MsgPack arguments and encodes the MsgPack result.
pub struct TypedHandler<F, T, R, Fut>
where
    F: Fn(T, TaskContext) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(T) -> Fut>,
}

impl<F, T, R, Fut> TypedHandler<F, T, R, Fut>
where
    F: Fn(T, TaskContext) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, T, R, Fut> Handler for TypedHandler<F, T, R, Fut>
where
    F: Fn(T, TaskContext) -> Fut + Send + Sync + 'static,
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    Fut: Future<Output = Result<R>> + Send + 'static,
{
    fn call(&self, request: Request, ctx: TaskContext) -> BoxFuture<'static, HandlerResult> {
        let args: T = match MsgPackCodec::decode(request.arguments()) {
            Ok(v) => v,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        let fut = (self.handler)(args, ctx);
        Box::pin(async move {
            let output = fut.await?;
            Ok(Bytes::from(MsgPackCodec::encode(&output)?))
        })
    }
}

/// Baseline handler: the task result is the original payload, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl Handler for EchoHandler {
    fn call(&self, _request: Request, ctx: TaskContext) -> BoxFuture<'static, HandlerResult> {
        let payload = ctx.payload().clone();
        Box::pin(async move { Ok(payload) })
    }
}

/// Registry mapping method names to handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Box<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler working on the raw request.
    ///
    /// Registering a name twice replaces the earlier handler.
    pub fn register<F, Fut>(&mut self, name: &str, handler: F)
    where
        F: Fn(Request, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_handler(name, FnHandler::new(handler));
    }

    /// Register a handler with MsgPack-typed arguments and result.
    pub fn register_typed<F, T, R, Fut>(&mut self, name: &str, handler: F)
    where
        F: Fn(T, TaskContext) -> Fut + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        self.register_handler(name, TypedHandler::new(handler));
    }

    /// Register any [`Handler`] implementation.
    pub fn register_handler<H: Handler>(&mut self, name: &str, handler: H) {
        if self
            .handlers
            .insert(name.to_string(), Box::new(handler))
            .is_some()
        {
            tracing::debug!("Replaced handler for method {}", name);
        }
    }

    /// Get a handler by method name.
    pub fn get_handler(&self, name: &str) -> Option<&dyn Handler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    /// Check whether a method is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch a request to the handler registered for its method name.
    ///
    /// # Errors
    ///
    /// `HandlerNotFound` if no handler is registered, otherwise whatever the
    /// handler returns.
    pub async fn dispatch(&self, request: Request, ctx: TaskContext) -> HandlerResult {
        let handler = self
            .get_handler(request.method_name())
            .ok_or_else(|| WorkerError::HandlerNotFound(request.method_name().to_string()))?;

        handler.call(request, ctx).await
    }
}
