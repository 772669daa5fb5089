//! Task processor: decode, dispatch, send exactly one result.
//!
//! The [`TaskProcessorBuilder`] provides a fluent API for registering
//! handlers. The [`TaskProcessor`] runs each task through:
//! 1. Payload size check
//! 2. Request decode (method name, arguments, data dependencies)
//! 3. Handler dispatch by method name (or the fallback handler)
//! 4. One `send_result` call to the first expected result identifier
//!
//! A processor built without any handler echoes the payload back.
//!
//! # Example
//!
//! ```
//! use armonik_worker::processor::{MemorySink, Task, TaskProcessor};
//! use bytes::Bytes;
//!
//! # tokio_test_block(async {
//! let processor = TaskProcessor::builder()
//!     .handle("reverse", |request, _ctx| async move {
//!         let mut out = request.arguments().to_vec();
//!         out.reverse();
//!         Ok(Bytes::from(out))
//!     })
//!     .build();
//!
//! let sink = MemorySink::new();
//! let task = Task::new(&b"00000007reverse00000003abc"[..], vec!["r1".into()]);
//! let status = processor.process(&task, &sink).await;
//!
//! assert!(status.is_ok());
//! assert_eq!(&sink.results().await[0].1[..], b"cba");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

mod state;
mod task;

use std::future::Future;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;

use crate::error::{Result, WorkerError};
use crate::handler::{EchoHandler, Handler, HandlerRegistry, HandlerResult, TaskContext};
use crate::protocol::{Request, DEFAULT_MAX_PAYLOAD_SIZE};

pub use state::{ProcessStatus, TaskOutcome, TaskState};
pub use task::{MemorySink, ResultSink, Task};

use state::Execution;

/// Default worker name used in log spans.
pub const DEFAULT_WORKER_NAME: &str = "armonik-worker";

/// Processor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Payloads larger than this are rejected before decoding.
    pub max_payload_size: usize,
    /// Name recorded on every task span.
    pub name: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            name: DEFAULT_WORKER_NAME.to_string(),
        }
    }
}

/// Builder for configuring and creating a [`TaskProcessor`].
pub struct TaskProcessorBuilder {
    registry: HandlerRegistry,
    fallback: Option<Box<dyn Handler>>,
    config: ProcessorConfig,
}

impl TaskProcessorBuilder {
    /// Create a new processor builder.
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            fallback: None,
            config: ProcessorConfig::default(),
        }
    }

    /// Register a handler working on the raw request.
    pub fn handle<F, Fut>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(Request, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.register(method, handler);
        self
    }

    /// Register a handler with MsgPack-typed arguments and result.
    pub fn handle_typed<F, T, R, Fut>(mut self, method: &str, handler: F) -> Self
    where
        F: Fn(T, TaskContext) -> Fut + Send + Sync + 'static,
        T: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        self.registry.register_typed(method, handler);
        self
    }

    /// Use a prebuilt registry, replacing any handler registered so far.
    pub fn registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Handler for method names missing from the registry.
    ///
    /// Without one, unknown methods fail with `HandlerNotFound`.
    pub fn fallback<H: Handler>(mut self, handler: H) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Set the maximum accepted payload size in bytes.
    ///
    /// Default: 1 GiB
    pub fn max_payload_size(mut self, limit: usize) -> Self {
        self.config.max_payload_size = limit;
        self
    }

    /// Set the worker name recorded on task spans.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Replace all settings at once.
    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the processor.
    ///
    /// With no handler and no fallback, the processor echoes payloads.
    pub fn build(self) -> TaskProcessor {
        let fallback = match self.fallback {
            Some(handler) => Some(handler),
            None if self.registry.is_empty() => Some(Box::new(EchoHandler) as Box<dyn Handler>),
            None => None,
        };

        TaskProcessor {
            registry: self.registry,
            fallback,
            config: self.config,
        }
    }
}

impl Default for TaskProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateless task processor.
///
/// Holds no per-task state; share it behind an `Arc` and call
/// [`run`](Self::run) concurrently for distinct tasks.
pub struct TaskProcessor {
    registry: HandlerRegistry,
    fallback: Option<Box<dyn Handler>>,
    config: ProcessorConfig,
}

impl TaskProcessor {
    /// Create a new processor builder.
    pub fn builder() -> TaskProcessorBuilder {
        TaskProcessorBuilder::new()
    }

    /// Echo processor: every task's result is its own payload.
    pub fn echo(config: ProcessorConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Processor settings.
    #[inline]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Handlers registered on this processor.
    #[inline]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Process one task and report only the status.
    pub async fn process(&self, task: &Task, sink: &dyn ResultSink) -> ProcessStatus {
        self.run(task, sink).await.status
    }

    /// Process one task and report the full outcome.
    pub async fn run(&self, task: &Task, sink: &dyn ResultSink) -> TaskOutcome {
        let span = tracing::info_span!(
            "task",
            worker = %self.config.name,
            task_id = task.task_id().unwrap_or("-"),
            session_id = task.session_id().unwrap_or("-"),
        );

        async {
            let mut execution = Execution::new();
            execution.transition(TaskState::Processing);

            tracing::info!(
                "Received task: {} payload bytes, {} expected results",
                task.payload().len(),
                task.expected_results().len()
            );

            match self.execute(task, sink).await {
                Ok(result_id) => {
                    execution.transition(TaskState::Completed);
                    tracing::info!("Task completed, result sent to {}", result_id);
                    TaskOutcome::completed(result_id)
                }
                Err(e) => {
                    execution.transition(TaskState::Failed);
                    if e.is_decode_error() {
                        tracing::error!("Task payload rejected: {}", e);
                    } else {
                        tracing::error!("Task failed: {}", e);
                    }
                    TaskOutcome::failed(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, task: &Task, sink: &dyn ResultSink) -> Result<String> {
        let payload = task.payload();
        if payload.len() > self.config.max_payload_size {
            return Err(WorkerError::MalformedFrame(format!(
                "payload of {} bytes exceeds limit of {} bytes",
                payload.len(),
                self.config.max_payload_size
            )));
        }

        let request = Request::decode_bytes(payload)?;
        tracing::debug!(
            "Decoded request: method {}, {} argument bytes, {} data dependencies",
            request.method_name(),
            request.arguments().len(),
            request.data_dependencies().len()
        );

        let (result_id, unresolved) = task
            .expected_results()
            .split_first()
            .ok_or_else(|| WorkerError::Processing("task has no expected results".into()))?;

        let ctx = TaskContext::new(task, request.data_dependencies().to_vec());
        let output = self.dispatch(request, ctx).await?;

        sink.send_result(result_id, output).await?;

        if !unresolved.is_empty() {
            tracing::warn!(
                "Only the first expected result is produced; {} left unresolved: {}",
                unresolved.len(),
                unresolved.join(", ")
            );
        }

        Ok(result_id.clone())
    }

    async fn dispatch(&self, request: Request, ctx: TaskContext) -> Result<Bytes> {
        if self.registry.contains(request.method_name()) {
            return self.registry.dispatch(request, ctx).await;
        }

        match &self.fallback {
            Some(handler) => handler.call(request, ctx).await,
            None => Err(WorkerError::HandlerNotFound(
                request.method_name().to_string(),
            )),
        }
    }
}

impl Default for TaskProcessor {
    fn default() -> Self {
        Self::echo(ProcessorConfig::default())
    }
}
