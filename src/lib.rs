//! # armonik-worker
//!
//! Rust worker SDK for ArmoniK tasks.
//!
//! A task arrives as an opaque payload plus a list of expected result
//! identifiers. The payload packs a method call as length-prefixed fields:
//!
//! ```text
//! ┌──────────┬─────────────┬──────────┬───────────┬──────────┬────────┬───
//! │ 8 hex    │ method_name │ 8 hex    │ arguments │ 8 hex    │ dep id │ ...
//! │ length   │ (UTF-8)     │ length   │ (bytes)   │ length   │ (UTF-8)│
//! └──────────┴─────────────┴──────────┴───────────┴──────────┴────────┴───
//! ```
//!
//! ## Architecture
//!
//! - **Protocol**: field framing and [`Request`] decode/encode
//! - **Handlers**: method name to handler dispatch, MsgPack-typed helpers
//! - **Processor**: one task in, exactly one result out
//! - **Config / logging**: `appsettings.json` + environment, `tracing` setup
//!
//! ## Example
//!
//! ```
//! use armonik_worker::{MemorySink, Task, TaskProcessor};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let processor = TaskProcessor::builder()
//!     .handle_typed("add", |(a, b): (i64, i64), _ctx| async move { Ok(a + b) })
//!     .build();
//!
//! let args = armonik_worker::codec::MsgPackCodec::encode(&(40i64, 2i64)).unwrap();
//! let request = armonik_worker::Request::new("add", args, vec![]);
//! let task = Task::new(request.encode().unwrap(), vec!["result-1".into()]);
//!
//! let sink = MemorySink::new();
//! assert!(processor.process(&task, &sink).await.is_ok());
//! # });
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod processor;
pub mod protocol;

pub use config::{ComputePlane, Configuration, Endpoint};
pub use error::{ErrorKind, Result, WorkerError};
pub use handler::{HandlerRegistry, TaskContext};
pub use logging::{LogConfig, LogFormat};
pub use processor::{
    MemorySink, ProcessStatus, ProcessorConfig, ResultSink, Task, TaskOutcome, TaskProcessor,
    TaskProcessorBuilder, TaskState,
};
pub use protocol::Request;
