//! Task context for handlers.
//!
//! Gives a handler read access to everything the runtime supplied for the
//! task besides the decoded request:
//! - `payload` - the raw task payload, exactly as received
//! - `expected_results` - result identifiers the runtime expects
//! - `task_id` / `session_id` - identifiers for logging
//! - `data_dependencies` - ids of the blobs the request references
//!
//! Handlers do not send results themselves: they return the output bytes
//! and the processor sends them, once.

use std::sync::Arc;

use bytes::Bytes;

use crate::processor::Task;

/// Context passed to task handlers.
///
/// `TaskContext` is `Clone` (cheap, shared) and can be moved into spawned
/// tasks.
#[derive(Debug, Clone)]
pub struct TaskContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    payload: Bytes,
    expected_results: Vec<String>,
    task_id: Option<String>,
    session_id: Option<String>,
    data_dependencies: Vec<String>,
}

impl TaskContext {
    /// Create a context for `task` (testing and custom runtimes).
    pub fn new(task: &Task, data_dependencies: Vec<String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                payload: task.payload().clone(),
                expected_results: task.expected_results().to_vec(),
                task_id: task.task_id().map(str::to_owned),
                session_id: task.session_id().map(str::to_owned),
                data_dependencies,
            }),
        }
    }

    /// The raw task payload.
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.inner.payload
    }

    /// Result identifiers expected by the runtime, in order.
    #[inline]
    pub fn expected_results(&self) -> &[String] {
        &self.inner.expected_results
    }

    /// Task identifier, when the runtime supplied one.
    #[inline]
    pub fn task_id(&self) -> Option<&str> {
        self.inner.task_id.as_deref()
    }

    /// Session identifier, when the runtime supplied one.
    #[inline]
    pub fn session_id(&self) -> Option<&str> {
        self.inner.session_id.as_deref()
    }

    /// Data dependency ids from the decoded request.
    #[inline]
    pub fn data_dependencies(&self) -> &[String] {
        &self.inner.data_dependencies
    }
}
