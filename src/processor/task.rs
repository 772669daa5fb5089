//! Incoming task and the result sink supplied by the runtime.

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::handler::BoxFuture;

/// One unit of work handed over by the runtime.
#[derive(Debug, Clone)]
pub struct Task {
    payload: Bytes,
    expected_results: Vec<String>,
    task_id: Option<String>,
    session_id: Option<String>,
}

impl Task {
    /// Create a task from its payload and expected result identifiers.
    pub fn new(payload: impl Into<Bytes>, expected_results: Vec<String>) -> Self {
        Self {
            payload: payload.into(),
            expected_results,
            task_id: None,
            session_id: None,
        }
    }

    /// Attach the runtime's task identifier (used for logging).
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Attach the runtime's session identifier (used for logging).
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Raw payload bytes.
    #[inline]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Expected result identifiers, in runtime order.
    #[inline]
    pub fn expected_results(&self) -> &[String] {
        &self.expected_results
    }

    /// Task identifier, if any.
    #[inline]
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Session identifier, if any.
    #[inline]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Destination for task results, implemented by the runtime.
pub trait ResultSink: Send + Sync {
    /// Deliver `data` as the content of the result named `result_id`.
    fn send_result<'a>(&'a self, result_id: &'a str, data: Bytes) -> BoxFuture<'a, Result<()>>;
}

/// In-memory sink recording every `send_result` call.
///
/// Useful for tests and for runtimes that upload results after the
/// processor returns.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<(String, Bytes)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All results sent so far, in order.
    pub async fn results(&self) -> Vec<(String, Bytes)> {
        self.sent.lock().await.clone()
    }

    /// Drain the recorded results.
    pub async fn take(&self) -> Vec<(String, Bytes)> {
        std::mem::take(&mut *self.sent.lock().await)
    }
}

impl ResultSink for MemorySink {
    fn send_result<'a>(&'a self, result_id: &'a str, data: Bytes) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.sent.lock().await.push((result_id.to_string(), data));
            Ok(())
        })
    }
}
