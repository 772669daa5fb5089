//! Task lifecycle and the status returned to the runtime.
//!
//! ```text
//! Idle ──► Processing ──► Completed
//!                    └──► Failed
//! ```

use std::fmt;

use crate::error::{ErrorKind, WorkerError};

/// Lifecycle state of a single task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Not started.
    Idle,
    /// Decoding, dispatching, or sending the result.
    Processing,
    /// Result handed to the sink.
    Completed,
    /// Stopped on an error; no result was sent.
    Failed,
}

impl TaskState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (TaskState::Idle, TaskState::Processing)
                | (TaskState::Processing, TaskState::Completed)
                | (TaskState::Processing, TaskState::Failed)
        )
    }

    /// Whether this state is final.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Idle => "idle",
            TaskState::Processing => "processing",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Status returned to the runtime after each task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The result was sent.
    Ok,
    /// The task failed; human-readable reason.
    Error(String),
}

impl ProcessStatus {
    /// Check if the task succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, ProcessStatus::Ok)
    }

    /// Error message, if the task failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ProcessStatus::Ok => None,
            ProcessStatus::Error(msg) => Some(msg),
        }
    }
}

/// Everything known about a finished task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// Terminal state (`Completed` or `Failed`).
    pub state: TaskState,
    /// Status for the runtime.
    pub status: ProcessStatus,
    /// Error classification when failed.
    pub error_kind: Option<ErrorKind>,
    /// Identifier the result was sent to when completed.
    pub result_id: Option<String>,
}

impl TaskOutcome {
    pub(crate) fn completed(result_id: String) -> Self {
        Self {
            state: TaskState::Completed,
            status: ProcessStatus::Ok,
            error_kind: None,
            result_id: Some(result_id),
        }
    }

    pub(crate) fn failed(error: &WorkerError) -> Self {
        Self {
            state: TaskState::Failed,
            status: ProcessStatus::Error(error.to_string()),
            error_kind: Some(error.kind()),
            result_id: None,
        }
    }
}

/// Per-invocation state tracker.
#[derive(Debug)]
pub(crate) struct Execution {
    state: TaskState,
}

impl Execution {
    pub(crate) fn new() -> Self {
        Self {
            state: TaskState::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn transition(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal task transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Task state {} -> {}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        assert!(TaskState::Idle.can_transition_to(TaskState::Processing));
        assert!(TaskState::Processing.can_transition_to(TaskState::Completed));
        assert!(TaskState::Processing.can_transition_to(TaskState::Failed));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!TaskState::Idle.can_transition_to(TaskState::Completed));
        assert!(!TaskState::Idle.can_transition_to(TaskState::Failed));
        assert!(!TaskState::Completed.can_transition_to(TaskState::Processing));
        assert!(!TaskState::Failed.can_transition_to(TaskState::Completed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Idle.is_terminal());
        assert!(!TaskState::Processing.is_terminal());
    }

    #[test]
    fn test_execution_walks_states() {
        let mut execution = Execution::new();
        assert_eq!(execution.state(), TaskState::Idle);
        execution.transition(TaskState::Processing);
        execution.transition(TaskState::Completed);
        assert_eq!(execution.state(), TaskState::Completed);
    }

    #[test]
    #[should_panic(expected = "illegal task transition")]
    #[cfg(debug_assertions)]
    fn test_execution_rejects_skipping_processing() {
        let mut execution = Execution::new();
        execution.transition(TaskState::Completed);
    }

    #[test]
    fn test_process_status() {
        assert!(ProcessStatus::Ok.is_ok());
        assert!(ProcessStatus::Ok.error_message().is_none());

        let status = ProcessStatus::Error("boom".into());
        assert!(!status.is_ok());
        assert_eq!(status.error_message(), Some("boom"));
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = TaskOutcome::failed(&WorkerError::MalformedFrame("short".into()));
        assert_eq!(outcome.state, TaskState::Failed);
        assert_eq!(outcome.error_kind, Some(ErrorKind::MalformedFrame));
        assert_eq!(
            outcome.status.error_message(),
            Some("Malformed frame: short")
        );
        assert!(outcome.result_id.is_none());
    }
}
