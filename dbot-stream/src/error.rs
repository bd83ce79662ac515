use thiserror::Error;

/// Outcome error of a [`crate::PendingEdit`]. Cloneable so every waiter gets the same value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoalescerError {
    /// The initial send failed; the message does not exist remotely.
    #[error("Initial send failed: {0}")]
    SendFailed(String),

    /// The task driving a remote call panicked or was cancelled.
    #[error("Edit task failed: {0}")]
    TaskFailed(String),
}

impl From<CoalescerError> for dbot_core::DbotError {
    fn from(e: CoalescerError) -> Self {
        dbot_core::DbotError::Stream(e.to_string())
    }
}
