use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("target duration must be positive, got {duration_ms} ms")]
    InvalidDuration { duration_ms: i64 },
    #[error("job has already been started")]
    AlreadyStarted,
    /// A listener callback failed. Returned unchanged so the caller sees its own error.
    #[error(transparent)]
    Listener(anyhow::Error),
}
