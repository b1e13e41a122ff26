use std::io;

use progress_core::ProgressError;
use thiserror::Error;

use crate::JobId;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine: {0}")]
    Io(#[from] io::Error),
    #[error("unknown job {0}")]
    UnknownJob(JobId),
    #[error("engine has shut down")]
    Disconnected,
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
