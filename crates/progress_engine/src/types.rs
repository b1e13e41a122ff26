use progress_core::{JobTimer, LogLine, ProgressError, StageDefinition};
use serde::{Deserialize, Serialize};

pub type JobId = u64;

/// What to simulate: a named job of a given length split into weighted stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    pub duration_ms: i64,
    #[serde(default)]
    pub stages: Vec<StageDefinition>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, duration_ms: i64, stages: Vec<StageDefinition>) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            stages,
        }
    }

    /// Checks the same preconditions the controller enforces at start.
    pub fn validate(&self) -> Result<(), ProgressError> {
        JobTimer::start(self.duration_ms, 0).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    Progress { job_id: JobId, percent: u8 },
    StageChanged { job_id: JobId, stage: String },
    Log { job_id: JobId, line: LogLine },
    Completed { job_id: JobId },
    Cancelled { job_id: JobId },
    /// The job ended because reporting one of its events failed.
    Failed { job_id: JobId, message: String },
}

impl EngineEvent {
    pub fn job_id(&self) -> JobId {
        match self {
            EngineEvent::Progress { job_id, .. }
            | EngineEvent::StageChanged { job_id, .. }
            | EngineEvent::Log { job_id, .. }
            | EngineEvent::Completed { job_id }
            | EngineEvent::Cancelled { job_id }
            | EngineEvent::Failed { job_id, .. } => *job_id,
        }
    }

    /// True for the last event a job ever produces.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EngineEvent::Completed { .. } | EngineEvent::Cancelled { .. } | EngineEvent::Failed { .. }
        )
    }
}
