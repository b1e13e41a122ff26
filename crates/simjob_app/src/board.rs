use std::collections::{BTreeMap, BTreeSet};

use progress_engine::{EngineEvent, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub name: String,
    pub percent: u8,
    pub stage: Option<String>,
    pub last_log: Option<String>,
    pub outcome: Option<Outcome>,
}

impl JobRowView {
    fn new(job_id: JobId, name: String) -> Self {
        Self {
            job_id,
            name,
            percent: 0,
            stage: None,
            last_log: None,
            outcome: None,
        }
    }
}

/// What the terminal shows: one row per job, fed by engine events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobBoard {
    jobs: BTreeMap<JobId, JobRowView>,
    changed: BTreeSet<JobId>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, job_id: JobId, name: impl Into<String>) {
        self.jobs.insert(job_id, JobRowView::new(job_id, name.into()));
        self.changed.insert(job_id);
    }

    /// Applies an event. Events for unregistered or finished jobs are ignored.
    pub fn apply(&mut self, event: &EngineEvent) {
        let job_id = event.job_id();
        let Some(row) = self.jobs.get_mut(&job_id) else {
            return;
        };
        if row.outcome.is_some() {
            return;
        }
        match event {
            EngineEvent::Progress { percent, .. } => row.percent = *percent,
            EngineEvent::StageChanged { stage, .. } => row.stage = Some(stage.clone()),
            EngineEvent::Log { line, .. } => row.last_log = Some(line.message.clone()),
            EngineEvent::Completed { .. } => row.outcome = Some(Outcome::Completed),
            EngineEvent::Cancelled { .. } => row.outcome = Some(Outcome::Cancelled),
            EngineEvent::Failed { message, .. } => {
                row.outcome = Some(Outcome::Failed(message.clone()))
            }
        }
        self.changed.insert(job_id);
    }

    pub fn view(&self) -> Vec<JobRowView> {
        self.jobs.values().cloned().collect()
    }

    /// Rows touched since the last call, in job order.
    pub fn drain_changed(&mut self) -> Vec<JobRowView> {
        let changed = std::mem::take(&mut self.changed);
        changed
            .into_iter()
            .filter_map(|job_id| self.jobs.get(&job_id).cloned())
            .collect()
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.keys().copied().collect()
    }

    pub fn is_finished(&self, job_id: JobId) -> bool {
        self.jobs
            .get(&job_id)
            .is_some_and(|row| row.outcome.is_some())
    }

    pub fn all_finished(&self) -> bool {
        self.jobs.values().all(|row| row.outcome.is_some())
    }
}
