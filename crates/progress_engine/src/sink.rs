use std::sync::mpsc;

use anyhow::anyhow;
use progress_core::{LogLine, ProgressListener};

use crate::{EngineEvent, JobId};

/// Forwards controller callbacks for one job onto the engine's event channel.
///
/// A dropped receiver is reported as a listener error, which ends the job.
pub struct ChannelListener {
    job_id: JobId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelListener {
    pub fn new(job_id: JobId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { job_id, tx }
    }

    fn emit(&self, event: EngineEvent) -> anyhow::Result<()> {
        self.tx
            .send(event)
            .map_err(|_| anyhow!("event receiver for job {} hung up", self.job_id))
    }
}

impl ProgressListener for ChannelListener {
    fn on_progress(&mut self, percent: u8) -> anyhow::Result<()> {
        self.emit(EngineEvent::Progress {
            job_id: self.job_id,
            percent,
        })
    }

    fn on_stage_change(&mut self, stage: &str) -> anyhow::Result<()> {
        self.emit(EngineEvent::StageChanged {
            job_id: self.job_id,
            stage: stage.to_string(),
        })
    }

    fn on_log(&mut self, line: &LogLine) -> anyhow::Result<()> {
        self.emit(EngineEvent::Log {
            job_id: self.job_id,
            line: line.clone(),
        })
    }

    fn on_complete(&mut self) -> anyhow::Result<()> {
        self.emit(EngineEvent::Completed {
            job_id: self.job_id,
        })
    }
}
