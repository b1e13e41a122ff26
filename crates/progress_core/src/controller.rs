use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use engine_logging::{engine_debug, engine_info};
use serde::{Deserialize, Serialize};

use crate::{
    Clock, JobTimer, LogLine, ProgressError, ProgressListener, RunState, StageDefinition,
    StageMapper,
};

/// Default spacing, in percent, between routine progress log lines.
pub const DEFAULT_LOG_EVERY_PERCENT: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// A log line is written each time progress crosses a multiple of this
    /// value. Zero limits routine lines to 0 % and 100 %.
    pub log_every_percent: u8,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            log_every_percent: DEFAULT_LOG_EVERY_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Idle,
    Running,
    Paused,
    Completed,
    Stopped,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Stopped)
    }
}

/// Drives one simulated job: owns its timer, stage cursor and log, and reports
/// to a [`ProgressListener`].
///
/// `Idle -> Running <-> Paused`, `Running -> Completed`,
/// `Running | Paused -> Stopped`. A finished controller is never restarted;
/// create a new one instead.
///
/// The job only counts as `Completed` once `on_complete` has returned `Ok`.
/// If a callback fails while the timer sits at 100 %, the job stays `Running`
/// and the next `tick` resumes the completion sequence where it stopped.
pub struct ProgressController {
    clock: Arc<dyn Clock>,
    settings: ProgressSettings,
    run: Option<ActiveRun>,
}

struct ActiveRun {
    state: JobState,
    timer: JobTimer,
    mapper: StageMapper,
    listener: Box<dyn ProgressListener>,
    /// Wall-clock time matching `timer.started_at()`; log timestamps are
    /// offset from it by the injected clock.
    started_utc: DateTime<Utc>,
    last_percent: Option<u8>,
    stage_index: Option<usize>,
    last_logged: Option<u8>,
    completion_logged: bool,
    logs: Vec<LogLine>,
}

impl ProgressController {
    pub fn new(clock: Arc<dyn Clock>, settings: ProgressSettings) -> Self {
        Self {
            clock,
            settings,
            run: None,
        }
    }

    /// Starts the job and reports its initial state straight away.
    ///
    /// Fails without side effects when the duration is not positive or the
    /// controller was already used.
    pub fn run<L>(
        &mut self,
        target_duration_ms: i64,
        stages: Vec<StageDefinition>,
        listener: L,
    ) -> Result<(), ProgressError>
    where
        L: ProgressListener + 'static,
    {
        if self.run.is_some() {
            return Err(ProgressError::AlreadyStarted);
        }
        let now = self.clock.now_ms();
        let timer = JobTimer::start(target_duration_ms, now)?;
        engine_info!(
            "Starting job: duration_ms={} stages={}",
            timer.target_duration_ms(),
            stages.len()
        );

        let mut run = ActiveRun {
            state: JobState::Running,
            timer,
            mapper: StageMapper::new(stages),
            listener: Box::new(listener),
            started_utc: Utc::now(),
            last_percent: None,
            stage_index: None,
            last_logged: None,
            completion_logged: false,
            logs: Vec::new(),
        };
        let message = format!(
            "Process started ({} stages, {} ms)",
            run.mapper.stages().len(),
            run.timer.target_duration_ms()
        );
        let started = run.log(now, message);
        self.run = Some(run);
        started?;
        self.tick()?;
        Ok(())
    }

    /// Evaluates elapsed time once and fires whatever callbacks are due.
    ///
    /// A callback is only marked as delivered once it returns `Ok`, so after
    /// an error the next tick repeats the progress, stage or completion
    /// callback that failed.
    pub fn tick(&mut self) -> Result<JobState, ProgressError> {
        let now = self.clock.now_ms();
        let log_every = self.settings.log_every_percent;
        let Some(run) = self.run.as_mut() else {
            return Ok(JobState::Idle);
        };
        if run.state != JobState::Running {
            return Ok(run.state);
        }

        let percent = run.timer.tick(now);
        if run.last_percent != Some(percent) {
            run.listener
                .on_progress(percent)
                .map_err(ProgressError::Listener)?;
            run.last_percent = Some(percent);
        }

        let index = run.mapper.stage_index(percent);
        if run.stage_index != Some(index) {
            let name = run.mapper.name_at(index).to_string();
            engine_debug!("Entering stage {} at {}%", name, percent);
            run.listener
                .on_stage_change(&name)
                .map_err(ProgressError::Listener)?;
            run.stage_index = Some(index);
        }

        if run.cadence_due(percent, log_every) {
            run.last_logged = Some(percent);
            let message = format!("{}: {}% complete", run.mapper.name_at(index), percent);
            run.log(now, message)?;
        }

        if run.timer.state() == RunState::Completed {
            if !run.completion_logged {
                engine_info!(
                    "Job completed after {} ms paused",
                    run.timer.paused_accumulated_ms()
                );
                run.completion_logged = true;
                run.log(now, "Process completed")?;
            }
            run.listener.on_complete().map_err(ProgressError::Listener)?;
            run.state = JobState::Completed;
        }

        Ok(run.state)
    }

    /// Returns true when the job actually moved to `Paused`.
    pub fn pause(&mut self) -> Result<bool, ProgressError> {
        let now = self.clock.now_ms();
        let Some(run) = self.run.as_mut() else {
            return Ok(false);
        };
        if run.state != JobState::Running || !run.timer.pause(now) {
            return Ok(false);
        }
        run.state = JobState::Paused;
        engine_info!("Job paused at {}%", run.timer.percent());
        run.log(now, "Process paused")?;
        Ok(true)
    }

    /// Returns true when the job actually moved back to `Running`.
    pub fn resume(&mut self) -> Result<bool, ProgressError> {
        let now = self.clock.now_ms();
        let Some(run) = self.run.as_mut() else {
            return Ok(false);
        };
        if run.state != JobState::Paused || !run.timer.resume(now) {
            return Ok(false);
        }
        run.state = JobState::Running;
        engine_info!(
            "Job resumed, paused total {} ms",
            run.timer.paused_accumulated_ms()
        );
        run.log(now, "Process resumed")?;
        Ok(true)
    }

    /// Stops a running or paused job for good. `on_complete` will not fire
    /// afterwards no matter how often `tick` is called.
    pub fn cancel(&mut self) -> Result<bool, ProgressError> {
        let now = self.clock.now_ms();
        let Some(run) = self.run.as_mut() else {
            return Ok(false);
        };
        if run.state.is_terminal() {
            return Ok(false);
        }
        // A timer already at 100 % refuses to stop; the job is still cancelled
        // because its completion was never delivered.
        run.timer.stop();
        run.state = JobState::Stopped;
        engine_info!("Job cancelled at {}%", run.timer.percent());
        run.log(now, "Process cancelled")?;
        Ok(true)
    }

    pub fn state(&self) -> JobState {
        self.run
            .as_ref()
            .map(|run| run.state)
            .unwrap_or(JobState::Idle)
    }

    pub fn percent(&self) -> u8 {
        self.run.as_ref().map(|run| run.timer.percent()).unwrap_or(0)
    }

    /// Active stage, once the first tick has run.
    pub fn stage_name(&self) -> Option<&str> {
        let run = self.run.as_ref()?;
        run.stage_index.map(|index| run.mapper.name_at(index))
    }

    pub fn paused_accumulated_ms(&self) -> u64 {
        self.run
            .as_ref()
            .map(|run| run.timer.paused_accumulated_ms())
            .unwrap_or(0)
    }

    pub fn log_lines(&self) -> &[LogLine] {
        self.run
            .as_ref()
            .map(|run| run.logs.as_slice())
            .unwrap_or(&[])
    }
}

impl ActiveRun {
    fn cadence_due(&self, percent: u8, every: u8) -> bool {
        match self.last_logged {
            None => true,
            Some(previous) if percent <= previous => false,
            Some(_) if percent == 100 => true,
            Some(_) if every == 0 => false,
            Some(previous) => percent / every > previous / every,
        }
    }

    /// Wall-clock time of `now` on the job's own timeline.
    fn timestamp(&self, now: u64) -> DateTime<Utc> {
        i64::try_from(now.saturating_sub(self.timer.started_at()))
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|offset| self.started_utc.checked_add_signed(offset))
            .unwrap_or(self.started_utc)
    }

    fn log(&mut self, now: u64, message: impl Into<String>) -> Result<(), ProgressError> {
        let line = LogLine::new(self.timestamp(now), self.timer.percent(), message);
        self.logs.push(line);
        if let Some(line) = self.logs.last() {
            self.listener.on_log(line).map_err(ProgressError::Listener)?;
        }
        Ok(())
    }
}
