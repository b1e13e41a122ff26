use serde::Serialize;

use crate::ProgressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Running,
    Paused,
    Completed,
    Stopped,
}

/// Converts wall-clock milliseconds into a 0-100 percentage, excluding paused time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTimer {
    started_at: u64,
    target_duration_ms: u64,
    paused_accumulated_ms: u64,
    pause_started_at: Option<u64>,
    state: RunState,
    percent: u8,
}

impl JobTimer {
    /// Starts a run at `now`. Non-positive durations are rejected up front.
    pub fn start(target_duration_ms: i64, now: u64) -> Result<Self, ProgressError> {
        let target = u64::try_from(target_duration_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ProgressError::InvalidDuration {
                duration_ms: target_duration_ms,
            })?;
        Ok(Self {
            started_at: now,
            target_duration_ms: target,
            paused_accumulated_ms: 0,
            pause_started_at: None,
            state: RunState::Running,
            percent: 0,
        })
    }

    /// Recomputes progress at `now`. Outside `Running` the last value is returned as is.
    pub fn tick(&mut self, now: u64) -> u8 {
        if self.state != RunState::Running {
            return self.percent;
        }
        let elapsed = now
            .saturating_sub(self.started_at)
            .saturating_sub(self.paused_accumulated_ms);
        let raw = u128::from(elapsed) * 100 / u128::from(self.target_duration_ms);
        let percent = u8::try_from(raw.min(100)).unwrap_or(100);
        // A clock that steps backwards must not move the bar backwards.
        self.percent = self.percent.max(percent);
        if self.percent == 100 {
            self.state = RunState::Completed;
        }
        self.percent
    }

    /// Returns true when the timer actually moved to `Paused`.
    pub fn pause(&mut self, now: u64) -> bool {
        if self.state != RunState::Running {
            return false;
        }
        self.state = RunState::Paused;
        self.pause_started_at = Some(now);
        true
    }

    /// Returns true when the timer actually moved back to `Running`.
    pub fn resume(&mut self, now: u64) -> bool {
        if self.state != RunState::Paused {
            return false;
        }
        if let Some(paused_at) = self.pause_started_at.take() {
            self.paused_accumulated_ms += now.saturating_sub(paused_at);
        }
        self.state = RunState::Running;
        true
    }

    /// Freezes the timer. Finished timers are left alone.
    pub fn stop(&mut self) -> bool {
        match self.state {
            RunState::Running | RunState::Paused => {
                self.state = RunState::Stopped;
                self.pause_started_at = None;
                true
            }
            RunState::Completed | RunState::Stopped => false,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn target_duration_ms(&self) -> u64 {
        self.target_duration_ms
    }

    pub fn paused_accumulated_ms(&self) -> u64 {
        self.paused_accumulated_ms
    }
}
