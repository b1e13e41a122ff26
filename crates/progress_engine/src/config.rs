use std::time::Duration;

use progress_core::ProgressSettings;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How often each job re-evaluates its progress.
    pub tick_interval: Duration,
    pub progress: ProgressSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            progress: ProgressSettings::default(),
        }
    }
}
