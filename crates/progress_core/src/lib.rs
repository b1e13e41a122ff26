//! Progress core: timer, stage mapping and the job progress state machine.
//!
//! Everything here is synchronous and clock-injected. Something else (the
//! engine crate, or a test) is expected to call [`ProgressController::tick`]
//! periodically.
mod clock;
mod controller;
mod error;
mod listener;
mod log_line;
mod stage;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{JobState, ProgressController, ProgressSettings, DEFAULT_LOG_EVERY_PERCENT};
pub use error::ProgressError;
pub use listener::{Callbacks, ProgressListener};
pub use log_line::LogLine;
pub use stage::{StageDefinition, StageMapper, DEFAULT_STAGE};
pub use timer::{JobTimer, RunState};
