//! Progress engine: runs simulated jobs on a timer and reports their events.
mod config;
mod engine;
mod error;
mod sink;
mod types;

pub use config::{EngineConfig, DEFAULT_TICK_INTERVAL};
pub use engine::EngineHandle;
pub use error::EngineError;
pub use sink::ChannelListener;
pub use types::{EngineEvent, JobId, JobSpec};
