#![deny(missing_docs)]
//! Shared logging utilities for the simjob workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a thread-local job scope so records can be attributed to the job being
//! ticked, and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Job currently being processed on this thread, if any.
    static CURRENT_JOB: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Returns the job id installed by the innermost live [`JobScope`] on this thread.
pub fn current_job() -> Option<u64> {
    CURRENT_JOB.with(|v| v.get())
}

/// Guard that marks the current thread as working on a job.
///
/// The previous scope is restored on drop, so scopes nest. Scopes must not be
/// held across an `.await`.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct JobScope {
    previous: Option<u64>,
}

impl JobScope {
    /// Enters the scope of `job_id` until the returned guard is dropped.
    pub fn enter(job_id: u64) -> Self {
        let previous = CURRENT_JOB.with(|v| v.replace(Some(job_id)));
        Self { previous }
    }
}

impl Drop for JobScope {
    fn drop(&mut self) {
        CURRENT_JOB.with(|v| v.set(self.previous));
    }
}

#[doc(hidden)]
pub fn __job_prefix() -> String {
    match current_job() {
        Some(id) => format!("[job {id}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::__job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::__job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::__job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::__job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::__job_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_nest_and_restore() {
        assert_eq!(current_job(), None);
        {
            let _outer = JobScope::enter(1);
            assert_eq!(current_job(), Some(1));
            {
                let _inner = JobScope::enter(2);
                assert_eq!(current_job(), Some(2));
                assert_eq!(__job_prefix(), "[job 2] ");
            }
            assert_eq!(current_job(), Some(1));
        }
        assert_eq!(current_job(), None);
        assert_eq!(__job_prefix(), "");
    }
}
