use crate::LogLine;

/// Receives everything a running job reports.
///
/// Errors are not swallowed: the first failing callback aborts the current
/// controller call and the error is handed back to whoever drove it.
pub trait ProgressListener: Send {
    fn on_progress(&mut self, percent: u8) -> anyhow::Result<()> {
        let _ = percent;
        Ok(())
    }

    fn on_stage_change(&mut self, stage: &str) -> anyhow::Result<()> {
        let _ = stage;
        Ok(())
    }

    fn on_log(&mut self, line: &LogLine) -> anyhow::Result<()> {
        let _ = line;
        Ok(())
    }

    /// Fires once, and only when the job runs to 100 %.
    fn on_complete(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

type Handler<T> = Option<Box<dyn FnMut(T) + Send>>;

/// Closure-based listener for callers that don't need fallible callbacks.
#[derive(Default)]
pub struct Callbacks {
    progress: Handler<u8>,
    stage: Handler<String>,
    log: Handler<LogLine>,
    complete: Option<Box<dyn FnMut() + Send>>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress(mut self, f: impl FnMut(u8) + Send + 'static) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    pub fn on_stage_change(mut self, f: impl FnMut(String) + Send + 'static) -> Self {
        self.stage = Some(Box::new(f));
        self
    }

    pub fn on_log(mut self, f: impl FnMut(LogLine) + Send + 'static) -> Self {
        self.log = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

impl ProgressListener for Callbacks {
    fn on_progress(&mut self, percent: u8) -> anyhow::Result<()> {
        if let Some(f) = self.progress.as_mut() {
            f(percent);
        }
        Ok(())
    }

    fn on_stage_change(&mut self, stage: &str) -> anyhow::Result<()> {
        if let Some(f) = self.stage.as_mut() {
            f(stage.to_string());
        }
        Ok(())
    }

    fn on_log(&mut self, line: &LogLine) -> anyhow::Result<()> {
        if let Some(f) = self.log.as_mut() {
            f(line.clone());
        }
        Ok(())
    }

    fn on_complete(&mut self) -> anyhow::Result<()> {
        if let Some(f) = self.complete.as_mut() {
            f();
        }
        Ok(())
    }
}
