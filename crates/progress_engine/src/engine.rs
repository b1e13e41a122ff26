use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn, JobScope};
use progress_core::{Clock, JobState, ProgressController, ProgressError, SystemClock};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{ChannelListener, EngineConfig, EngineError, EngineEvent, JobId, JobSpec};

enum EngineCommand {
    Start { job_id: JobId, spec: JobSpec },
    Control { job_id: JobId, command: JobCommand },
}

#[derive(Debug, Clone, Copy)]
enum JobCommand {
    Pause,
    Resume,
    Cancel,
}

/// Owner-side handle of the engine thread.
///
/// Every job runs as its own task on a single-threaded runtime, with its own
/// controller and tick timer. Dropping the handle cancels all jobs and joins
/// the thread.
pub struct EngineHandle {
    cmd_tx: tokio_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    next_job_id: AtomicU64,
    shutdown: CancellationToken,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let (cmd_tx, cmd_rx) = tokio_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let shutdown = CancellationToken::new();

        let token = shutdown.clone();
        let thread = thread::Builder::new()
            .name("simjob-engine".to_string())
            .spawn(move || {
                runtime.block_on(run_engine(config, cmd_rx, event_tx, token));
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            next_job_id: AtomicU64::new(1),
            shutdown,
            thread: Some(thread),
        })
    }

    /// Validates and schedules a job. Invalid specs fail here, before any
    /// job state exists.
    pub fn start(&self, spec: JobSpec) -> Result<JobId, EngineError> {
        spec.validate()?;
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        engine_info!(
            "Start job_id={} name={} duration_ms={}",
            job_id,
            spec.name,
            spec.duration_ms
        );
        self.send(EngineCommand::Start { job_id, spec })?;
        Ok(job_id)
    }

    pub fn pause(&self, job_id: JobId) -> Result<(), EngineError> {
        self.control(job_id, JobCommand::Pause)
    }

    pub fn resume(&self, job_id: JobId) -> Result<(), EngineError> {
        self.control(job_id, JobCommand::Resume)
    }

    pub fn cancel(&self, job_id: JobId) -> Result<(), EngineError> {
        self.control(job_id, JobCommand::Cancel)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn control(&self, job_id: JobId, command: JobCommand) -> Result<(), EngineError> {
        if job_id == 0 || job_id >= self.next_job_id.load(Ordering::Relaxed) {
            return Err(EngineError::UnknownJob(job_id));
        }
        self.send(EngineCommand::Control { job_id, command })
    }

    fn send(&self, command: EngineCommand) -> Result<(), EngineError> {
        self.cmd_tx
            .send(command)
            .map_err(|_| EngineError::Disconnected)
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                engine_error!("Engine thread panicked");
            }
        }
    }
}

async fn run_engine(
    config: EngineConfig,
    mut cmd_rx: tokio_mpsc::UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
    shutdown: CancellationToken,
) {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let mut jobs: HashMap<JobId, tokio_mpsc::UnboundedSender<JobCommand>> = HashMap::new();
    let mut tasks: JoinSet<JobId> = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(finished) = tasks.join_next(), if !tasks.is_empty() => {
                match finished {
                    Ok(job_id) => {
                        jobs.remove(&job_id);
                    }
                    Err(err) => engine_error!("Job task aborted: {}", err),
                }
            }
            command = cmd_rx.recv() => match command {
                None => break,
                Some(EngineCommand::Start { job_id, spec }) => {
                    let (job_tx, job_rx) = tokio_mpsc::unbounded_channel();
                    jobs.insert(job_id, job_tx);
                    tasks.spawn(drive_job(
                        job_id,
                        spec,
                        ProgressController::new(clock.clone(), config.progress),
                        config.tick_interval,
                        job_rx,
                        shutdown.child_token(),
                        event_tx.clone(),
                    ));
                }
                Some(EngineCommand::Control { job_id, command }) => match jobs.get(&job_id) {
                    Some(job_tx) => {
                        let _ = job_tx.send(command);
                    }
                    None => engine_warn!("Ignoring {:?} for job {}: not running", command, job_id),
                },
            }
        }
    }

    shutdown.cancel();
    while tasks.join_next().await.is_some() {}
    engine_debug!("Engine stopped");
}

enum Step {
    Tick,
    Command(JobCommand),
}

async fn drive_job(
    job_id: JobId,
    spec: JobSpec,
    mut controller: ProgressController,
    tick_interval: Duration,
    mut commands: tokio_mpsc::UnboundedReceiver<JobCommand>,
    token: CancellationToken,
    events: mpsc::Sender<EngineEvent>,
) -> JobId {
    let listener = ChannelListener::new(job_id, events.clone());
    let started = {
        let _scope = JobScope::enter(job_id);
        controller.run(spec.duration_ms, spec.stages, listener)
    };
    if let Err(err) = started {
        report_failure(job_id, &events, err);
        return job_id;
    }

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first interval tick is immediate and `run` has already ticked once.
    ticker.tick().await;

    loop {
        let step = tokio::select! {
            _ = token.cancelled() => Step::Command(JobCommand::Cancel),
            command = commands.recv() => Step::Command(command.unwrap_or(JobCommand::Cancel)),
            _ = ticker.tick() => Step::Tick,
        };

        let _scope = JobScope::enter(job_id);
        let outcome = match step {
            Step::Tick => controller.tick(),
            Step::Command(JobCommand::Pause) => controller.pause().map(|_| controller.state()),
            Step::Command(JobCommand::Resume) => controller.resume().map(|_| controller.state()),
            Step::Command(JobCommand::Cancel) => controller.cancel().map(|_| controller.state()),
        };

        match outcome {
            Ok(JobState::Completed) => break,
            Ok(JobState::Stopped) => {
                let _ = events.send(EngineEvent::Cancelled { job_id });
                break;
            }
            Ok(_) => {}
            Err(err) => {
                report_failure(job_id, &events, err);
                break;
            }
        }
    }
    job_id
}

fn report_failure(job_id: JobId, events: &mpsc::Sender<EngineEvent>, err: ProgressError) {
    engine_error!("Job {} failed: {}", job_id, err);
    let _ = events.send(EngineEvent::Failed {
        job_id,
        message: err.to_string(),
    });
}
