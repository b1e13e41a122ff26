use std::io::{self, Write};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use progress_engine::{EngineEvent, EngineHandle};

use crate::board::{JobBoard, Outcome};
use crate::cli::RunArgs;
use crate::console::{self, ConsoleCommand};
use crate::render::render_row;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn execute(args: &RunArgs) -> anyhow::Result<()> {
    let plan = args.resolve_plan()?;
    let specs = plan.job_specs()?;
    let engine = EngineHandle::new(plan.engine_config()?).context("starting engine")?;

    let mut board = JobBoard::new();
    for spec in specs {
        let name = spec.name.clone();
        let job_id = engine
            .start(spec)
            .with_context(|| format!("starting job {name:?}"))?;
        board.register(job_id, name);
    }

    let commands = if args.interactive {
        eprintln!("{}", console::HELP);
        Some(console::spawn_stdin_reader())
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    while !board.all_finished() {
        if let Some(event) = engine.recv_timeout(POLL_INTERVAL) {
            handle_event(&mut board, &event, args.json, &mut out)?;
            while let Some(event) = engine.try_recv() {
                handle_event(&mut board, &event, args.json, &mut out)?;
            }
        }
        if let Some(commands) = &commands {
            apply_commands(&engine, &board, commands);
        }
        if !args.json {
            for row in board.drain_changed() {
                writeln!(out, "{}", render_row(&row))?;
            }
        }
    }
    if !args.json {
        writeln!(out, "{}", summarize(&board))?;
    }
    out.flush()?;
    engine_info!("All jobs finished");
    Ok(())
}

fn handle_event(
    board: &mut JobBoard,
    event: &EngineEvent,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    board.apply(event);
    Ok(())
}

fn apply_commands(engine: &EngineHandle, board: &JobBoard, commands: &mpsc::Receiver<ConsoleCommand>) {
    while let Ok(command) = commands.try_recv() {
        let result = match command {
            ConsoleCommand::Pause(job_id) => engine.pause(job_id),
            ConsoleCommand::Resume(job_id) => engine.resume(job_id),
            ConsoleCommand::Cancel(job_id) => engine.cancel(job_id),
            ConsoleCommand::Quit => board
                .job_ids()
                .into_iter()
                .filter(|job_id| !board.is_finished(*job_id))
                .try_for_each(|job_id| engine.cancel(job_id)),
        };
        if let Err(err) = result {
            engine_warn!("{:?} failed: {}", command, err);
            eprintln!("{err}");
        }
    }
}

fn summarize(board: &JobBoard) -> String {
    let rows = board.view();
    let count = |wanted: fn(&Outcome) -> bool| {
        rows.iter()
            .filter(|row| row.outcome.as_ref().is_some_and(wanted))
            .count()
    };
    format!(
        "{} jobs: {} completed, {} cancelled, {} failed",
        rows.len(),
        count(|o| matches!(o, Outcome::Completed)),
        count(|o| matches!(o, Outcome::Cancelled)),
        count(|o| matches!(o, Outcome::Failed(_))),
    )
}
