use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use engine_logging::engine_warn;
use progress_engine::JobId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Pause(JobId),
    Resume(JobId),
    Cancel(JobId),
    /// Cancel everything still running and exit.
    Quit,
}

pub const HELP: &str = "commands: p <id> pause, r <id> resume, c <id> cancel, q quit";

pub fn parse_command(line: &str) -> Option<ConsoleCommand> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?;
    if matches!(verb, "q" | "quit") {
        return parts.next().is_none().then_some(ConsoleCommand::Quit);
    }
    let job_id: JobId = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    match verb {
        "p" | "pause" => Some(ConsoleCommand::Pause(job_id)),
        "r" | "resume" => Some(ConsoleCommand::Resume(job_id)),
        "c" | "cancel" => Some(ConsoleCommand::Cancel(job_id)),
        _ => None,
    }
}

/// Reads commands from stdin on a background thread.
pub fn spawn_stdin_reader() -> mpsc::Receiver<ConsoleCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => {
                    engine_warn!("Unrecognized command {:?}", line);
                    eprintln!("{HELP}");
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(parse_command("p 1"), Some(ConsoleCommand::Pause(1)));
        assert_eq!(parse_command("  resume   2 "), Some(ConsoleCommand::Resume(2)));
        assert_eq!(parse_command("cancel 3"), Some(ConsoleCommand::Cancel(3)));
        assert_eq!(parse_command("q"), Some(ConsoleCommand::Quit));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("p"), None);
        assert_eq!(parse_command("p x"), None);
        assert_eq!(parse_command("p 1 2"), None);
        assert_eq!(parse_command("jump 1"), None);
        assert_eq!(parse_command("q now"), None);
    }
}
