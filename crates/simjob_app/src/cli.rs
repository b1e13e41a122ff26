use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use crate::plan::{JobPlan, PlanError};
use crate::presets::Preset;

#[derive(Debug, Parser)]
#[command(name = "simjob", version, about = "Simulated multi-stage job runner")]
pub struct Cli {
    /// Also write logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    /// Do not log to the terminal.
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LevelFilter,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the jobs of a plan file, or a single preset job.
    Run(RunArgs),
    /// List the built-in solution presets.
    Presets,
    /// Print a sample plan in RON, or write it to a file.
    SamplePlan {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// RON plan file.
    #[arg(long, conflicts_with_all = ["preset", "duration_ms"])]
    pub plan: Option<PathBuf>,
    /// Preset to run when no plan is given.
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,
    #[arg(long, allow_negative_numbers = true)]
    pub duration_ms: Option<i64>,
    /// Override the plan's tick interval.
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Override the plan's log cadence.
    #[arg(long)]
    pub log_every: Option<u8>,
    /// Print engine events as JSON lines instead of progress rows.
    #[arg(long)]
    pub json: bool,
    /// Accept pause/resume/cancel commands on stdin.
    #[arg(long)]
    pub interactive: bool,
}

impl RunArgs {
    pub fn resolve_plan(&self) -> Result<JobPlan, PlanError> {
        let mut plan = match &self.plan {
            Some(path) => JobPlan::load(path)?,
            None => JobPlan::from_preset(
                self.preset.unwrap_or(Preset::AttributeExtraction),
                self.duration_ms,
            ),
        };
        if let Some(tick_ms) = self.tick_ms {
            plan.tick_interval_ms = tick_ms;
        }
        if let Some(every) = self.log_every {
            plan.log_every_percent = every;
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> RunArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Run(run) => run,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn preset_run_uses_overrides() {
        let args = run_args(&[
            "simjob",
            "run",
            "--preset",
            "low-hanging-fruit",
            "--duration-ms",
            "2500",
            "--tick-ms",
            "50",
            "--log-every",
            "10",
        ]);
        let plan = args.resolve_plan().unwrap();
        assert_eq!(plan.tick_interval_ms, 50);
        assert_eq!(plan.log_every_percent, 10);
        assert_eq!(plan.jobs[0].duration_ms, 2500);
        assert_eq!(plan.jobs[0].preset.as_deref(), Some("low-hanging-fruit"));
    }

    #[test]
    fn default_run_is_attribute_extraction() {
        let plan = run_args(&["simjob", "run"]).resolve_plan().unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(
            plan.jobs[0].duration_ms,
            Preset::AttributeExtraction.default_duration_ms()
        );
    }

    #[test]
    fn negative_duration_parses_and_fails_validation_later() {
        let plan = run_args(&["simjob", "run", "--duration-ms", "-5"])
            .resolve_plan()
            .unwrap();
        assert!(plan.job_specs().is_err());
    }

    #[test]
    fn plan_conflicts_with_preset() {
        let result =
            Cli::try_parse_from(["simjob", "run", "--plan", "a.ron", "--preset", "collection-builder"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_logging_flags() {
        let cli =
            Cli::try_parse_from(["simjob", "presets", "--quiet", "--log-level", "debug"]).unwrap();
        assert!(cli.quiet);
        assert_eq!(cli.log_level, LevelFilter::Debug);
        assert!(matches!(cli.command, Command::Presets));
    }
}
