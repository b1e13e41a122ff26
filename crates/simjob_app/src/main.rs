mod board;
mod cli;
mod console;
mod logging;
mod plan;
mod presets;
mod render;
mod runner;

use std::fs;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Command};
use logging::LogDestination;
use plan::JobPlan;
use presets::Preset;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(destination) = LogDestination::select(cli.log_file.clone(), cli.quiet) {
        logging::initialize(destination, cli.log_level);
    }

    match &cli.command {
        Command::Run(args) => runner::execute(args),
        Command::Presets => {
            for preset in Preset::ALL {
                let stages: Vec<String> = preset
                    .stages()
                    .iter()
                    .map(|stage| format!("{} {}%", stage.name, stage.weight_percent))
                    .collect();
                println!(
                    "{:<22} {:<28} {:>6} ms  {}",
                    preset.key(),
                    preset.label(),
                    preset.default_duration_ms(),
                    stages.join(", ")
                );
            }
            Ok(())
        }
        Command::SamplePlan { output } => {
            let text = JobPlan::sample()
                .to_ron()
                .context("serializing sample plan")?;
            match output {
                Some(path) => fs::write(path, text)
                    .with_context(|| format!("writing sample plan to {path:?}")),
                None => {
                    println!("{text}");
                    Ok(())
                }
            }
        }
    }
}
