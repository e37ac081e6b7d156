use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use liveness_core::{FrameOutcome, HeadMovement};
use tracing_subscriber::EnvFilter;

mod config;
mod replay;

#[derive(Parser)]
#[command(name = "liveness", version, about = "Face liveness check tooling")]
struct Cli {
    /// TOML file with liveness settings (LIVENESS_* env vars override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded detector output through a liveness session
    Replay {
        /// JSON replay script
        script: PathBuf,
        /// Seed for the challenge shuffle
        #[arg(long)]
        seed: Option<u64>,
        /// Fixed challenge order, e.g. right,up,left,down
        #[arg(long, value_delimiter = ',')]
        order: Vec<HeadMovement>,
        /// Print one JSON object per event instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the challenge order a session would use
    Challenges {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    let mut rng = rand::thread_rng();

    match cli.command {
        Command::Replay {
            script,
            seed,
            order,
            json,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            if !order.is_empty() {
                config.challenge_order = Some(order);
            }
            tracing::info!(script = %script.display(), "loading replay script");
            let script = replay::ReplayScript::from_file(&script)?;
            let report = replay::run(&script, &config, &mut rng)?;
            print_report(&report, json)?;
        }
        Command::Challenges { seed } => {
            if seed.is_some() {
                config.seed = seed;
            }
            let sequence = config.challenge_sequence(&mut rng)?;
            for (i, movement) in sequence.order().iter().enumerate() {
                println!("{}. {movement}  ({})", i + 1, movement.message_key().default_text());
            }
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn print_report(report: &replay::ReplayReport, json: bool) -> Result<()> {
    let mut failures = 0;
    let mut complete = false;

    for frame in &report.frames {
        if frame.outcome == FrameOutcome::DetectorFailed {
            failures += 1;
        }
        for event in &frame.events {
            complete |= *event == liveness_core::LivenessEvent::AllChallengesComplete;
            if json {
                let line = serde_json::json!({
                    "frame": frame.index,
                    "event": event.name(),
                    "detail": replay::event_detail(event),
                });
                println!("{}", serde_json::to_string(&line)?);
            } else {
                println!(
                    "{:>5}  {:<20} {}",
                    frame.index,
                    event.name(),
                    replay::event_detail(event)
                );
            }
        }
    }

    if !json {
        println!();
        println!(
            "{} frame(s), {} detector failure(s), liveness {}",
            report.frames.len(),
            failures,
            if complete { "passed" } else { "not completed" }
        );
    }
    Ok(())
}
