//! Scenario validation CLI for the timing engine
//!
//! Runs a scripted scenario (actors, casts, channels, effects and clock
//! advances) through a fresh engine, prints every signal with its sim-time
//! stamp, and verifies the checkpoints embedded in the scenario.

mod logging;
mod output;
mod replay;
mod scenario;
mod verification;

use std::path::PathBuf;

use clap::Parser;

use cadence_core::load_config;

use crate::output::{CliOutput, OutputLevel};
use crate::replay::ScenarioRunner;
use crate::scenario::Scenario;

// ═══════════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "cadence-validate")]
#[command(about = "Run timing-engine scenarios and verify their checkpoints")]
#[command(version)]
struct Args {
    /// Path to the scenario TOML file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Engine config file; replaces the scenario's [config] table
    #[arg(short, long)]
    config: Option<PathBuf>,

    // ─────────────────────────────────────────────────────────────────────────
    // Output Mode
    // ─────────────────────────────────────────────────────────────────────────
    /// Quiet mode: summary and failures only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode: also show ticks and each step
    #[arg(short, long)]
    verbose: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════════

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init();

    let output_level = if args.quiet {
        OutputLevel::Quiet
    } else if args.verbose {
        OutputLevel::Verbose
    } else {
        OutputLevel::Normal
    };
    let mut cli = CliOutput::new(output_level, !args.no_color);

    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(config_path) = &args.config {
        scenario.config = load_config(config_path)?;
    }

    tracing::debug!(
        scenario = %scenario.meta.name,
        actors = scenario.actors.len(),
        steps = scenario.steps.len(),
        "scenario loaded"
    );

    cli.header(
        &scenario.meta.name,
        scenario.meta.description.as_deref(),
        scenario.steps.len(),
        scenario.checkpoint_count(),
    );

    let report = ScenarioRunner::new(&scenario).run(&scenario.steps, &mut cli);
    cli.print_summary(
        report.end_ms,
        &report.verification,
        report.unexpected_rejections,
    );

    // Exit with error code if verification failed
    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}
