//! `schedule-plan` - prints checkpoint-schedule action traces.
//!
//! # Commands
//!
//! - `schedule-plan hrevolve --max-n <N> --ram <R> --disk <D>` - builds
//!   an optimal H-Revolve schedule and prints every action it emits.
//! - `schedule-plan two-level --steps <N> --period <P> --binomial-snapshots <S>`
//!   - drives the periodic/binomial schedule through one forward phase
//!   and one reverse pass.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;

pub use error::{CliError, Result};

/// Checkpoint-schedule planning CLI.
#[derive(Parser)]
#[command(name = "schedule-plan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an optimal H-Revolve schedule and print its action trace.
    HRevolve {
        /// Total number of forward steps.
        #[arg(long)]
        max_n: usize,

        /// RAM slot count.
        #[arg(long, default_value_t = 2)]
        ram: usize,

        /// Disk slot count.
        #[arg(long, default_value_t = 0)]
        disk: usize,

        /// Cost of a single forward step.
        #[arg(long, default_value_t = 1.0)]
        cfwd: f64,

        /// Cost of a single backward step.
        #[arg(long, default_value_t = 2.0)]
        cbwd: f64,

        /// RAM write cost.
        #[arg(long, default_value_t = 0.0)]
        write_ram: f64,

        /// Disk write cost.
        #[arg(long, default_value_t = 0.1)]
        write_disk: f64,

        /// RAM read cost.
        #[arg(long, default_value_t = 0.0)]
        read_ram: f64,

        /// Disk read cost.
        #[arg(long, default_value_t = 0.1)]
        read_disk: f64,
    },

    /// Drive a two-level (periodic disk / binomial RAM) schedule and
    /// print one forward phase plus one reverse pass.
    TwoLevel {
        /// Total number of forward steps for the toy simulation.
        #[arg(long)]
        steps: usize,

        /// Steps between consecutive disk checkpoints.
        #[arg(long, default_value_t = 4)]
        period: usize,

        /// Number of in-memory binomial checkpoints held per block.
        #[arg(long, default_value_t = 2)]
        binomial_snapshots: usize,

        /// Storage tier for binomial checkpoints ("ram" or "disk").
        #[arg(long, default_value = "ram")]
        binomial_storage: String,

        /// Binomial advance-selection trajectory.
        #[arg(long, default_value = "maximum")]
        trajectory: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::HRevolve {
            max_n,
            ram,
            disk,
            cfwd,
            cbwd,
            write_ram,
            write_disk,
            read_ram,
            read_disk,
        } => commands::hrevolve::run(
            max_n, ram, disk, cfwd, cbwd, write_ram, write_disk, read_ram, read_disk,
        )?,
        Commands::TwoLevel {
            steps,
            period,
            binomial_snapshots,
            binomial_storage,
            trajectory,
        } => commands::two_level::run(steps, period, binomial_snapshots, &binomial_storage, &trajectory)?,
    }

    Ok(())
}
