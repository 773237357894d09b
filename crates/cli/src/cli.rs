use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, name = "powerline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
    /// Log filter directives, e.g. `powerline_circuit=trace`.
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// lists the built-in gate kinds.
    Kinds,
    /// prints the truth table of a gate kind.
    Table {
        /// Kind identifier, e.g. `fulladder`.
        kind: String,
    },
    /// lists the levels of a level pack.
    Levels {
        /// Level pack to load instead of the built-in one.
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// runs a clock driving a NOT gate and prints every transition.
    Clock {
        /// Number of clock emissions to run for.
        #[arg(short, long, default_value = "6")]
        ticks: usize,
        /// Clock period in milliseconds.
        #[arg(short, long, default_value = "500")]
        period_ms: u64,
    },
}
