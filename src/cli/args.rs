/*!
Command-line argument parsing (spec §6, `original_source/judged/__main__.py`'s
`argparse` setup).
*/

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// JudgeD: a probabilistic Datalog engine with tabled SLG resolution.
#[derive(Parser, Debug)]
#[command(name = "judged", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Fix one world up front and ask whether a goal holds in it.
    #[command(alias = "det")]
    Deterministic(SharedArgs),

    /// Ask against every possible world at once, returning each answer's
    /// defining sentence.
    #[command(alias = "ex")]
    Exact(SharedArgs),

    /// Repeatedly sample a world and report each answer's observed
    /// frequency.
    #[command(alias = "mc")]
    Montecarlo {
        #[command(flatten)]
        shared: SharedArgs,

        /// Maximum number of simulation runs. Zero means unbounded.
        #[arg(short = 'n', long, default_value_t = 1000)]
        number: usize,

        /// Maximum allowable RMSE for convergence; zero disables early
        /// termination and always runs `number` iterations.
        #[arg(short = 'a', long = "approximate", default_value_t = 0.0)]
        tolerance: f64,
    },
}

#[derive(clap::Args, Debug)]
pub struct SharedArgs {
    /// Input files to process in batch, in order.
    pub files: Vec<PathBuf>,

    /// Enters interactive mode after processing the given files.
    #[arg(short = 'i', long = "import")]
    pub interactive_after_import: bool,

    /// Outputs each performed statement before running it.
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Outputs each query before answering it.
    #[arg(short = 'v', long = "verbose-questions")]
    pub verbose_questions: bool,
}

impl Mode {
    pub fn shared(&self) -> &SharedArgs {
        match self {
            Mode::Deterministic(s) => s,
            Mode::Exact(s) => s,
            Mode::Montecarlo { shared, .. } => shared,
        }
    }
}
