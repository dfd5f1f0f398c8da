/*!
Entry point providing batch and REPL access to JudgeD (spec §6,
`original_source/judged/__main__.py`).
*/

use clap::Parser;

use judged::config::Config;
use judged::context::{Context, DeterministicContext, ExactContext, MonteCarloContext};

mod args;
mod repl;

use args::{Cli, Mode};

/// Entrypoint to the CLI.
fn main() {
    #[cfg(feature = "cli-logging")]
    env_logger::init();

    let cli = Cli::parse();
    let shared = cli.mode.shared();

    let mut ctx: Box<dyn Context> = match &cli.mode {
        Mode::Deterministic(_) => Box::new(DeterministicContext::from_config(Config::default())),
        Mode::Exact(_) => Box::new(ExactContext::from_config(Config::default())),
        Mode::Montecarlo { number, tolerance, .. } => Box::new(
            MonteCarloContext::from_config(Config::default())
                .with_iterations(*number)
                .with_tolerance(*tolerance),
        ),
    };

    if !shared.files.is_empty() {
        if repl::batch(ctx.as_mut(), &shared.files, shared.verbose, shared.verbose_questions).is_err() {
            std::process::exit(1);
        }
        if shared.interactive_after_import {
            repl::interactive(ctx.as_mut(), shared.verbose, shared.verbose_questions);
        }
    } else {
        repl::interactive(ctx.as_mut(), shared.verbose, shared.verbose_questions);
    }
}
