/*!
Configuration of a context (spec §4.H, expansion).

The knobs that were constructor arguments in the original
(`MontecarloContext(number, approximate)`) are gathered into one
`Config`, passed to each context variant's `from_config`, rather than
threading loose parameters through constructors.
*/

/// The primary configuration structure for a context.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The default Monte Carlo iteration cap (`0` means unbounded, as in
    /// the original's `number=0`).
    pub montecarlo_iterations: usize,

    /// The default Monte Carlo convergence tolerance: sampling stops
    /// once the root-mean-square error between observed and exact world
    /// probabilities drops to or below this value.
    pub montecarlo_tolerance: f64,

    /// The SLG prover's safety-net bound on subgoals explored in a
    /// single `ask` (spec §4.F), surfaced as [crate::types::JudgedError::Limit]
    /// when exceeded.
    pub prover_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            montecarlo_iterations: 1000,
            montecarlo_tolerance: 0.0,
            prover_limit: 1_000_000,
        }
    }
}
