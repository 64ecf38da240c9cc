//! Parameter sweep over the elimination solvers.
//!
//! Runs exponential-gap elimination and the multi-round distributed solver on
//! synthetic Bernoulli bandits whose best arm is the last one, and writes one
//! CSV row per run to `expgap_results.csv` and `multiround_results.csv` in the
//! current directory.
//!
//! ```text
//! RUST_LOG=pacbandit=debug cargo run --release --example parameter_sweep
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use pacbandit::{
    BernoulliArm, ExpGapElimination, MultiRoundEpsilonArm, Result, Solution, Solver,
    make_bernoulli_bandit_with_gap,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

const HEADER: &str = "num_arms,min_gap,num_threads,epsilon,delta,elapsed,pulls,solved,outcome";

const NUM_ARMS: [usize; 3] = [10, 50, 100];
const MIN_GAPS: [f64; 2] = [0.2, 0.1];
const EPSILONS: [f64; 2] = [0.1, 0.05];
const DELTA: f64 = 0.05;
const PLAYERS: [usize; 3] = [1, 2, 4];

/// One row of a results table.
struct Run {
    num_arms: usize,
    min_gap: f64,
    num_threads: usize,
    epsilon: f64,
    delta: f64,
    elapsed: f64,
    solution: Solution,
}

impl Run {
    fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        // The best arm is always the last one.
        let solved = self.solution.arm == self.num_arms - 1;
        writeln!(
            out,
            "{},{},{},{},{},{:.6},{},{},{:?}",
            self.num_arms,
            self.min_gap,
            self.num_threads,
            self.epsilon,
            self.delta,
            self.elapsed,
            self.solution.pulls,
            u8::from(solved),
            self.solution.outcome,
        )?;
        Ok(())
    }
}

fn timed<S: Solver<BernoulliArm>>(solver: &S, arms: &[BernoulliArm]) -> Result<(Solution, f64)> {
    let start = Instant::now();
    let solution = solver.solve(arms)?;
    Ok((solution, start.elapsed().as_secs_f64()))
}

fn create_table(path: &str) -> Result<BufWriter<File>> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{HEADER}")?;
    Ok(out)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(2013);
    let mut exp_gap_out = create_table("expgap_results.csv")?;
    let mut multi_round_out = create_table("multiround_results.csv")?;

    for &num_arms in &NUM_ARMS {
        for &min_gap in &MIN_GAPS {
            let arms = make_bernoulli_bandit_with_gap(num_arms, min_gap, &mut rng)?;

            for &epsilon in &EPSILONS {
                let solver = ExpGapElimination::new(epsilon, DELTA)?;
                let (solution, elapsed) = timed(&solver, &arms)?;
                info!(
                    solver = Solver::<BernoulliArm>::name(&solver),
                    num_arms,
                    min_gap,
                    epsilon,
                    arm = solution.arm,
                    pulls = solution.pulls,
                    elapsed,
                    "run finished"
                );
                Run {
                    num_arms,
                    min_gap,
                    num_threads: 1,
                    epsilon,
                    delta: DELTA,
                    elapsed,
                    solution,
                }
                .write_to(&mut exp_gap_out)?;

                for &players in &PLAYERS {
                    let solver = MultiRoundEpsilonArm::new(players, epsilon, DELTA)?;
                    let (solution, elapsed) = timed(&solver, &arms)?;
                    info!(
                        solver = Solver::<BernoulliArm>::name(&solver),
                        num_arms,
                        min_gap,
                        epsilon,
                        players,
                        arm = solution.arm,
                        pulls = solution.pulls,
                        elapsed,
                        "run finished"
                    );
                    Run {
                        num_arms,
                        min_gap,
                        num_threads: players,
                        epsilon,
                        delta: DELTA,
                        elapsed,
                        solution,
                    }
                    .write_to(&mut multi_round_out)?;
                }
            }
        }
    }

    exp_gap_out.flush()?;
    multi_round_out.flush()?;
    info!("results written to expgap_results.csv and multiround_results.csv");
    Ok(())
}
