//! Batch comparison: many generated mazes, every requested algorithm on each.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::MazeConfig;
use crate::error::Result;
use crate::generator::generate_with_rng;
use crate::search::Algorithm;
use crate::trace::StepRecord;

/// Batch request as it arrives on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub maze_config: MazeConfig,
    pub num_mazes: usize,
    pub algorithms: Vec<String>,
}

/// Per-algorithm averages over a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub algorithm: Algorithm,
    pub success_rate: f64,
    pub avg_time_ms: f64,
    pub avg_nodes: f64,
    /// Averaged over successful runs only.
    pub avg_path_length: f64,
    pub avg_steps: f64,
    pub avg_frontier: f64,
}

#[derive(Debug, Clone, Default)]
struct Tally {
    runs: usize,
    successes: usize,
    time: Duration,
    nodes: usize,
    path_length: usize,
    steps: usize,
    frontier: usize,
}

impl Tally {
    fn record(&mut self, last: &StepRecord, elapsed: Duration) {
        self.runs += 1;
        self.time += elapsed;
        self.nodes += last.nodes_expanded();
        self.steps += last.steps_taken();
        self.frontier += last.max_frontier_size();
        if last.success {
            self.successes += 1;
            self.path_length += last.path_length;
        }
    }

    fn summarize(&self, algorithm: Algorithm) -> BatchSummary {
        let runs = self.runs as f64;
        BatchSummary {
            algorithm,
            success_rate: self.successes as f64 / runs,
            avg_time_ms: self.time.as_secs_f64() * 1000.0 / runs,
            avg_nodes: self.nodes as f64 / runs,
            avg_path_length: if self.successes > 0 {
                self.path_length as f64 / self.successes as f64
            } else {
                0.0
            },
            avg_steps: self.steps as f64 / runs,
            avg_frontier: self.frontier as f64 / runs,
        }
    }
}

/// Resolve names up front so a bad request never starts generating.
/// Duplicates collapse onto their first occurrence.
pub fn parse_algorithms(names: &[String]) -> Result<Vec<Algorithm>> {
    let mut algorithms = Vec::with_capacity(names.len());
    for name in names {
        let algorithm: Algorithm = name.parse()?;
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }
    Ok(algorithms)
}

/// Run a batch with the RNG the maze config asks for.
pub fn run_batch(config: &BatchConfig) -> Result<Vec<BatchSummary>> {
    let mut rng = config.maze_config.rng();
    run_batch_with_rng(config, &mut rng)
}

/// Each round generates one maze shared by every algorithm, so they are
/// compared on identical input.
pub fn run_batch_with_rng<R: Rng + ?Sized>(
    config: &BatchConfig,
    rng: &mut R,
) -> Result<Vec<BatchSummary>> {
    let algorithms = parse_algorithms(&config.algorithms)?;
    config.maze_config.validate()?;

    let mut tallies = vec![Tally::default(); algorithms.len()];
    for round in 0..config.num_mazes {
        let grid = generate_with_rng(&config.maze_config, rng)?;

        for (algorithm, tally) in algorithms.iter().zip(tallies.iter_mut()) {
            let started = Instant::now();
            let last = algorithm.trace(&grid).summary();
            let elapsed = started.elapsed();
            if let Some(last) = last {
                tally.record(&last, elapsed);
            }
        }
        debug!(round, "batch round complete");
    }

    info!(
        mazes = config.num_mazes,
        algorithms = algorithms.len(),
        "batch finished"
    );

    Ok(algorithms
        .into_iter()
        .zip(tallies)
        .filter(|(_, tally)| tally.runs > 0)
        .map(|(algorithm, tally)| tally.summarize(algorithm))
        .collect())
}
