//! Search trace engine.
//!
//! Every algorithm is an iterator over [`StepRecord`]s. It holds its own
//! working set, parent map and counters, computes one record per `next()`
//! call and yields nothing once the terminal record has been produced.
//! Running the same algorithm twice on the same grid yields identical
//! sequences.

pub mod astar;
pub mod bidirectional;
pub mod first_visit;
pub mod iddfs;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MazeError;
use crate::grid::{Grid, Position};
use crate::neighbors::ParentMap;
use crate::trace::{StepRecord, TraceCounters};

pub use astar::AStar;
pub use bidirectional::Bidirectional;
pub use first_visit::{BreadthFirst, DepthFirst, FirstVisitSearch, Frontier, GreedyBestFirst};
pub use iddfs::IterativeDeepening;

/// The fixed set of solvers, named as on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "BFS")]
    BreadthFirst,
    #[serde(rename = "DFS")]
    DepthFirst,
    #[serde(rename = "Iterative Deepening DFS")]
    IterativeDeepening,
    #[serde(rename = "Bidirectional BFS")]
    Bidirectional,
    #[serde(rename = "Greedy Best-First Search")]
    GreedyBestFirst,
    #[serde(rename = "A*")]
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::BreadthFirst,
        Algorithm::DepthFirst,
        Algorithm::IterativeDeepening,
        Algorithm::Bidirectional,
        Algorithm::GreedyBestFirst,
        Algorithm::AStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BreadthFirst => "BFS",
            Algorithm::DepthFirst => "DFS",
            Algorithm::IterativeDeepening => "Iterative Deepening DFS",
            Algorithm::Bidirectional => "Bidirectional BFS",
            Algorithm::GreedyBestFirst => "Greedy Best-First Search",
            Algorithm::AStar => "A*",
        }
    }

    /// Start a fresh run over `grid`.
    pub fn trace(self, grid: &Grid) -> Trace<'_> {
        match self {
            Algorithm::BreadthFirst => Trace::BreadthFirst(BreadthFirst::new(grid)),
            Algorithm::DepthFirst => Trace::DepthFirst(DepthFirst::new(grid)),
            Algorithm::IterativeDeepening => {
                Trace::IterativeDeepening(IterativeDeepening::new(grid))
            }
            Algorithm::Bidirectional => Trace::Bidirectional(Bidirectional::new(grid)),
            Algorithm::GreedyBestFirst => Trace::GreedyBestFirst(GreedyBestFirst::new(grid)),
            Algorithm::AStar => Trace::AStar(AStar::new(grid)),
        }
    }
}

impl FromStr for Algorithm {
    type Err = MazeError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == name)
            .ok_or_else(|| MazeError::UnknownAlgorithm(name.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A running solve of any algorithm.
pub enum Trace<'g> {
    BreadthFirst(BreadthFirst<'g>),
    DepthFirst(DepthFirst<'g>),
    IterativeDeepening(IterativeDeepening<'g>),
    Bidirectional(Bidirectional<'g>),
    GreedyBestFirst(GreedyBestFirst<'g>),
    AStar(AStar<'g>),
}

impl Trace<'_> {
    /// Run to completion and keep only the terminal record.
    pub fn summary(self) -> Option<StepRecord> {
        self.last()
    }
}

impl Iterator for Trace<'_> {
    type Item = StepRecord;

    fn next(&mut self) -> Option<StepRecord> {
        match self {
            Trace::BreadthFirst(search) => search.next(),
            Trace::DepthFirst(search) => search.next(),
            Trace::IterativeDeepening(search) => search.next(),
            Trace::Bidirectional(search) => search.next(),
            Trace::GreedyBestFirst(search) => search.next(),
            Trace::AStar(search) => search.next(),
        }
    }
}

/// Run `algorithm` over `grid` and collect every record in emission order.
pub fn solve(grid: &Grid, algorithm: Algorithm) -> Vec<StepRecord> {
    let records: Vec<StepRecord> = algorithm.trace(grid).collect();
    if let Some(last) = records.last() {
        debug!(
            %algorithm,
            records = records.len(),
            success = last.success,
            path_length = last.path_length,
            nodes_expanded = last.nodes_expanded(),
            "solve finished"
        );
    }
    records
}

/// Write the trace of `algorithm` to `out` as a JSON array, one record per
/// line, as the records are produced.
///
/// Nothing is buffered beyond the current record, so traces too long to
/// collect (iterative deepening over a large open area) can still be
/// streamed. Returns the number of records written.
pub fn write_trace<W: Write>(
    grid: &Grid,
    algorithm: Algorithm,
    mut out: W,
) -> crate::error::Result<usize> {
    out.write_all(b"[")?;
    let mut written = 0;
    let mut last = None;
    for record in algorithm.trace(grid) {
        let separator: &[u8] = if written == 0 { b"\n" } else { b",\n" };
        out.write_all(separator)?;
        serde_json::to_writer(&mut out, &record)?;
        written += 1;
        last = Some(record);
    }
    out.write_all(b"\n]\n")?;
    out.flush()?;

    if let Some(last) = last {
        debug!(
            %algorithm,
            records = written,
            success = last.success,
            path_length = last.path_length,
            "trace written"
        );
    }
    Ok(written)
}

/// Where a producer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Opening,
    Running,
    Done,
}

/// Terminal record for a goal reached through `parents`.
///
/// A broken chain means the search bookkeeping is wrong, so this panics
/// rather than report a bogus path.
pub(crate) fn solved_record(
    parents: &ParentMap,
    root: Position,
    goal: Position,
    counters: TraceCounters,
) -> StepRecord {
    let path = parents
        .reconstruct(root, goal)
        .unwrap_or_else(|err| panic!("search produced an invalid parent chain: {err}"));
    StepRecord::solved(&path, counters)
}
