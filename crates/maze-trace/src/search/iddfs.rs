//! Iterative-deepening depth-first search on an explicit frame stack.
//!
//! Within one depth bound a cell is excluded only while it sits on the
//! current root-to-leaf path, so the same cell can be expanded again by a
//! sibling branch or by a later, deeper iteration. The counters are never
//! reset between iterations.

use crate::grid::{CellState, Grid, Position};
use crate::neighbors::{open_neighbors, Neighbors};
use crate::search::Phase;
use crate::trace::{GridUpdate, StepRecord, TraceCounters};

/// One level of the depth-limited walk.
struct Frame {
    pos: Position,
    /// Depth still allowed below this cell.
    remaining: usize,
    neighbors: Neighbors,
    /// Index of the next neighbor to try.
    next: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    BeginIteration,
    Visit(Position),
    Resume,
    Backtrack,
    EndIteration,
    Goal,
}

/// Iterative-deepening DFS.
///
/// Each visit emits a frontier record and counts as an expansion; each
/// backtrack emits a closed record without touching the counters.
pub struct IterativeDeepening<'g> {
    grid: &'g Grid,
    bound: usize,
    max_bound: usize,
    stack: Vec<Frame>,
    on_path: Vec<bool>,
    /// Set when some depth-limited cell still had an unexplored neighbor.
    cut_off: bool,
    stage: Stage,
    counters: TraceCounters,
    phase: Phase,
}

impl<'g> IterativeDeepening<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            bound: 0,
            max_bound: grid.cell_count(),
            stack: Vec::new(),
            on_path: vec![false; grid.cell_count()],
            cut_off: false,
            stage: Stage::BeginIteration,
            counters: TraceCounters::default(),
            phase: Phase::Opening,
        }
    }

    fn finish(&mut self, record: StepRecord) -> StepRecord {
        self.phase = Phase::Done;
        record
    }

    fn advance(&mut self) -> StepRecord {
        loop {
            match self.stage {
                Stage::BeginIteration => {
                    if self.bound >= self.max_bound {
                        return self.finish(StepRecord::exhausted(self.counters));
                    }
                    let start = self.grid.start();
                    self.on_path.fill(false);
                    self.on_path[self.grid.index(start)] = true;
                    self.cut_off = false;
                    self.stage = Stage::Visit(start);
                }

                Stage::Visit(pos) => {
                    self.counters.expand();
                    let remaining = self.bound - self.stack.len();
                    let neighbors = open_neighbors(self.grid, pos);

                    self.stage = if pos == self.grid.end() {
                        Stage::Goal
                    } else if remaining == 0 {
                        if neighbors
                            .iter()
                            .any(|next| !self.on_path[self.grid.index(*next)])
                        {
                            self.cut_off = true;
                        }
                        Stage::Backtrack
                    } else {
                        Stage::Resume
                    };

                    self.stack.push(Frame {
                        pos,
                        remaining,
                        neighbors,
                        next: 0,
                    });
                    self.counters.observe_frontier(self.stack.len());
                    return StepRecord::step(
                        vec![GridUpdate::new(pos, CellState::Frontier)],
                        pos,
                        self.counters,
                    );
                }

                Stage::Resume => {
                    let Some(frame) = self.stack.last_mut() else {
                        self.stage = Stage::EndIteration;
                        continue;
                    };
                    debug_assert!(frame.remaining > 0);
                    self.stage = Stage::Backtrack;
                    while frame.next < frame.neighbors.len() {
                        let candidate = frame.neighbors[frame.next];
                        frame.next += 1;
                        let index = self.grid.index(candidate);
                        if !self.on_path[index] {
                            self.on_path[index] = true;
                            self.stage = Stage::Visit(candidate);
                            break;
                        }
                    }
                }

                Stage::Backtrack => {
                    let Some(frame) = self.stack.pop() else {
                        self.stage = Stage::EndIteration;
                        continue;
                    };
                    if self.stack.is_empty() {
                        self.stage = Stage::EndIteration;
                    } else {
                        self.on_path[self.grid.index(frame.pos)] = false;
                        self.stage = Stage::Resume;
                    }
                    return StepRecord::step(
                        vec![GridUpdate::new(frame.pos, CellState::Closed)],
                        frame.pos,
                        self.counters,
                    );
                }

                Stage::EndIteration => {
                    // Nothing was cut short, so a deeper bound would replay
                    // the same exhaustive walk.
                    if !self.cut_off {
                        return self.finish(StepRecord::exhausted(self.counters));
                    }
                    self.bound += 1;
                    self.stage = Stage::BeginIteration;
                }

                Stage::Goal => {
                    let path: Vec<Position> = self.stack.iter().map(|frame| frame.pos).collect();
                    return self.finish(StepRecord::solved(&path, self.counters));
                }
            }
        }
    }
}

impl Iterator for IterativeDeepening<'_> {
    type Item = StepRecord;

    fn next(&mut self) -> Option<StepRecord> {
        match self.phase {
            Phase::Opening => {
                self.phase = Phase::Running;
                Some(StepRecord::opening(&[self.grid.start()], self.counters))
            }
            Phase::Running => Some(self.advance()),
            Phase::Done => None,
        }
    }
}
