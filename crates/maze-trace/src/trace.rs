//! Step records emitted by the solvers.
//!
//! A run is an ordered list of [`StepRecord`]s. The order is the animation:
//! consumers must apply the deltas in emission order and never merge or
//! drop records.

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, Grid, Position};

/// One cell delta, `[row, col, code]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, usize, CellState)", into = "(usize, usize, CellState)")]
pub struct GridUpdate {
    pub position: Position,
    pub state: CellState,
}

impl GridUpdate {
    pub fn new(position: Position, state: CellState) -> Self {
        Self { position, state }
    }
}

impl From<(usize, usize, CellState)> for GridUpdate {
    fn from((row, col, state): (usize, usize, CellState)) -> Self {
        Self::new(Position::new(row, col), state)
    }
}

impl From<GridUpdate> for (usize, usize, CellState) {
    fn from(update: GridUpdate) -> Self {
        (update.position.row, update.position.col, update.state)
    }
}

/// Running counters carried by every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceCounters {
    pub nodes_expanded: usize,
    pub steps_taken: usize,
    pub max_frontier_size: usize,
}

impl TraceCounters {
    /// Count one dequeue/pop.
    pub fn expand(&mut self) {
        self.nodes_expanded += 1;
        self.steps_taken += 1;
    }

    /// Raise the frontier high-water mark.
    pub fn observe_frontier(&mut self, size: usize) {
        self.max_frontier_size = self.max_frontier_size.max(size);
    }
}

/// One unit of trace output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub grid_updates: Vec<GridUpdate>,
    pub current_cell: Option<Position>,
    pub finished: bool,
    pub success: bool,
    pub path_length: usize,
    #[serde(flatten)]
    pub counters: TraceCounters,
}

impl StepRecord {
    /// An in-progress record.
    pub fn step(
        grid_updates: Vec<GridUpdate>,
        current_cell: Position,
        counters: TraceCounters,
    ) -> Self {
        Self {
            grid_updates,
            current_cell: Some(current_cell),
            finished: false,
            success: false,
            path_length: 0,
            counters,
        }
    }

    /// The opening record: the given cells marked as frontier, nothing expanded.
    pub fn opening(seeds: &[Position], counters: TraceCounters) -> Self {
        let updates = seeds
            .iter()
            .map(|&pos| GridUpdate::new(pos, CellState::Frontier))
            .collect();
        Self::step(updates, seeds[0], counters)
    }

    /// Terminal record for a found path, overlay in root-to-goal order.
    pub fn solved(path: &[Position], counters: TraceCounters) -> Self {
        Self {
            grid_updates: path
                .iter()
                .map(|&pos| GridUpdate::new(pos, CellState::Solution))
                .collect(),
            current_cell: None,
            finished: true,
            success: true,
            path_length: path.len(),
            counters,
        }
    }

    /// Terminal record once the working set is empty.
    pub fn exhausted(counters: TraceCounters) -> Self {
        Self {
            grid_updates: Vec::new(),
            current_cell: None,
            finished: true,
            success: false,
            path_length: 0,
            counters,
        }
    }

    pub fn nodes_expanded(&self) -> usize {
        self.counters.nodes_expanded
    }

    pub fn steps_taken(&self) -> usize {
        self.counters.steps_taken
    }

    pub fn max_frontier_size(&self) -> usize {
        self.counters.max_frontier_size
    }

    /// The solution overlay of a successful terminal record.
    pub fn path(&self) -> Option<Vec<Position>> {
        if self.success {
            Some(self.grid_updates.iter().map(|u| u.position).collect())
        } else {
            None
        }
    }
}

/// Apply a run's deltas, in order, onto a copy of the grid's cells.
///
/// Returns the final animation frame, row-major.
pub fn replay<'a, I>(grid: &Grid, records: I) -> Vec<CellState>
where
    I: IntoIterator<Item = &'a StepRecord>,
{
    let mut frame = grid.cells().to_vec();
    for record in records {
        for update in &record.grid_updates {
            if grid.contains(update.position) {
                frame[grid.index(update.position)] = update.state;
            }
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let counters = TraceCounters {
            nodes_expanded: 3,
            steps_taken: 3,
            max_frontier_size: 2,
        };
        let record = StepRecord::step(
            vec![GridUpdate::new(Position::new(1, 2), CellState::Closed)],
            Position::new(1, 2),
            counters,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["grid_updates"], serde_json::json!([[1, 2, 4]]));
        assert_eq!(value["current_cell"], serde_json::json!([1, 2]));
        assert_eq!(value["nodes_expanded"], 3);
        assert_eq!(value["max_frontier_size"], 2);
        assert_eq!(value["finished"], false);

        let back: StepRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_solved_record() {
        let path = [Position::new(0, 0), Position::new(0, 1)];
        let record = StepRecord::solved(&path, TraceCounters::default());
        assert!(record.finished && record.success);
        assert_eq!(record.path_length, 2);
        assert_eq!(record.path().unwrap(), path.to_vec());
        assert!(StepRecord::exhausted(TraceCounters::default()).path().is_none());
    }

    #[test]
    fn test_replay_applies_in_order() {
        let grid = Grid::from_ascii("S.E").unwrap();
        let middle = Position::new(0, 1);
        let records = vec![
            StepRecord::step(
                vec![GridUpdate::new(middle, CellState::Frontier)],
                middle,
                TraceCounters::default(),
            ),
            StepRecord::step(
                vec![GridUpdate::new(middle, CellState::Closed)],
                middle,
                TraceCounters::default(),
            ),
        ];
        let frame = replay(&grid, &records);
        assert_eq!(frame[1], CellState::Closed);
        assert_eq!(frame[0], CellState::Start);
    }
}
