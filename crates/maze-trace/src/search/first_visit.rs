//! Searches where the first discovery of a cell fixes its parent.
//!
//! Breadth-first, depth-first and greedy best-first share one driver and
//! differ only in the order their [`Frontier`] hands cells back.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use crate::grid::{CellState, Grid, Position};
use crate::neighbors::{heuristic, open_neighbors, ParentMap};
use crate::search::{solved_record, Phase};
use crate::trace::{GridUpdate, StepRecord, TraceCounters};

/// Working set of discovered, unexpanded cells.
pub trait Frontier {
    fn push(&mut self, pos: Position);
    fn pop(&mut self) -> Option<Position>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// FIFO queue: insertion order.
#[derive(Debug, Default)]
pub struct Fifo(VecDeque<Position>);

impl Frontier for Fifo {
    fn push(&mut self, pos: Position) {
        self.0.push_back(pos);
    }

    fn pop(&mut self) -> Option<Position> {
        self.0.pop_front()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// LIFO stack: most recently pushed first.
#[derive(Debug, Default)]
pub struct Lifo(Vec<Position>);

impl Frontier for Lifo {
    fn push(&mut self, pos: Position) {
        self.0.push(pos);
    }

    fn pop(&mut self) -> Option<Position> {
        self.0.pop()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Min-heap on Manhattan distance to the goal, ties broken by position.
#[derive(Debug)]
pub struct ClosestFirst {
    goal: Position,
    heap: BinaryHeap<Reverse<(usize, Position)>>,
}

impl ClosestFirst {
    pub fn new(goal: Position) -> Self {
        Self {
            goal,
            heap: BinaryHeap::new(),
        }
    }
}

impl Frontier for ClosestFirst {
    fn push(&mut self, pos: Position) {
        self.heap.push(Reverse((heuristic(pos, self.goal), pos)));
    }

    fn pop(&mut self) -> Option<Position> {
        self.heap.pop().map(|Reverse((_, pos))| pos)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// First-visit-wins traversal over any frontier. Cells are never re-expanded.
pub struct FirstVisitSearch<'g, F> {
    grid: &'g Grid,
    frontier: F,
    visited: Vec<bool>,
    parents: ParentMap,
    counters: TraceCounters,
    phase: Phase,
}

pub type BreadthFirst<'g> = FirstVisitSearch<'g, Fifo>;
pub type DepthFirst<'g> = FirstVisitSearch<'g, Lifo>;
pub type GreedyBestFirst<'g> = FirstVisitSearch<'g, ClosestFirst>;

impl<'g> BreadthFirst<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        FirstVisitSearch::with_frontier(grid, Fifo::default())
    }
}

impl<'g> DepthFirst<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        FirstVisitSearch::with_frontier(grid, Lifo::default())
    }
}

impl<'g> GreedyBestFirst<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        FirstVisitSearch::with_frontier(grid, ClosestFirst::new(grid.end()))
    }
}

impl<'g, F: Frontier> FirstVisitSearch<'g, F> {
    /// Seed `frontier` with the start cell.
    pub fn with_frontier(grid: &'g Grid, mut frontier: F) -> Self {
        let start = grid.start();
        let mut visited = vec![false; grid.cell_count()];
        visited[grid.index(start)] = true;
        frontier.push(start);

        let mut counters = TraceCounters::default();
        counters.observe_frontier(frontier.len());

        Self {
            grid,
            frontier,
            visited,
            parents: ParentMap::new(grid),
            counters,
            phase: Phase::Opening,
        }
    }

    fn expand(&mut self) -> StepRecord {
        let Some(current) = self.frontier.pop() else {
            self.phase = Phase::Done;
            return StepRecord::exhausted(self.counters);
        };
        self.counters.expand();

        if current == self.grid.end() {
            self.phase = Phase::Done;
            return solved_record(&self.parents, self.grid.start(), current, self.counters);
        }

        let mut updates = vec![GridUpdate::new(current, CellState::Closed)];
        for next in open_neighbors(self.grid, current) {
            let index = self.grid.index(next);
            if !self.visited[index] {
                self.visited[index] = true;
                self.parents.record(next, current);
                self.frontier.push(next);
                updates.push(GridUpdate::new(next, CellState::Frontier));
            }
        }
        self.counters.observe_frontier(self.frontier.len());

        StepRecord::step(updates, current, self.counters)
    }
}

impl<F: Frontier> Iterator for FirstVisitSearch<'_, F> {
    type Item = StepRecord;

    fn next(&mut self) -> Option<StepRecord> {
        match self.phase {
            Phase::Opening => {
                self.phase = Phase::Running;
                Some(StepRecord::opening(&[self.grid.start()], self.counters))
            }
            Phase::Running => Some(self.expand()),
            Phase::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_cells(records: &[StepRecord]) -> Vec<Position> {
        records
            .iter()
            .filter(|r| !r.finished)
            .skip(1)
            .filter_map(|r| r.current_cell)
            .collect()
    }

    #[test]
    fn test_bfs_corridor_records() {
        let grid = Grid::from_ascii("S.E").unwrap();
        let records: Vec<StepRecord> = BreadthFirst::new(&grid).collect();
        assert_eq!(records.len(), 4);

        assert_eq!(
            records[0].grid_updates,
            vec![GridUpdate::new(Position::new(0, 0), CellState::Frontier)]
        );
        assert_eq!(records[0].max_frontier_size(), 1);
        assert_eq!(
            records[1].grid_updates,
            vec![
                GridUpdate::new(Position::new(0, 0), CellState::Closed),
                GridUpdate::new(Position::new(0, 1), CellState::Frontier),
            ]
        );
        assert_eq!(records[1].nodes_expanded(), 1);

        let last = &records[3];
        assert!(last.success);
        assert_eq!(last.path_length, 3);
        assert_eq!(last.nodes_expanded(), 3);
        assert_eq!(last.steps_taken(), 3);
    }

    #[test]
    fn test_bfs_expands_by_layer() {
        let grid = Grid::from_ascii(
            "
            ...
            .S.
            ..E
            ",
        )
        .unwrap();
        let records: Vec<StepRecord> = BreadthFirst::new(&grid).collect();
        // Start, then its four neighbors in up, down, left, right order.
        assert_eq!(
            closed_cells(&records)[..5],
            [
                Position::new(1, 1),
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_dfs_follows_last_pushed() {
        let grid = Grid::from_ascii(
            "
            ...
            .S.
            ..E
            ",
        )
        .unwrap();
        let records: Vec<StepRecord> = DepthFirst::new(&grid).collect();
        // Right was pushed last, so it is expanded right after the start.
        assert_eq!(
            closed_cells(&records)[..2],
            [Position::new(1, 1), Position::new(1, 2)]
        );
        assert_eq!(records[1].max_frontier_size(), 4);
        assert!(records.last().unwrap().success);
    }

    #[test]
    fn test_greedy_heads_for_goal() {
        let grid = Grid::from_ascii(
            "
            .....
            .S...
            ....E
            ",
        )
        .unwrap();
        let records: Vec<StepRecord> = GreedyBestFirst::new(&grid).collect();
        let last = records.last().unwrap();
        assert!(last.success);
        // Straight run: every expansion moves one step closer.
        assert_eq!(last.nodes_expanded(), last.path_length);
        assert_eq!(last.path_length, 5);
    }

    #[test]
    fn test_exhausted_record() {
        let grid = Grid::from_ascii("S#E").unwrap();
        let records: Vec<StepRecord> = BreadthFirst::new(&grid).collect();
        assert_eq!(records.len(), 3);
        let last = records.last().unwrap();
        assert!(last.finished && !last.success);
        assert_eq!(last.nodes_expanded(), 1);
        assert!(last.grid_updates.is_empty());
    }
}
