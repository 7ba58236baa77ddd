//! A* over the unit-cost grid with the Manhattan heuristic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::grid::{CellState, Grid, Position};
use crate::neighbors::{heuristic, open_neighbors, ParentMap};
use crate::search::{solved_record, Phase};
use crate::trace::{GridUpdate, StepRecord, TraceCounters};

/// Heap entry: `(f, cell, g)`, smallest `f` first, ties by position.
type OpenEntry = Reverse<(usize, Position, usize)>;

/// A* search.
///
/// A neighbor is relaxed whenever a strictly smaller `g` is found, even if it
/// was already expanded; the superseded heap entry is skipped when popped.
pub struct AStar<'g> {
    grid: &'g Grid,
    open: BinaryHeap<OpenEntry>,
    g_score: Vec<usize>,
    parents: ParentMap,
    counters: TraceCounters,
    phase: Phase,
}

impl<'g> AStar<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        let (start, end) = (grid.start(), grid.end());
        let mut g_score = vec![usize::MAX; grid.cell_count()];
        g_score[grid.index(start)] = 0;

        let mut open = BinaryHeap::new();
        open.push(Reverse((heuristic(start, end), start, 0)));

        let mut counters = TraceCounters::default();
        counters.observe_frontier(open.len());

        Self {
            grid,
            open,
            g_score,
            parents: ParentMap::new(grid),
            counters,
            phase: Phase::Opening,
        }
    }

    fn expand(&mut self) -> StepRecord {
        let end = self.grid.end();
        loop {
            let Some(Reverse((_, current, g))) = self.open.pop() else {
                self.phase = Phase::Done;
                return StepRecord::exhausted(self.counters);
            };
            // Superseded by a cheaper route pushed later.
            if g > self.g_score[self.grid.index(current)] {
                continue;
            }
            self.counters.nodes_expanded += 1;

            if current == end {
                self.phase = Phase::Done;
                return solved_record(&self.parents, self.grid.start(), current, self.counters);
            }

            let mut updates = vec![GridUpdate::new(current, CellState::Closed)];
            let tentative = g + 1;
            for next in open_neighbors(self.grid, current) {
                let index = self.grid.index(next);
                if tentative < self.g_score[index] {
                    self.g_score[index] = tentative;
                    self.parents.record(next, current);
                    self.open
                        .push(Reverse((tentative + heuristic(next, end), next, tentative)));
                    updates.push(GridUpdate::new(next, CellState::Frontier));
                }
            }

            // The goal pop above is not a step.
            self.counters.steps_taken += 1;
            self.counters.observe_frontier(self.open.len());
            return StepRecord::step(updates, current, self.counters);
        }
    }
}

impl Iterator for AStar<'_> {
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

    #[test]
    fn test_straight_corridor() {
        let grid = Grid::from_ascii("S...E").unwrap();
        let records: Vec<StepRecord> = AStar::new(&grid).collect();
        let last = records.last().unwrap();
        assert!(last.success);
        assert_eq!(last.path_length, 5);
        assert_eq!(last.nodes_expanded(), 5);
        assert_eq!(last.steps_taken(), 4);
        // opening + four expansions + terminal
        assert_eq!(records.len(), 6);
    }

    #[test]
    fn test_detour_is_optimal() {
        let grid = Grid::from_ascii(
            "
            .......
            .#####.
            .#S..#.
            .###.#.
            ...#...
            .#.#.#E
            ",
        )
        .unwrap();
        let last = AStar::new(&grid).last().unwrap();
        let shortest = crate::neighbors::shortest_path(&grid).unwrap();
        assert!(last.success);
        assert_eq!(last.path_length, shortest.len());
    }

    #[test]
    fn test_heap_ties_break_by_position() {
        // Both neighbors of the start score f = 2; the upper one goes first.
        let grid = Grid::from_ascii(
            "
            .E
            S.
            ",
        )
        .unwrap();
        let records: Vec<StepRecord> = AStar::new(&grid).collect();
        assert_eq!(records[2].current_cell, Some(Position::new(0, 0)));
        assert_eq!(records.last().unwrap().path_length, 3);
    }

    #[test]
    fn test_no_route() {
        let grid = Grid::from_ascii(
            "
            S.#
            ###
            #.E
            ",
        )
        .unwrap();
        let last = AStar::new(&grid).last().unwrap();
        assert!(last.finished && !last.success);
        assert_eq!(last.nodes_expanded(), 2);
    }
}
