//! Bidirectional breadth-first search.

use std::collections::VecDeque;

use crate::grid::{CellState, Grid, Position};
use crate::neighbors::{open_neighbors, ParentMap};
use crate::search::Phase;
use crate::trace::{GridUpdate, StepRecord, TraceCounters};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    FromStart,
    FromEnd,
}

/// One direction's queue, visited set and parent chain.
struct Wave {
    root: Position,
    queue: VecDeque<Position>,
    visited: Vec<bool>,
    parents: ParentMap,
}

impl Wave {
    fn new(grid: &Grid, root: Position) -> Self {
        let mut visited = vec![false; grid.cell_count()];
        visited[grid.index(root)] = true;
        Self {
            root,
            queue: VecDeque::from([root]),
            visited,
            parents: ParentMap::new(grid),
        }
    }

    fn chain_to(&self, meet: Position) -> Vec<Position> {
        self.parents
            .reconstruct(self.root, meet)
            .unwrap_or_else(|err| panic!("search produced an invalid parent chain: {err}"))
    }
}

enum Expansion {
    Met(Position),
    Step(StepRecord),
}

/// Two breadth-first waves, one from each endpoint, alternating one
/// expansion each per round. Stops as soon as a wave dequeues a cell the
/// other wave has already reached.
pub struct Bidirectional<'g> {
    grid: &'g Grid,
    forward: Wave,
    backward: Wave,
    turn: Side,
    counters: TraceCounters,
    phase: Phase,
}

impl<'g> Bidirectional<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        let mut counters = TraceCounters::default();
        counters.observe_frontier(2);
        Self {
            grid,
            forward: Wave::new(grid, grid.start()),
            backward: Wave::new(grid, grid.end()),
            turn: Side::FromStart,
            counters,
            phase: Phase::Opening,
        }
    }

    fn frontier_size(&self) -> usize {
        self.forward.queue.len() + self.backward.queue.len()
    }

    fn advance(&mut self) -> StepRecord {
        // A round starts only while both waves have work; the end-side half
        // of a round runs whenever its own queue is non-empty.
        let exhausted = match self.turn {
            Side::FromStart => self.forward.queue.is_empty() || self.backward.queue.is_empty(),
            Side::FromEnd => self.backward.queue.is_empty(),
        };
        if exhausted {
            self.phase = Phase::Done;
            return StepRecord::exhausted(self.counters);
        }

        let (active, other) = match self.turn {
            Side::FromStart => (&mut self.forward, &self.backward),
            Side::FromEnd => (&mut self.backward, &self.forward),
        };
        let expansion = expand_wave(self.grid, active, other, &mut self.counters);

        match expansion {
            Expansion::Met(meet) => {
                self.phase = Phase::Done;
                StepRecord::solved(&self.joined_path(meet), self.counters)
            }
            Expansion::Step(record) => {
                self.turn = match self.turn {
                    Side::FromStart => Side::FromEnd,
                    Side::FromEnd => Side::FromStart,
                };
                let size = self.frontier_size();
                self.counters.observe_frontier(size);
                StepRecord {
                    counters: self.counters,
                    ..record
                }
            }
        }
    }

    /// Start-side chain, then the end-side chain reversed, meeting cell once.
    fn joined_path(&self, meet: Position) -> Vec<Position> {
        let mut path = self.forward.chain_to(meet);
        let tail = self.backward.chain_to(meet);
        path.extend(tail.into_iter().rev().skip(1));
        path
    }
}

fn expand_wave(
    grid: &Grid,
    active: &mut Wave,
    other: &Wave,
    counters: &mut TraceCounters,
) -> Expansion {
    let Some(current) = active.queue.pop_front() else {
        unreachable!("caller checks the queue before expanding");
    };
    counters.expand();

    if other.visited[grid.index(current)] {
        return Expansion::Met(current);
    }

    let mut updates = vec![GridUpdate::new(current, CellState::Closed)];
    for next in open_neighbors(grid, current) {
        let index = grid.index(next);
        if !active.visited[index] {
            active.visited[index] = true;
            active.parents.record(next, current);
            active.queue.push_back(next);
            updates.push(GridUpdate::new(next, CellState::Frontier));
        }
    }
    Expansion::Step(StepRecord::step(updates, current, *counters))
}

impl Iterator for Bidirectional<'_> {
    type Item = StepRecord;

    fn next(&mut self) -> Option<StepRecord> {
        match self.phase {
            Phase::Opening => {
                self.phase = Phase::Running;
                let seeds = [self.grid.start(), self.grid.end()];
                Some(StepRecord::opening(&seeds, self.counters))
            }
            Phase::Running => Some(self.advance()),
            Phase::Done => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corridor_meets_in_middle() {
        let grid = Grid::from_ascii("S...E").unwrap();
        let records: Vec<StepRecord> = Bidirectional::new(&grid).collect();

        assert_eq!(records[0].grid_updates.len(), 2);
        assert_eq!(records[0].max_frontier_size(), 2);
        // Alternating sides: start, end, start-side neighbor, end-side neighbor.
        let order: Vec<Position> = records[1..5]
            .iter()
            .filter_map(|r| r.current_cell)
            .collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 0),
                Position::new(0, 4),
                Position::new(0, 1),
                Position::new(0, 3),
            ]
        );

        let last = records.last().unwrap();
        assert!(last.success);
        assert_eq!(last.nodes_expanded(), 5);
        assert_eq!(last.path_length, 5);
        let path = last.path().unwrap();
        assert_eq!(path.first(), Some(&grid.start()));
        assert_eq!(path.last(), Some(&grid.end()));
        assert_eq!(path.iter().filter(|&&p| p == Position::new(0, 2)).count(), 1);
    }

    #[test]
    fn test_adjacent_endpoints() {
        let grid = Grid::from_ascii("SE").unwrap();
        let last = Bidirectional::new(&grid).last().unwrap();
        assert!(last.success);
        assert_eq!(
            last.path().unwrap(),
            vec![Position::new(0, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn test_sealed_end_stops_early() {
        let grid = Grid::from_ascii(
            "
            S..
            ...
            ##.
            #E#
            ",
        )
        .unwrap();
        let last = Bidirectional::new(&grid).last().unwrap();
        assert!(last.finished && !last.success);
        // Start side expands once, the end side empties, the next round never starts.
        assert_eq!(last.nodes_expanded(), 2);
    }
}
