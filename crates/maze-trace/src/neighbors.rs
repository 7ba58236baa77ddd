//! Adjacency, parent chains and the plain shortest-path query.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::error::{MazeError, Result};
use crate::grid::{Grid, Position};

/// Up, down, left, right. Every caller enumerates in this order.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

pub type Neighbors = SmallVec<[Position; 4]>;

/// In-bounds 4-neighbors of `pos`, walls included.
pub fn grid_neighbors(grid: &Grid, pos: Position) -> Neighbors {
    let mut result = Neighbors::new();
    for (dr, dc) in DIRECTIONS {
        let (Some(row), Some(col)) = (
            pos.row.checked_add_signed(dr),
            pos.col.checked_add_signed(dc),
        ) else {
            continue;
        };
        let next = Position::new(row, col);
        if grid.contains(next) {
            result.push(next);
        }
    }
    result
}

/// 4-neighbors of `pos` that a search may step onto.
pub fn open_neighbors(grid: &Grid, pos: Position) -> Neighbors {
    let mut result = grid_neighbors(grid, pos);
    result.retain(|next| grid.is_open(*next));
    result
}

/// Admissible and consistent on a 4-connected unit-cost grid.
pub fn heuristic(from: Position, goal: Position) -> usize {
    from.manhattan(goal)
}

/// Dense `child -> parent` table for one search direction.
#[derive(Debug, Clone)]
pub struct ParentMap {
    width: usize,
    parents: Vec<Option<Position>>,
}

impl ParentMap {
    pub fn new(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            parents: vec![None; grid.cell_count()],
        }
    }

    fn slot(&self, pos: Position) -> usize {
        pos.row * self.width + pos.col
    }

    pub fn record(&mut self, child: Position, parent: Position) {
        let slot = self.slot(child);
        self.parents[slot] = Some(parent);
    }

    pub fn parent(&self, child: Position) -> Option<Position> {
        self.parents.get(self.slot(child)).copied().flatten()
    }

    /// Walk from `goal` back to `root` and return the cells root-first.
    pub fn reconstruct(&self, root: Position, goal: Position) -> Result<Vec<Position>> {
        let mut path = vec![goal];
        let mut current = goal;
        while current != root {
            current = self
                .parent(current)
                .ok_or(MazeError::BrokenParentChain(current))?;
            path.push(current);
            if path.len() > self.parents.len() {
                return Err(MazeError::BrokenParentChain(current));
            }
        }
        path.reverse();
        Ok(path)
    }
}

/// Breadth-first shortest path from start to end over non-wall cells.
pub fn shortest_path(grid: &Grid) -> Option<Vec<Position>> {
    let (start, end) = (grid.start(), grid.end());
    let mut seen = vec![false; grid.cell_count()];
    let mut parents = ParentMap::new(grid);
    let mut queue = VecDeque::from([start]);
    seen[grid.index(start)] = true;

    while let Some(current) = queue.pop_front() {
        if current == end {
            return parents.reconstruct(start, end).ok();
        }
        for next in open_neighbors(grid, current) {
            let index = grid.index(next);
            if !seen[index] {
                seen[index] = true;
                parents.record(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Number of open cells reachable from `from`, `from` included.
pub fn reachable_count(grid: &Grid, from: Position) -> usize {
    let mut seen = vec![false; grid.cell_count()];
    let mut stack = vec![from];
    seen[grid.index(from)] = true;
    let mut count = 0;

    while let Some(current) = stack.pop() {
        count += 1;
        for next in open_neighbors(grid, current) {
            let index = grid.index(next);
            if !seen[index] {
                seen[index] = true;
                stack.push(next);
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_order_and_bounds() {
        let grid = Grid::from_ascii(
            "
            S..
            ...
            ..E
            ",
        )
        .unwrap();
        let corner = grid_neighbors(&grid, Position::new(0, 0));
        assert_eq!(corner.as_slice(), &[Position::new(1, 0), Position::new(0, 1)]);

        let middle = grid_neighbors(&grid, Position::new(1, 1));
        assert_eq!(
            middle.as_slice(),
            &[
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
                Position::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_open_neighbors_skip_walls() {
        let grid = Grid::from_ascii(
            "
            #E#
            .S#
            ###
            ",
        )
        .unwrap();
        let open = open_neighbors(&grid, grid.start());
        assert_eq!(open.as_slice(), &[Position::new(0, 1), Position::new(1, 0)]);
    }

    #[test]
    fn test_reconstruct() {
        let grid = Grid::from_ascii("S..E").unwrap();
        let mut parents = ParentMap::new(&grid);
        parents.record(Position::new(0, 1), Position::new(0, 0));
        parents.record(Position::new(0, 2), Position::new(0, 1));
        parents.record(Position::new(0, 3), Position::new(0, 2));

        let path = parents
            .reconstruct(Position::new(0, 0), Position::new(0, 3))
            .unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path[0], Position::new(0, 0));
        assert_eq!(path[3], Position::new(0, 3));
    }

    #[test]
    fn test_reconstruct_broken_chain() {
        let grid = Grid::from_ascii("S..E").unwrap();
        let mut parents = ParentMap::new(&grid);
        parents.record(Position::new(0, 3), Position::new(0, 2));

        let err = parents
            .reconstruct(Position::new(0, 0), Position::new(0, 3))
            .unwrap_err();
        assert!(matches!(err, MazeError::BrokenParentChain(p) if p == Position::new(0, 2)));
    }

    #[test]
    fn test_shortest_path() {
        let grid = Grid::from_ascii(
            "
            S.#
            #.#
            #.E
            ",
        )
        .unwrap();
        let path = shortest_path(&grid).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&grid.start()));
        assert_eq!(path.last(), Some(&grid.end()));

        let blocked = Grid::from_ascii(
            "
            S.#
            ###
            #.E
            ",
        )
        .unwrap();
        assert!(shortest_path(&blocked).is_none());
        assert_eq!(reachable_count(&blocked, blocked.start()), 2);
    }
}
