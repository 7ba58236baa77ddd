//! Maze generation engine.
//!
//! Two topologies are supported. Spanning-tree mode grows a randomized
//! Prim's tree from the start cell under the thin-wall rule; noise mode opens
//! each cell independently. Either layout then goes through a constraint
//! pass that walls off or carves a route between the endpoints.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::MazeConfig;
use crate::error::Result;
use crate::grid::{CellState, Grid, Position};
use crate::neighbors::{grid_neighbors, open_neighbors, shortest_path};

/// How many times the `no_path` repair re-queries before giving up.
pub const NO_PATH_RETRIES: usize = 50;

/// Chance that the repair walk steps to the neighbor closest to the end.
pub const WALK_BIAS: f64 = 0.7;

/// Tree carves tried before a hemmed-in end falls back to the repair walk.
pub const TREE_CARVE_ATTEMPTS: usize = 20;

/// Generate a maze, seeding the RNG from `config.seed` when present.
pub fn generate(config: &MazeConfig) -> Result<Grid> {
    let mut rng = config.rng();
    generate_with_rng(config, &mut rng)
}

/// Generate a maze drawing all randomness from `rng`.
///
/// The start cell is strictly interior and the end cell strictly on the
/// boundary, so the two never coincide.
pub fn generate_with_rng<R: Rng + ?Sized>(config: &MazeConfig, rng: &mut R) -> Result<Grid> {
    config.validate()?;
    let (rows, cols) = (config.height, config.width);

    let start = Position::new(rng.gen_range(1..rows - 1), rng.gen_range(1..cols - 1));
    let end = pick_boundary_cell(rows, cols, rng);
    let mut grid = Grid::new(rows, cols, CellState::Wall, start, end)?;

    if config.spanning_tree() {
        // Redraw a carve that never reached the end; the repair walk can
        // close cycles.
        let must_reach_end = config.guaranteed_path && !config.no_path;
        let mut attempt = 1;
        let mut carved = carve_spanning_tree(&mut grid, rng);
        while must_reach_end && !grid.is_open(end) && attempt < TREE_CARVE_ATTEMPTS {
            attempt += 1;
            carved = carve_spanning_tree(&mut grid, rng);
        }
        debug!(rows, cols, carved, attempt, "carved spanning tree");
    } else {
        fill_noise(&mut grid, config.wall_density, rng);
        debug!(rows, cols, wall_density = config.wall_density, "filled noise grid");
    }

    // Endpoints are always walkable, so the constraint pass has to see them open.
    mark_endpoints(&mut grid);

    if config.no_path {
        block_paths(&mut grid);
    } else if config.guaranteed_path && shortest_path(&grid).is_none() {
        let opened = carve_walk(&mut grid, rng);
        debug!(opened, "carved walk to connect endpoints");
    }

    mark_endpoints(&mut grid);
    Ok(grid)
}

/// Pick a side uniformly, then a cell uniformly along it.
fn pick_boundary_cell<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Position {
    match rng.gen_range(0..4) {
        0 => Position::new(0, rng.gen_range(0..cols)),
        1 => Position::new(rows - 1, rng.gen_range(0..cols)),
        2 => Position::new(rng.gen_range(0..rows), 0),
        _ => Position::new(rng.gen_range(0..rows), cols - 1),
    }
}

fn mark_endpoints(grid: &mut Grid) {
    grid.set(grid.start(), CellState::Start);
    grid.set(grid.end(), CellState::End);
}

/// Randomized Prim's carve from the start cell. Every cell is reset to a
/// wall first.
///
/// A wall candidate is carved only when exactly one of its 4-neighbors is
/// already open, so no 2x2 open block can form and every carve adds exactly
/// one tree edge. The end cell is carved as a leaf the moment a carved cell
/// first touches it. Returns the number of open cells.
fn carve_spanning_tree<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> usize {
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            grid.set(Position::new(row, col), CellState::Wall);
        }
    }

    // (candidate wall, open cell that proposed it)
    let mut frontier: Vec<(Position, Position)> = Vec::new();
    let start = grid.start();
    let mut carved = open_tree_cell(grid, start, &mut frontier);
    carved += claim_end(grid, start, &mut frontier);

    while !frontier.is_empty() {
        let pick = rng.gen_range(0..frontier.len());
        let (candidate, proposer) = frontier.swap_remove(pick);

        if grid.get(candidate) != Some(CellState::Wall) {
            continue;
        }
        let open = open_neighbors(grid, candidate);
        if open.len() != 1 {
            continue;
        }
        debug_assert_eq!(open[0], proposer);

        carved += open_tree_cell(grid, candidate, &mut frontier);
        carved += claim_end(grid, candidate, &mut frontier);
    }

    carved
}

/// Open `cell` and queue its wall neighbors. Returns the cells opened.
fn open_tree_cell(
    grid: &mut Grid,
    cell: Position,
    frontier: &mut Vec<(Position, Position)>,
) -> usize {
    grid.set(cell, CellState::Empty);
    for next in grid_neighbors(grid, cell) {
        if grid.get(next) == Some(CellState::Wall) {
            frontier.push((next, cell));
        }
    }
    1
}

/// Carve the end as a leaf of `carved` if it is still a wall with no other
/// open neighbor.
fn claim_end(
    grid: &mut Grid,
    carved: Position,
    frontier: &mut Vec<(Position, Position)>,
) -> usize {
    let end = grid.end();
    if carved.is_adjacent(end)
        && grid.get(end) == Some(CellState::Wall)
        && open_neighbors(grid, end).len() == 1
    {
        open_tree_cell(grid, end, frontier)
    } else {
        0
    }
}

/// Open each cell with probability `1 - wall_density`.
fn fill_noise<R: Rng + ?Sized>(grid: &mut Grid, wall_density: f64, rng: &mut R) {
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let state = if rng.gen::<f64>() > wall_density {
                CellState::Empty
            } else {
                CellState::Wall
            };
            grid.set(Position::new(row, col), state);
        }
    }
}

/// Wall off the midpoint of the current shortest path until the end is
/// unreachable or the retry budget runs out. Best effort only.
///
/// Returns whether the endpoints ended up disconnected.
fn block_paths(grid: &mut Grid) -> bool {
    for attempt in 0..NO_PATH_RETRIES {
        let Some(path) = shortest_path(grid) else {
            debug!(attempt, "endpoints disconnected");
            return true;
        };
        // Adjacent endpoints leave nothing to block.
        if path.len() <= 2 {
            break;
        }
        grid.set(path[path.len() / 2], CellState::Wall);
    }

    let disconnected = shortest_path(grid).is_none();
    if !disconnected {
        warn!(
            retries = NO_PATH_RETRIES,
            "no_path repair gave up with a path still open"
        );
    }
    disconnected
}

/// Goal-biased random walk from start to end, opening every cell it visits.
///
/// Returns the number of walls it opened.
fn carve_walk<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> usize {
    let end = grid.end();
    let mut current = grid.start();
    let mut opened = 0;

    while current != end {
        if grid.get(current) == Some(CellState::Wall) {
            grid.set(current, CellState::Empty);
            opened += 1;
        }

        let mut options = grid_neighbors(grid, current);
        options.sort_by_key(|next| next.manhattan(end));
        let Some(&closest) = options.first() else {
            break;
        };
        current = if rng.gen_bool(WALK_BIAS) {
            closest
        } else {
            options.choose(rng).copied().unwrap_or(closest)
        };
    }

    opened
}
