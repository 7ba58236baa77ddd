//! Grid model shared by the generator and every solver.
//!
//! The JSON shapes here match what the browser front-end sends and expects:
//! cells travel as integer codes, positions as `[row, col]` pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};

/// Largest accepted height or width.
pub const MAX_DIMENSION: usize = 100;

/// Rendering role of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CellState {
    Wall = 1,
    Empty = 2,
    /// Discovered but not yet expanded.
    Frontier = 3,
    /// Expanded, or abandoned on backtrack.
    Closed = 4,
    Solution = 5,
    Start = 10,
    End = 11,
}

impl CellState {
    /// Integer code used on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Walls are the only cells a search may not enter.
    pub fn is_wall(self) -> bool {
        self == CellState::Wall
    }
}

impl TryFrom<u8> for CellState {
    type Error = MazeError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(CellState::Wall),
            2 => Ok(CellState::Empty),
            3 => Ok(CellState::Frontier),
            4 => Ok(CellState::Closed),
            5 => Ok(CellState::Solution),
            10 => Ok(CellState::Start),
            11 => Ok(CellState::End),
            other => Err(MazeError::InvalidCellCode(other)),
        }
    }
}

impl From<CellState> for u8 {
    fn from(state: CellState) -> u8 {
        state.code()
    }
}

/// Cell coordinate. Ordered by row, then column, which is also the
/// tie-break order of the heap-based solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance, `|Δrow| + |Δcol|`.
    pub fn manhattan(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl From<Position> for (usize, usize) {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A `height x width` maze with its two endpoints.
///
/// Cells are stored row-major. Solvers only ever see `&Grid`; the changes
/// they want rendered are reported as deltas, never written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MazeState", into = "MazeState")]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<CellState>,
    start: Position,
    end: Position,
}

impl Grid {
    /// Build a grid with every cell set to `fill`.
    pub fn new(
        height: usize,
        width: usize,
        fill: CellState,
        start: Position,
        end: Position,
    ) -> Result<Self> {
        check_dimensions(height, width)?;
        let grid = Self {
            height,
            width,
            cells: vec![fill; height * width],
            start,
            end,
        };
        grid.check_endpoints()?;
        Ok(grid)
    }

    /// Build a grid from explicit rows, validating shape and endpoints.
    pub fn from_rows(rows: Vec<Vec<CellState>>, start: Position, end: Position) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        check_dimensions(height, width)?;

        let mut cells = Vec::with_capacity(height * width);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != width {
                return Err(MazeError::RaggedGrid {
                    row,
                    expected: width,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }

        let grid = Self {
            height,
            width,
            cells,
            start,
            end,
        };
        grid.check_endpoints()?;
        Ok(grid)
    }

    /// Parse a small ASCII picture: `#` wall, `.` empty, `S` start, `E` end.
    #[cfg(test)]
    pub(crate) fn from_ascii(art: &str) -> Result<Self> {
        let mut rows = Vec::new();
        let mut start = None;
        let mut end = None;
        for (r, line) in art.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            let mut row = Vec::new();
            for (c, ch) in line.chars().enumerate() {
                let state = match ch {
                    '#' => CellState::Wall,
                    'S' => {
                        start = Some(Position::new(r, c));
                        CellState::Start
                    }
                    'E' => {
                        end = Some(Position::new(r, c));
                        CellState::End
                    }
                    _ => CellState::Empty,
                };
                row.push(state);
            }
            rows.push(row);
        }
        let start = start.unwrap_or_else(|| Position::new(0, 0));
        let end = end.unwrap_or_else(|| Position::new(0, 0));
        Self::from_rows(rows, start, end)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> {
        self.cells.chunks(self.width)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.height && pos.col < self.width
    }

    /// Row-major index of an in-bounds position.
    pub fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "{pos} outside grid");
        pos.row * self.width + pos.col
    }

    pub fn get(&self, pos: Position) -> Option<CellState> {
        if self.contains(pos) {
            Some(self.cells[self.index(pos)])
        } else {
            None
        }
    }

    /// In bounds and not a wall.
    pub fn is_open(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(|state| !state.is_wall())
    }

    /// Whether `pos` touches the outer boundary.
    pub fn on_boundary(&self, pos: Position) -> bool {
        pos.row == 0 || pos.col == 0 || pos.row + 1 == self.height || pos.col + 1 == self.width
    }

    /// Only the generator rewrites cells.
    pub(crate) fn set(&mut self, pos: Position, state: CellState) {
        let index = self.index(pos);
        self.cells[index] = state;
    }

    fn check_endpoints(&self) -> Result<()> {
        for position in [self.start, self.end] {
            if !self.contains(position) {
                return Err(MazeError::PositionOutOfBounds {
                    position,
                    height: self.height,
                    width: self.width,
                });
            }
        }
        if self.start == self.end {
            return Err(MazeError::StartEqualsEnd(self.start));
        }
        Ok(())
    }
}

fn check_dimensions(height: usize, width: usize) -> Result<()> {
    if (1..=MAX_DIMENSION).contains(&height) && (1..=MAX_DIMENSION).contains(&width) {
        Ok(())
    } else {
        Err(MazeError::InvalidDimensions { height, width })
    }
}

/// Wire form of a [`Grid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeState {
    pub width: usize,
    pub height: usize,
    pub grid: Vec<Vec<CellState>>,
    pub start_pos: Position,
    pub end_pos: Position,
}

impl TryFrom<MazeState> for Grid {
    type Error = MazeError;

    fn try_from(state: MazeState) -> Result<Self> {
        if state.grid.len() != state.height {
            return Err(MazeError::RowCountMismatch {
                expected: state.height,
                found: state.grid.len(),
            });
        }
        if let Some((row, cols)) = state
            .grid
            .iter()
            .enumerate()
            .find(|(_, cols)| cols.len() != state.width)
        {
            return Err(MazeError::RaggedGrid {
                row,
                expected: state.width,
                found: cols.len(),
            });
        }
        Grid::from_rows(state.grid, state.start_pos, state.end_pos)
    }
}

impl From<Grid> for MazeState {
    fn from(grid: Grid) -> Self {
        let grid_rows = grid.rows().map(<[CellState]>::to_vec).collect();
        MazeState {
            width: grid.width,
            height: grid.height,
            grid: grid_rows,
            start_pos: grid.start,
            end_pos: grid.end,
        }
    }
}
