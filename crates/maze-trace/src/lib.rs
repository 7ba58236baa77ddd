//! Grid maze generation and step-by-step search traces.
//!
//! [`generate`] carves a maze under structural constraints (tree or noise
//! topology, forced connection or disconnection). [`Algorithm::trace`] runs
//! one of six searches over it and yields an ordered, replayable list of
//! [`StepRecord`]s for animation or comparison.

pub mod batch;
pub mod config;
pub mod error;
pub mod generator;
pub mod grid;
pub mod neighbors;
pub mod search;
pub mod trace;

// Re-export main types
pub use batch::{run_batch, BatchConfig, BatchSummary};
pub use config::MazeConfig;
pub use error::{MazeError, Result};
pub use generator::{generate, generate_with_rng};
pub use grid::{CellState, Grid, MazeState, Position};
pub use search::{solve, write_trace, Algorithm, Trace};
pub use trace::{replay, GridUpdate, StepRecord, TraceCounters};
