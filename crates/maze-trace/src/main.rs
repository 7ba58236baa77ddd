//! CLI entry point for the maze tracer.
//!
//! Usage:
//!   maze-trace generate [options]
//!   maze-trace solve <request.json> [--algorithm <name>] [--summary]
//!   maze-trace solve --stdin [--algorithm <name>] [--summary]
//!   maze-trace batch <batch.json> | --stdin
//!   maze-trace algorithms
//!
//! All results are printed as JSON on stdout. Logs go to stderr and are
//! filtered with `RUST_LOG` (default `maze_trace=info`).

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use maze_trace::{
    generate, run_batch, write_trace, Algorithm, BatchConfig, Grid, MazeConfig, MazeError,
};

#[derive(Parser)]
#[command(name = "maze-trace")]
#[command(about = "Generate grid mazes and trace how search algorithms solve them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a maze and print it as JSON
    Generate {
        /// Grid width in cells
        #[arg(long, default_value = "21")]
        width: usize,

        /// Grid height in cells
        #[arg(long, default_value = "21")]
        height: usize,

        /// Wall probability per cell (noise mode only)
        #[arg(long, default_value = "0.3")]
        wall_density: f64,

        /// Carve a route when the layout leaves the end unreachable
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        guaranteed_path: bool,

        /// Wall off the end (overrides --guaranteed-path)
        #[arg(long)]
        no_path: bool,

        /// Force a single route (tree topology)
        #[arg(long)]
        unique_path: bool,

        /// Allow cycles (noise topology unless --unique-path)
        #[arg(long)]
        allow_cycles: bool,

        /// Dead-end density hint
        #[arg(long, default_value = "0.5")]
        dead_end_density: f64,

        /// Seed for a reproducible maze
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run one algorithm and print its step records
    Solve {
        /// Path to a solve request JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the request from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Algorithm name; lets the input be a bare maze
        #[arg(long)]
        algorithm: Option<String>,

        /// Print only the terminal record
        #[arg(long)]
        summary: bool,
    },

    /// Compare algorithms over a batch of generated mazes
    Batch {
        /// Path to a batch request JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the request from stdin instead of a file
        #[arg(long)]
        stdin: bool,
    },

    /// List the accepted algorithm names
    Algorithms,
}

/// Solve request as sent by the front-end.
#[derive(Debug, Deserialize)]
struct SolveRequest {
    maze: Grid,
    algorithm: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maze_trace=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut out = BufWriter::new(io::stdout().lock());

    match run(cli.command, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run<W: Write>(command: Commands, out: &mut W) -> Result<(), MazeError> {
    match command {
        Commands::Generate {
            width,
            height,
            wall_density,
            guaranteed_path,
            no_path,
            unique_path,
            allow_cycles,
            dead_end_density,
            seed,
        } => {
            let config = MazeConfig {
                width,
                height,
                wall_density,
                guaranteed_path,
                no_path,
                unique_path,
                allow_cycles,
                dead_end_density,
                seed,
            };
            let grid = generate(&config)?;
            write_json(out, &grid)
        }

        Commands::Solve {
            file,
            stdin,
            algorithm,
            summary,
        } => {
            let input = read_input(file, stdin)?;
            let (grid, name) = match algorithm {
                Some(name) => {
                    // Accept either a full request or a bare maze.
                    let mut value: serde_json::Value = serde_json::from_str(&input)?;
                    let maze = value
                        .get_mut("maze")
                        .map(serde_json::Value::take)
                        .unwrap_or(value);
                    (serde_json::from_value::<Grid>(maze)?, name)
                }
                None => {
                    let request: SolveRequest = serde_json::from_str(&input)?;
                    (request.maze, request.algorithm)
                }
            };

            // Reject unknown names before any search runs.
            let algorithm: Algorithm = name.parse()?;
            if summary {
                write_json(out, &algorithm.trace(&grid).summary())
            } else {
                // Records go out as they are produced; some traces are far
                // too long to collect first.
                write_trace(&grid, algorithm, out)?;
                Ok(())
            }
        }

        Commands::Batch { file, stdin } => {
            let input = read_input(file, stdin)?;
            let config: BatchConfig = serde_json::from_str(&input)?;
            write_json(out, &run_batch(&config)?)
        }

        Commands::Algorithms => {
            for algorithm in Algorithm::ALL {
                writeln!(out, "{}", algorithm.name())?;
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), MazeError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn read_input(file: Option<PathBuf>, stdin: bool) -> Result<String, MazeError> {
    if stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else if let Some(path) = file {
        Ok(fs::read_to_string(path)?)
    } else {
        Err(MazeError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "must provide either a file path or --stdin",
        )))
    }
}
