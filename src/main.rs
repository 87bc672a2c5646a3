//! CLI entry point for the sliding-tile planner.
//!
//! Usage:
//!   puzzle-planner solve <board.json> [options]
//!   puzzle-planner solve --stdin [options]
//!   puzzle-planner solve --scramble 12 [--seed 7] [options]
//!   puzzle-planner scramble --moves 12 [--size 3] [--seed 7]
//!
//! Boards are JSON 2-D arrays of tile values with 0 for the blank.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use puzzle_planner::{
    find_plan, find_plan_parallel, scramble, Board, Direction, HorizonAttempt, PlanError,
    PlannerConfig, PuzzleConfig, SatOracle, SearchResult,
};

#[derive(Parser)]
#[command(name = "puzzle-planner")]
#[command(about = "SAT-based optimal planner for sliding-tile puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a minimal-length plan for a board
    Solve {
        /// Path to a board JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the board JSON from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Scramble the goal board with this many random moves instead
        /// of reading a board
        #[arg(long, value_name = "MOVES", conflicts_with_all = ["file", "stdin"])]
        scramble: Option<usize>,

        /// Seed for --scramble
        #[arg(long)]
        seed: Option<u64>,

        /// Board side length, used with --scramble
        #[arg(long, default_value = "3")]
        size: usize,

        /// Largest plan length to attempt
        #[arg(long, default_value = "30")]
        max_horizon: usize,

        /// Solve horizons on this many threads instead of sequentially
        #[arg(long, value_name = "WORKERS")]
        parallel: Option<usize>,

        /// Emit a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a scrambled board as JSON
    Scramble {
        /// Number of random blank moves
        #[arg(long, default_value = "12")]
        moves: usize,

        /// Board side length
        #[arg(long, default_value = "3")]
        size: usize,

        /// Seed for reproducible scrambles
        #[arg(long)]
        seed: Option<u64>,
    },
}

/// Output format for a solve run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    board: Board,
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_length: Option<usize>,
    actions: Vec<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    attempts: Vec<AttemptOutput>,
    time_elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptOutput {
    horizon: usize,
    vars: usize,
    clauses: usize,
    satisfiable: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            stdin,
            scramble: scramble_moves,
            seed,
            size,
            max_horizon,
            parallel,
            json,
        } => {
            let board = match scramble_moves {
                Some(moves) => {
                    let config = build_config(size);
                    scramble(&config, moves, &mut rng_from(seed))
                }
                None => read_board(file, stdin),
            };

            let config = build_config(board.side());
            let planner = PlannerConfig { max_horizon };

            if !json {
                println!("Initial board:\n{}", board);
            }

            let result = match parallel {
                Some(workers) => find_plan_parallel(&config, &board, &planner, workers),
                None => {
                    let mut oracle = SatOracle;
                    find_plan(&config, &board, &planner, &mut oracle)
                }
            };

            let solved = result.is_ok();
            if json {
                let output = format_result(&board, &result);
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else {
                print_text_result(&result);
            }

            if solved {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }

        Commands::Scramble { moves, size, seed } => {
            let config = build_config(size);
            let board = scramble(&config, moves, &mut rng_from(seed));
            println!("{}", serde_json::to_string(&board).unwrap());
        }
    }
}

fn build_config(size: usize) -> PuzzleConfig {
    match PuzzleConfig::standard(size) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: unsupported board size {}: {}", size, e);
            std::process::exit(2);
        }
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn read_board(file: Option<PathBuf>, stdin: bool) -> Board {
    let json_content = if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .expect("Failed to read from stdin");
        buffer
    } else if let Some(path) = file {
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read file {:?}: {}", path, e))
    } else {
        eprintln!("Error: Must provide a file path, --stdin, or --scramble");
        std::process::exit(2);
    };

    match serde_json::from_str(&json_content) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Error parsing board JSON: {}", e);
            std::process::exit(2);
        }
    }
}

fn format_result(board: &Board, result: &Result<SearchResult, PlanError>) -> SolveOutput {
    match result {
        Ok(found) => SolveOutput {
            board: board.clone(),
            solved: true,
            plan_length: Some(found.plan.len()),
            actions: found.plan.actions.clone(),
            reason: None,
            attempts: found.attempts.iter().map(AttemptOutput::from).collect(),
            time_elapsed_ms: found.time_elapsed_ms,
        },
        Err(e) => SolveOutput {
            board: board.clone(),
            solved: false,
            plan_length: None,
            actions: Vec::new(),
            reason: Some(e.to_string()),
            attempts: match e {
                PlanError::BoundExceeded { attempts, .. } => {
                    attempts.iter().map(AttemptOutput::from).collect()
                }
                _ => Vec::new(),
            },
            time_elapsed_ms: 0,
        },
    }
}

impl From<&HorizonAttempt> for AttemptOutput {
    fn from(attempt: &HorizonAttempt) -> Self {
        Self {
            horizon: attempt.horizon,
            vars: attempt.vars,
            clauses: attempt.clauses,
            satisfiable: attempt.satisfiable,
        }
    }
}

fn print_text_result(result: &Result<SearchResult, PlanError>) {
    match result {
        Ok(found) => {
            if found.plan.is_empty() {
                println!("Board already matches the goal.");
            } else {
                let moves: Vec<String> =
                    found.plan.actions.iter().map(|d| d.to_string()).collect();
                println!("Solved in {} moves: {}", found.plan.len(), moves.join(", "));
                for (step, board) in found.plan.trajectory.iter().enumerate() {
                    println!("\nStep {}:\n{}", step, board);
                }
            }
            println!(
                "{} horizon(s) tried in {} ms",
                found.attempts.len(),
                found.time_elapsed_ms
            );
        }
        Err(e) => {
            println!("No plan: {}", e);
        }
    }
}
