use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use tracing_subscriber::EnvFilter;

use n_puzzle::{parse_board, run_batch, solve, BatchConfig, Heuristic, Outcome, Puzzle, Solution};

/// Optimal A* solver for the N×N sliding-tile puzzle.
#[derive(Parser)]
#[command(name = "n-puzzle", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one board: its size followed by the tiles row by row (0 is the blank).
    Solve {
        /// hamming, manhattan, euclidean or linear. Unknown names fall back to linear.
        heuristic: Option<String>,
        /// Read the board from a file instead of stdin.
        #[arg(long, value_name = "PATH")]
        input: Option<PathBuf>,
        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
        /// Never highlight the moved tile.
        #[arg(long)]
        plain: bool,
    },
    /// Solve a batch of random boards in parallel and report averages.
    Bench {
        /// JSON batch config; flags below override its values.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        runs: Option<usize>,
        /// Random-walk length from the goal.
        #[arg(long, conflicts_with = "uniform")]
        scramble: Option<usize>,
        /// Draw boards uniformly from all solvable permutations.
        #[arg(long)]
        uniform: bool,
        /// Repeat to compare several heuristics on the same boards.
        #[arg(long = "heuristic", value_name = "NAME")]
        heuristics: Vec<Heuristic>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        threads: Option<usize>,
        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Solve {
            heuristic,
            input,
            json,
            plain,
        } => run_solve(heuristic.as_deref(), input, json, plain),
        Command::Bench {
            config,
            size,
            runs,
            scramble,
            uniform,
            heuristics,
            seed,
            threads,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => BatchConfig::from_path(&path)?,
                None => BatchConfig::default(),
            };
            cfg.size = size.unwrap_or(cfg.size);
            cfg.runs = runs.unwrap_or(cfg.runs);
            if uniform {
                cfg.scramble = None;
            } else if scramble.is_some() {
                cfg.scramble = scramble;
            }
            if !heuristics.is_empty() {
                cfg.heuristics = heuristics;
            }
            cfg.seed = seed.or(cfg.seed);
            cfg.threads = threads.or(cfg.threads);
            run_bench(&cfg, json)
        }
    }
}

fn run_solve(choice: Option<&str>, input: Option<PathBuf>, json: bool, plain: bool) -> Result<()> {
    let text = match &input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading board from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading board from stdin")?;
            buf
        }
    };
    let board = parse_board(&text).context("invalid board")?;
    // printed regardless of RUST_LOG
    let (heuristic, unknown) = Heuristic::resolve(choice);
    if let Some(err) = unknown {
        eprintln!("invalid heuristic choice `{}`, defaulting to {}", err.0, heuristic.name());
    }

    let outcome = solve(&board, heuristic);
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        Outcome::Unsolvable => println!("Unsolvable puzzle"),
        Outcome::Solved(solution) => {
            let styled = !plain && io::stdout().is_terminal();
            print_solution(&solution, styled);
        }
    }
    Ok(())
}

fn print_solution(solution: &Solution, styled: bool) {
    println!("Minimum number of moves = {}", solution.moves);
    let mut previous: Option<&Puzzle> = None;
    for board in &solution.path {
        // the tile that slid is the one now sitting where the blank was
        let moved = previous.map(|p| {
            let (row, col) = p.blank();
            board.tile(row, col)
        });
        println!("{}", render(board, moved, styled));
        previous = Some(board);
    }
    println!("Nodes explored = {}", solution.states_generated);
    println!("Nodes expanded = {}", solution.states_expanded);
}

fn render(board: &Puzzle, moved: Option<u32>, styled: bool) -> String {
    if !styled {
        return board.to_string();
    }

    let width = (board.tiles().len() - 1).to_string().len();
    let mut out = String::new();
    for row in board.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|&val| {
                let cell = format!("{val:>width$}");
                if val == 0 {
                    cell.dim().to_string()
                } else if Some(val) == moved {
                    cell.bold().yellow().to_string()
                } else {
                    cell
                }
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

fn run_bench(cfg: &BatchConfig, json: bool) -> Result<()> {
    let report = run_batch(cfg)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let boards = match cfg.scramble {
        Some(steps) => format!("{steps}-move scrambles"),
        None => "uniform shuffles".to_string(),
    };
    println!(
        "{} runs on {}x{} boards ({}), seed {}",
        cfg.runs, report.size, report.size, boards, report.seed
    );
    println!(
        "{:<10} {:>10} {:>14} {:>14} {:>10}",
        "heuristic", "moves", "generated", "expanded", "ms"
    );
    for s in &report.summaries {
        println!(
            "{:<10} {:>10.2} {:>14.1} {:>14.1} {:>10}",
            s.heuristic.name(),
            s.mean_moves,
            s.mean_generated,
            s.mean_expanded,
            s.total_ms
        );
    }
    Ok(())
}
