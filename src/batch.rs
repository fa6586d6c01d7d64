//! Independent solver runs executed in parallel and summarised afterwards.

use std::time::Instant;

use anyhow::{anyhow, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::BatchConfig;
use crate::heuristic::Heuristic;
use crate::puzzle::Puzzle;
use crate::solver::Solver;

/// One heuristic solving one generated board.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run: usize,
    pub heuristic: Heuristic,
    pub initial: Puzzle,
    pub moves: usize,
    pub states_generated: u64,
    pub states_expanded: u64,
    pub elapsed_ms: u128,
}

/// Averages for one heuristic across every board of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct HeuristicSummary {
    pub heuristic: Heuristic,
    pub mean_moves: f64,
    pub mean_generated: f64,
    pub mean_expanded: f64,
    pub total_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub size: usize,
    pub seed: u64,
    pub runs: Vec<RunReport>,
    pub summaries: Vec<HeuristicSummary>,
}

// splitmix64 finalizer: decorrelates per-run seeds derived from one base seed
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// The board for run `run`; depends only on the config and the base seed.
pub fn generate_board(cfg: &BatchConfig, seed: u64, run: usize) -> Puzzle {
    let mut rng = StdRng::seed_from_u64(splitmix64(seed ^ run as u64));
    match cfg.scramble {
        Some(steps) => Puzzle::scrambled(cfg.size, steps, &mut rng),
        None => Puzzle::shuffled(cfg.size, &mut rng),
    }
}

fn solve_one(run: usize, heuristic: Heuristic, initial: Puzzle) -> anyhow::Result<RunReport> {
    let started = Instant::now();
    let solution = Solver::new(heuristic)
        .solve(&initial)
        .ok_or_else(|| anyhow!("run {run}: {heuristic} search exhausted without reaching the goal"))?;

    Ok(RunReport {
        run,
        heuristic,
        initial,
        moves: solution.moves,
        states_generated: solution.states_generated,
        states_expanded: solution.states_expanded,
        elapsed_ms: started.elapsed().as_millis(),
    })
}

fn summarise(heuristic: Heuristic, runs: &[RunReport]) -> HeuristicSummary {
    let mine: Vec<&RunReport> = runs.iter().filter(|r| r.heuristic == heuristic).collect();
    let n = mine.len().max(1) as f64;

    HeuristicSummary {
        heuristic,
        mean_moves: mine.iter().map(|r| r.moves as f64).sum::<f64>() / n,
        mean_generated: mine.iter().map(|r| r.states_generated as f64).sum::<f64>() / n,
        mean_expanded: mine.iter().map(|r| r.states_expanded as f64).sum::<f64>() / n,
        total_ms: mine.iter().map(|r| r.elapsed_ms).sum(),
    }
}

/// Generates `cfg.runs` solvable boards and solves each with every configured
/// heuristic. Runs share nothing; results are aggregated once all are back.
pub fn run_batch(cfg: &BatchConfig) -> anyhow::Result<BatchReport> {
    cfg.validate()?;
    let seed = cfg.seed.unwrap_or_else(rand::random);

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = cfg.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("building worker pool")?;

    tracing::info!(
        size = cfg.size,
        runs = cfg.runs,
        scramble = ?cfg.scramble,
        heuristics = cfg.heuristics.len(),
        seed,
        threads = pool.current_num_threads(),
        "starting batch"
    );

    let jobs: Vec<(usize, Heuristic)> = (0..cfg.runs)
        .flat_map(|run| cfg.heuristics.iter().map(move |&h| (run, h)))
        .collect();

    let runs = pool.install(|| {
        jobs.into_par_iter()
            .map(|(run, heuristic)| {
                let report = solve_one(run, heuristic, generate_board(cfg, seed, run))?;
                tracing::debug!(
                    run,
                    %heuristic,
                    moves = report.moves,
                    expanded = report.states_expanded,
                    "run finished"
                );
                Ok(report)
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    let summaries = cfg
        .heuristics
        .iter()
        .map(|&h| summarise(h, &runs))
        .collect();

    Ok(BatchReport {
        size: cfg.size,
        seed,
        runs,
        summaries,
    })
}
