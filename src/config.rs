use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::heuristic::Heuristic;

/// Batch experiment settings, loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Board width and height.
    #[serde(default = "default_size")]
    pub size: usize,

    /// Number of boards to generate and solve.
    #[serde(default = "default_runs")]
    pub runs: usize,

    /// Length of the random walk away from the goal. `None` draws boards
    /// uniformly from all solvable permutations instead.
    #[serde(default = "default_scramble")]
    pub scramble: Option<usize>,

    /// Every heuristic solves every board.
    #[serde(default = "default_heuristics")]
    pub heuristics: Vec<Heuristic>,

    /// Base seed; each run derives its own generator from it. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Worker threads. Defaults to the rayon global pool size.
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_size() -> usize {
    3
}
fn default_runs() -> usize {
    16
}
fn default_scramble() -> Option<usize> {
    Some(40)
}
fn default_heuristics() -> Vec<Heuristic> {
    vec![Heuristic::LinearConflict]
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            runs: default_runs(),
            scramble: default_scramble(),
            heuristics: default_heuristics(),
            seed: None,
            threads: None,
        }
    }
}

impl BatchConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading batch config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing batch config {}", path.display()))
    }

    /// Rejects settings that cannot run and warns about ones that may not finish.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.size == 0 {
            bail!("board size must be positive");
        }
        if self.runs == 0 {
            bail!("at least one run is required");
        }
        if self.heuristics.is_empty() {
            bail!("at least one heuristic is required");
        }
        if self.threads == Some(0) {
            bail!("thread count must be positive");
        }
        if self.size >= 4 && self.scramble.is_none() {
            tracing::warn!(
                size = self.size,
                "uniformly shuffled {0}x{0} boards may exhaust memory before a solution is found; consider a scramble length",
                self.size
            );
        }
        Ok(())
    }
}
