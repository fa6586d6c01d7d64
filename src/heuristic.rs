//! Lower-bound estimates of the moves left to reach the goal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownHeuristic;
use crate::puzzle::Puzzle;

/// The closed set of cost estimators the solver can be guided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    Hamming,
    Manhattan,
    Euclidean,
    #[default]
    #[serde(rename = "linear")]
    LinearConflict,
}

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Heuristic::Hamming,
        Heuristic::Manhattan,
        Heuristic::Euclidean,
        Heuristic::LinearConflict,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Heuristic::Hamming => "hamming",
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::LinearConflict => "linear",
        }
    }

    pub fn estimate(&self, puzzle: &Puzzle) -> f64 {
        match self {
            Heuristic::Hamming => hamming(puzzle) as f64,
            Heuristic::Manhattan => manhattan(puzzle) as f64,
            Heuristic::Euclidean => euclidean(puzzle),
            Heuristic::LinearConflict => linear_conflict(puzzle) as f64,
        }
    }

    /// A missing or empty choice selects linear conflict. So does an
    /// unrecognised one, which is returned alongside for the caller to report.
    pub fn resolve(choice: Option<&str>) -> (Heuristic, Option<UnknownHeuristic>) {
        match choice.filter(|c| !c.is_empty()) {
            None => (Heuristic::default(), None),
            Some(name) => match name.parse() {
                Ok(h) => (h, None),
                Err(err) => (Heuristic::default(), Some(err)),
            },
        }
    }

    pub fn from_choice(choice: Option<&str>) -> Heuristic {
        let (heuristic, unknown) = Self::resolve(choice);
        if let Some(err) = unknown {
            tracing::warn!(choice = %err.0, fallback = heuristic.name(), "invalid heuristic choice");
        }
        heuristic
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Heuristic {
    type Err = UnknownHeuristic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Heuristic::ALL
            .into_iter()
            .find(|h| h.name() == lowered)
            .ok_or_else(|| UnknownHeuristic(s.to_string()))
    }
}

fn goal_cell(value: u32, size: usize) -> (usize, usize) {
    let index = value as usize - 1;
    (index / size, index % size)
}

// (current cell, goal cell) of every non-blank tile
fn placed(puzzle: &Puzzle) -> impl Iterator<Item = ((usize, usize), (usize, usize))> + '_ {
    let size = puzzle.size();
    puzzle
        .tiles()
        .iter()
        .enumerate()
        .filter(|&(_, &value)| value != 0)
        .map(move |(i, &value)| ((i / size, i % size), goal_cell(value, size)))
}

pub fn hamming(puzzle: &Puzzle) -> usize {
    placed(puzzle).filter(|(at, goal)| at != goal).count()
}

pub fn manhattan(puzzle: &Puzzle) -> usize {
    placed(puzzle)
        .map(|((row, col), (goal_row, goal_col))| row.abs_diff(goal_row) + col.abs_diff(goal_col))
        .sum()
}

pub fn euclidean(puzzle: &Puzzle) -> f64 {
    placed(puzzle)
        .map(|((row, col), (goal_row, goal_col))| {
            let dr = row.abs_diff(goal_row) as f64;
            let dc = col.abs_diff(goal_col) as f64;
            dr.hypot(dc)
        })
        .sum()
}

/// Reversed pairs among the tiles of a line that also belong to that line.
fn line_conflicts(line: impl Iterator<Item = u32>, belongs: impl Fn(u32) -> bool) -> usize {
    let members: Vec<u32> = line.filter(|&v| v != 0 && belongs(v)).collect();
    members
        .iter()
        .enumerate()
        .map(|(i, &a)| members[i + 1..].iter().filter(|&&b| a > b).count())
        .sum()
}

pub fn row_conflicts(puzzle: &Puzzle) -> usize {
    let size = puzzle.size();
    (0..size)
        .map(|row| {
            line_conflicts((0..size).map(|col| puzzle.tile(row, col)), |v| {
                goal_cell(v, size).0 == row
            })
        })
        .sum()
}

pub fn column_conflicts(puzzle: &Puzzle) -> usize {
    let size = puzzle.size();
    (0..size)
        .map(|col| {
            line_conflicts((0..size).map(|row| puzzle.tile(row, col)), |v| {
                goal_cell(v, size).1 == col
            })
        })
        .sum()
}

/// Every reversed pair is charged two moves, even when several pairs in one
/// line could be resolved by moving a single tile out of the way. On 3x3
/// boards this exceeds the true distance for a few far-from-goal states.
pub fn linear_conflict(puzzle: &Puzzle) -> usize {
    manhattan(puzzle) + 2 * (row_conflicts(puzzle) + column_conflicts(puzzle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: usize, tiles: &[u32]) -> Puzzle {
        Puzzle::from_tiles(size, tiles.to_vec()).unwrap()
    }

    #[test]
    fn zero_on_goal() {
        for size in 1..=5 {
            let goal = Puzzle::goal(size);
            for h in Heuristic::ALL {
                assert_eq!(h.estimate(&goal), 0.0, "{h} on {size}x{size} goal");
            }
        }
    }

    #[test]
    fn one_move_from_goal() {
        let p = board(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        assert_eq!(hamming(&p), 1);
        assert_eq!(manhattan(&p), 1);
        assert_eq!(euclidean(&p), 1.0);
        assert_eq!(linear_conflict(&p), 1);
    }

    #[test]
    fn known_values() {
        // 8 5 0 / 1 2 3 / 4 6 7
        let p = board(3, &[8, 5, 0, 1, 2, 3, 4, 6, 7]);
        assert_eq!(hamming(&p), 8);
        assert_eq!(manhattan(&p), 12);
        let expected = 5f64.sqrt() + 5.0 + 2f64.sqrt() + 2.0;
        assert!((euclidean(&p) - expected).abs() < 1e-9);
        assert_eq!(row_conflicts(&p), 0);
        // 5 above 2 in column 1
        assert_eq!(column_conflicts(&p), 1);
        assert_eq!(linear_conflict(&p), 14);
    }

    #[test]
    fn counts_every_reversed_pair() {
        // 3 2 1 in its own row: three reversed pairs
        let p = board(3, &[3, 2, 1, 5, 4, 6, 7, 8, 0]);
        assert_eq!(row_conflicts(&p), 3 + 1);
        assert_eq!(column_conflicts(&p), 0);
        assert_eq!(manhattan(&p), 2 + 2 + 1 + 1);
        assert_eq!(linear_conflict(&p), 6 + 8);

        // 7 above 4 above 1 in the first column
        let p = board(3, &[7, 2, 3, 4, 5, 6, 1, 8, 0]);
        assert_eq!(row_conflicts(&p), 0);
        assert_eq!(column_conflicts(&p), 3);
    }

    #[test]
    fn blank_and_foreign_tiles_do_not_conflict() {
        // 6 sits in row 0 but belongs to row 1
        let p = board(3, &[6, 0, 1, 4, 5, 2, 7, 8, 3]);
        assert_eq!(row_conflicts(&p), 0);
    }

    #[test]
    fn linear_conflict_dominates_manhattan() {
        let p = board(4, &[2, 1, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15]);
        assert_eq!(manhattan(&p), 3);
        assert_eq!(linear_conflict(&p), 5);
        assert!(Heuristic::LinearConflict.estimate(&p) >= Heuristic::Manhattan.estimate(&p));
    }

    #[test]
    fn parses_identifiers() {
        assert_eq!("hamming".parse(), Ok(Heuristic::Hamming));
        assert_eq!("Manhattan".parse(), Ok(Heuristic::Manhattan));
        assert_eq!("EUCLIDEAN".parse(), Ok(Heuristic::Euclidean));
        assert_eq!("linear".parse(), Ok(Heuristic::LinearConflict));
        assert_eq!(
            "chebyshev".parse::<Heuristic>(),
            Err(UnknownHeuristic("chebyshev".into()))
        );
        for h in Heuristic::ALL {
            assert_eq!(h.to_string().parse(), Ok(h));
        }
    }

    #[test]
    fn unknown_choice_falls_back_to_linear_conflict() {
        assert_eq!(Heuristic::from_choice(None), Heuristic::LinearConflict);
        assert_eq!(Heuristic::from_choice(Some("")), Heuristic::LinearConflict);
        assert_eq!(Heuristic::from_choice(Some("bogus")), Heuristic::LinearConflict);
        assert_eq!(Heuristic::from_choice(Some("hamming")), Heuristic::Hamming);
    }

    #[test]
    fn resolve_reports_the_rejected_name() {
        assert_eq!(Heuristic::resolve(None), (Heuristic::LinearConflict, None));
        assert_eq!(Heuristic::resolve(Some("")), (Heuristic::LinearConflict, None));
        assert_eq!(Heuristic::resolve(Some("Euclidean")), (Heuristic::Euclidean, None));
        assert_eq!(
            Heuristic::resolve(Some("bogus")),
            (Heuristic::LinearConflict, Some(UnknownHeuristic("bogus".into())))
        );
        // only the empty string means "no choice"
        assert_eq!(
            Heuristic::resolve(Some(" ")),
            (Heuristic::LinearConflict, Some(UnknownHeuristic(" ".into())))
        );
    }

    #[test]
    fn serde_identifiers() {
        assert_eq!(serde_json::to_string(&Heuristic::LinearConflict).unwrap(), "\"linear\"");
        let h: Vec<Heuristic> = serde_json::from_str(r#"["manhattan","linear"]"#).unwrap();
        assert_eq!(h, vec![Heuristic::Manhattan, Heuristic::LinearConflict]);
        assert!(serde_json::from_str::<Heuristic>("\"bogus\"").is_err());
    }
}
