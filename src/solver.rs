//! Best-first (A*) search over board states.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::heuristic::Heuristic;
use crate::puzzle::{Move, Puzzle};

// arena entry; parent is an index into the same arena
#[derive(Debug)]
struct Node {
    puzzle: Puzzle,
    moves: usize,
    parent: Option<usize>,
}

// reversed so BinaryHeap pops lowest priority, then earliest insertion
#[derive(Debug, PartialEq, Eq)]
struct Frontier {
    priority: OrderedFloat<f64>,
    seq: u64,
    node: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// An optimal (under a consistent heuristic) move sequence and the work it took.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    pub moves: usize,
    pub path: Vec<Puzzle>,
    /// Nodes pushed onto the open list, including the initial one.
    pub states_generated: u64,
    pub states_expanded: u64,
}

impl Solution {
    pub fn steps(&self) -> Vec<Move> {
        self.path
            .windows(2)
            .filter_map(|pair| pair[0].move_between(&pair[1]))
            .collect()
    }
}

/// Result of [`solve`]: unsolvable boards never reach the search engine.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Solved(Solution),
    Unsolvable,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Solver {
    heuristic: Heuristic,
}

impl Solver {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Runs A* from `initial` to the goal.
    ///
    /// The caller must check [`Puzzle::is_solvable`] first. The search does
    /// not, and on an unsolvable board it explores the whole reachable half
    /// of the state space (which for anything larger than 3x3 will not finish
    /// in practice) before returning `None`.
    ///
    /// A state is skipped only once it is closed; copies of a state already
    /// on the open list are pushed again with their own cost. With a
    /// consistent heuristic the first copy popped carries the optimal cost.
    pub fn solve(&self, initial: &Puzzle) -> Option<Solution> {
        tracing::debug!(heuristic = %self.heuristic, size = initial.size(), "starting search");

        let mut arena: Vec<Node> = Vec::new();
        let mut open = BinaryHeap::new();
        let mut closed: FxHashSet<Puzzle> = FxHashSet::default();
        let mut seq: u64 = 0;
        let mut generated: u64 = 0;
        let mut expanded: u64 = 0;

        self.push(&mut arena, &mut open, &mut seq, initial.clone(), 0, None);
        generated += 1;

        while let Some(Frontier { node: current, .. }) = open.pop() {
            let node = &arena[current];
            if node.puzzle.is_goal() {
                let solution = Solution {
                    moves: node.moves,
                    path: reconstruct(&arena, current),
                    states_generated: generated,
                    states_expanded: expanded,
                };
                tracing::debug!(
                    moves = solution.moves,
                    generated,
                    expanded,
                    "search finished"
                );
                return Some(solution);
            }

            let moves = node.moves + 1;
            let neighbors: Vec<Puzzle> = node.puzzle.neighbors().collect();
            closed.insert(node.puzzle.clone());
            expanded += 1;

            for neighbor in neighbors {
                if closed.contains(&neighbor) {
                    continue;
                }
                self.push(&mut arena, &mut open, &mut seq, neighbor, moves, Some(current));
                generated += 1;
            }
        }

        tracing::debug!(generated, expanded, "open list exhausted without reaching the goal");
        None
    }

    fn push(
        &self,
        arena: &mut Vec<Node>,
        open: &mut BinaryHeap<Frontier>,
        seq: &mut u64,
        puzzle: Puzzle,
        moves: usize,
        parent: Option<usize>,
    ) {
        let priority = moves as f64 + self.heuristic.estimate(&puzzle);
        open.push(Frontier {
            priority: OrderedFloat(priority),
            seq: *seq,
            node: arena.len(),
        });
        *seq += 1;
        arena.push(Node {
            puzzle,
            moves,
            parent,
        });
    }
}

fn reconstruct(arena: &[Node], terminal: usize) -> Vec<Puzzle> {
    let mut path = Vec::new();
    let mut current = Some(terminal);
    while let Some(idx) = current {
        path.push(arena[idx].puzzle.clone());
        current = arena[idx].parent;
    }
    path.reverse();
    path
}

/// Checks solvability once and, if the board can reach the goal, searches it.
pub fn solve(initial: &Puzzle, heuristic: Heuristic) -> Outcome {
    if !initial.is_solvable() {
        tracing::debug!(inversions = initial.inversions(), "board fails the parity check");
        return Outcome::Unsolvable;
    }

    match Solver::new(heuristic).solve(initial) {
        Some(solution) => Outcome::Solved(solution),
        // the goal is reachable from every board that passes the parity check
        None => unreachable!("open list exhausted on a board that passed the parity check"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: usize, tiles: &[u32]) -> Puzzle {
        Puzzle::from_tiles(size, tiles.to_vec()).unwrap()
    }

    fn assert_valid_path(initial: &Puzzle, solution: &Solution) {
        assert_eq!(solution.path.first(), Some(initial));
        assert!(solution.path.last().unwrap().is_goal());
        assert_eq!(solution.path.len(), solution.moves + 1);
        for pair in solution.path.windows(2) {
            assert!(pair[0].move_between(&pair[1]).is_some(), "{} -> {}", pair[0], pair[1]);
        }
        assert_eq!(solution.steps().len(), solution.moves);
    }

    #[test]
    fn goal_needs_no_search() {
        let goal = Puzzle::goal(3);
        for h in Heuristic::ALL {
            let solution = Solver::new(h).solve(&goal).unwrap();
            assert_eq!(solution.moves, 0);
            assert_eq!(solution.path, vec![goal.clone()]);
            assert_eq!(solution.states_expanded, 0);
            assert_eq!(solution.states_generated, 1);
        }
    }

    #[test]
    fn one_move_from_goal() {
        let p = board(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        for h in Heuristic::ALL {
            let solution = Solver::new(h).solve(&p).unwrap();
            assert_eq!(solution.moves, 1);
            assert_eq!(solution.path.len(), 2);
            assert_eq!(solution.steps(), vec![Move::Right]);
            // root expanded once; its three neighbors pushed
            assert_eq!(solution.states_expanded, 1);
            assert_eq!(solution.states_generated, 4);
            assert_valid_path(&p, &solution);
        }
    }

    #[test]
    fn solves_known_boards() {
        let cases: &[(&[u32], usize)] = &[
            (&[1, 2, 3, 4, 0, 6, 7, 5, 8], 2),
            (&[4, 1, 3, 7, 2, 6, 0, 5, 8], 6),
            (&[8, 6, 7, 2, 5, 4, 3, 0, 1], 31),
        ];
        for &(tiles, expected) in cases {
            let p = board(3, tiles);
            for h in [Heuristic::Manhattan, Heuristic::LinearConflict] {
                let solution = Solver::new(h).solve(&p).unwrap();
                assert_eq!(solution.moves, expected, "{h} on {tiles:?}");
                assert_valid_path(&p, &solution);
                assert!(solution.states_generated > solution.states_expanded);
            }
        }
    }

    #[test]
    fn solves_four_by_four() {
        let p = board(4, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0, 15]);
        let solution = Solver::new(Heuristic::LinearConflict).solve(&p).unwrap();
        assert_eq!(solution.moves, 1);

        let p = board(4, &[1, 2, 3, 4, 5, 6, 0, 8, 9, 10, 7, 11, 13, 14, 15, 12]);
        let solution = Solver::new(Heuristic::LinearConflict).solve(&p).unwrap();
        assert_eq!(solution.moves, 3);
        assert_eq!(solution.steps(), vec![Move::Down, Move::Right, Move::Down]);
        assert_valid_path(&p, &solution);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let p = board(3, &[8, 1, 3, 4, 0, 2, 7, 6, 5]);
        let a = Solver::new(Heuristic::Euclidean).solve(&p).unwrap();
        let b = Solver::new(Heuristic::Euclidean).solve(&p).unwrap();
        assert_eq!(a.path, b.path);
        assert_eq!(a.states_generated, b.states_generated);
        assert_eq!(a.states_expanded, b.states_expanded);
    }

    #[test]
    fn better_heuristics_expand_less() {
        let p = board(3, &[8, 1, 3, 4, 0, 2, 7, 6, 5]);
        let hamming = Solver::new(Heuristic::Hamming).solve(&p).unwrap();
        let linear = Solver::new(Heuristic::LinearConflict).solve(&p).unwrap();
        assert_eq!(hamming.moves, linear.moves);
        assert!(linear.states_expanded <= hamming.states_expanded);
    }

    #[test]
    fn checked_entry_point_rejects_unsolvable() {
        let swapped = board(3, &[1, 2, 3, 4, 5, 6, 8, 7, 0]);
        assert!(matches!(solve(&swapped, Heuristic::LinearConflict), Outcome::Unsolvable));

        let p = board(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        match solve(&p, Heuristic::Manhattan) {
            Outcome::Solved(solution) => assert_eq!(solution.moves, 1),
            Outcome::Unsolvable => panic!("board is one move from the goal"),
        }
    }

    #[test]
    fn outcome_follows_the_parity_verdict() {
        use itertools::Itertools;

        for perm in (0..4u32).permutations(4) {
            let p = Puzzle::from_tiles(2, perm).unwrap();
            for h in Heuristic::ALL {
                match solve(&p, h) {
                    Outcome::Solved(solution) => {
                        assert!(p.is_solvable(), "{p}");
                        assert_valid_path(&p, &solution);
                    }
                    Outcome::Unsolvable => assert!(!p.is_solvable(), "{p}"),
                }
            }
        }
    }

    #[test]
    fn unsolvable_two_by_two_exhausts_open() {
        // bypasses the parity check: the 12 reachable states are all closed
        let swapped = board(2, &[2, 1, 3, 0]);
        assert!(Solver::new(Heuristic::Manhattan).solve(&swapped).is_none());
    }

    #[test]
    fn outcome_serializes_with_status() {
        let p = board(3, &[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        let json = serde_json::to_value(solve(&p, Heuristic::Hamming)).unwrap();
        assert_eq!(json["status"], "solved");
        assert_eq!(json["moves"], 1);
        assert_eq!(json["path"][1], serde_json::json!([[1, 2, 3], [4, 5, 6], [7, 8, 0]]));

        let json = serde_json::to_value(Outcome::Unsolvable).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "unsolvable" }));
    }
}
