//! Optimal solver for the N×N sliding-tile puzzle.
//!
//! A [`Puzzle`] is an immutable board; [`Heuristic`] picks one of four cost
//! estimates; [`Solver`] runs A* and returns a
//! [`Solution`] with the move count, the boards along the way and how many
//! states were generated and expanded. [`solve`] adds the parity check that
//! keeps unsolvable boards out of the search.

pub mod batch;
pub mod config;
pub mod error;
pub mod heuristic;
pub mod input;
pub mod puzzle;
pub mod solver;

pub use batch::{run_batch, BatchReport};
pub use config::BatchConfig;
pub use error::{ParseError, PuzzleError, UnknownHeuristic};
pub use heuristic::Heuristic;
pub use input::parse_board;
pub use puzzle::{Move, Puzzle};
pub use solver::{solve, Outcome, Solution, Solver};
