use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::PuzzleError;

/// Direction the blank travels in a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// Canonical neighbor order. Search tie-breaking depends on it.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (-1, 0),
            Move::Down => (1, 0),
            Move::Left => (0, -1),
            Move::Right => (0, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Move::Up => "Up",
            Move::Down => "Down",
            Move::Left => "Left",
            Move::Right => "Right",
        };
        write!(f, "{}", s)
    }
}

/// Immutable `n`x`n` board, `0` is the blank. Equality and hashing look at
/// the tile layout only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct Puzzle {
    size: usize,
    tiles: Vec<u32>,
    blank: usize,
}

impl Puzzle {
    /// Panics if `size` is zero.
    pub fn goal(size: usize) -> Self {
        assert!(size > 0, "board size must be positive");
        let len = size * size;
        let tiles = (0..len).map(|i| goal_tile(i, len)).collect();

        Self {
            size,
            tiles,
            blank: len - 1,
        }
    }

    pub fn from_tiles(size: usize, tiles: Vec<u32>) -> Result<Self, PuzzleError> {
        if size == 0 {
            return Err(PuzzleError::Empty);
        }
        let expected = size * size;
        if tiles.len() != expected {
            return Err(PuzzleError::TileCount {
                size,
                expected,
                found: tiles.len(),
            });
        }

        let mut seen = vec![false; expected];
        for &tile in &tiles {
            let slot = seen
                .get_mut(tile as usize)
                .ok_or(PuzzleError::OutOfRange { tile, size })?;
            if *slot {
                return Err(PuzzleError::Duplicate(tile));
            }
            *slot = true;
        }

        // every value 0..size² was seen exactly once, so the blank exists
        let blank = tiles.iter().position(|&t| t == 0).unwrap_or_default();
        Ok(Self { size, tiles, blank })
    }

    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, PuzzleError> {
        let size = rows.len();
        if size == 0 {
            return Err(PuzzleError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(PuzzleError::NotSquare {
                row,
                len: r.len(),
                size,
            });
        }
        Self::from_tiles(size, rows.into_iter().flatten().collect())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tiles(&self) -> &[u32] {
        &self.tiles
    }

    pub fn tile(&self, row: usize, col: usize) -> u32 {
        self.tiles[row * self.size + col]
    }

    pub fn blank(&self) -> (usize, usize) {
        (self.blank / self.size, self.blank % self.size)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.tiles.chunks(self.size)
    }

    pub fn is_goal(&self) -> bool {
        let len = self.tiles.len();
        self.tiles
            .iter()
            .enumerate()
            .all(|(i, &tile)| tile == goal_tile(i, len))
    }

    fn target(&self, movement: Move) -> Option<usize> {
        let (dr, dc) = movement.as_offset();
        let (row, col) = self.blank();

        let new_row = row.checked_add_signed(dr).filter(|&r| r < self.size)?;
        let new_col = col.checked_add_signed(dc).filter(|&c| c < self.size)?;
        Some(new_row * self.size + new_col)
    }

    pub fn try_move(&self, movement: Move) -> Option<Self> {
        let target = self.target(movement)?;
        let mut tiles = self.tiles.clone();
        tiles.swap(self.blank, target);

        Some(Self {
            size: self.size,
            tiles,
            blank: target,
        })
    }

    pub fn neighbors(&self) -> impl Iterator<Item = Puzzle> + '_ {
        Move::ALL.into_iter().filter_map(move |m| self.try_move(m))
    }

    pub fn move_between(&self, next: &Puzzle) -> Option<Move> {
        Move::ALL
            .into_iter()
            .find(|&m| self.try_move(m).as_ref() == Some(next))
    }

    pub fn inversions(&self) -> usize {
        self.tiles
            .iter()
            .enumerate()
            .filter(|&(_, &val)| val != 0)
            .map(|(i, &val)| {
                self.tiles[i + 1..]
                    .iter()
                    .filter(|&&next| next != 0 && next < val)
                    .count()
            })
            .sum()
    }

    pub fn is_solvable(&self) -> bool {
        let inversions_even = self.inversions() % 2 == 0;

        if self.size % 2 == 1 {
            inversions_even
        } else {
            // blank row counted from the bottom as `n - row`, 0-indexed
            let (blank_row, _) = self.blank();
            let from_bottom_even = (self.size - blank_row) % 2 == 0;
            from_bottom_even != inversions_even
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let mut puzzle = Self::goal(size);

        loop {
            puzzle.tiles.shuffle(rng);
            puzzle.blank = puzzle
                .tiles
                .iter()
                .position(|&t| t == 0)
                .unwrap_or_default();

            if puzzle.is_solvable() {
                return puzzle;
            }
        }
    }

    /// Random walk from the goal that never undoes the previous move.
    pub fn scrambled<R: Rng + ?Sized>(size: usize, steps: usize, rng: &mut R) -> Self {
        let mut puzzle = Self::goal(size);
        let mut last: Option<Move> = None;

        for _ in 0..steps {
            let choice = Move::ALL
                .into_iter()
                .filter(|m| last.map_or(true, |l| *m != l.opposite()))
                .filter_map(|m| puzzle.target(m).map(|target| (m, target)))
                .choose(rng);

            let Some((movement, target)) = choice else {
                break;
            };
            puzzle.tiles.swap(puzzle.blank, target);
            puzzle.blank = target;
            last = Some(movement);
        }

        puzzle
    }
}

fn goal_tile(index: usize, len: usize) -> u32 {
    if index + 1 == len {
        0
    } else {
        (index + 1) as u32
    }
}

impl PartialEq for Puzzle {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
    }
}

impl Eq for Puzzle {}

impl Hash for Puzzle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tiles.hash(state);
    }
}

impl TryFrom<Vec<Vec<u32>>> for Puzzle {
    type Error = PuzzleError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Puzzle> for Vec<Vec<u32>> {
    fn from(puzzle: Puzzle) -> Self {
        puzzle.rows().map(<[u32]>::to_vec).collect()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.tiles.len() - 1).to_string().len();
        for row in self.rows() {
            for (col, &val) in row.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", val)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
