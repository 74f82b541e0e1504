//! 3x3 board: occupancy, win-pattern evaluation, and the 9-character
//! boundary encoding.

use derive_more::{Display, Error};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::types::{Cell, Mark};

/// The 8 winning triples, scanned in this exact order: rows, columns,
/// diagonals. The first matching triple is the canonical winning line.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Error parsing a 9-character board encoding.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardDecodeError {
    /// Encoded string is not exactly 9 characters.
    #[display("board encoding must be 9 characters, got {len}")]
    BadLength {
        /// Actual character count of the input.
        len: usize,
    },
    /// Encoded string contains a character other than ' ', 'X', or 'O'.
    #[display("invalid board character {c:?} at position {pos}")]
    BadCell {
        /// The offending character.
        c: char,
        /// Position of the offending character.
        pos: usize,
    },
}

/// 3x3 tic-tac-toe board.
///
/// A pure value type: it stores occupancy and answers "is there a winner,
/// is it full". Turn order and move legality live in
/// [`GameSession`](super::GameSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Cells in row-major order (positions 0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Gets the cell at the given position, or `None` when the position is
    /// outside 0-8.
    pub fn cell_at(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    /// Checks whether the cell at `pos` is empty. Out-of-range positions
    /// are not empty.
    pub fn is_empty(&self, pos: usize) -> bool {
        matches!(self.cell_at(pos), Some(Cell::Empty))
    }

    /// Places `mark` at `pos`.
    ///
    /// The caller must already have verified legality (range, occupancy,
    /// turn); the board does not re-validate.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside 0-8.
    pub fn place(&mut self, pos: usize, mark: Mark) {
        self.cells[pos] = Cell::Occupied(mark);
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Checks whether the board is full.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    /// Returns the first winning triple in canonical scan order, if any.
    ///
    /// Evaluates the 8 fixed triples of [`WIN_LINES`] in order and returns
    /// the first whose three cells hold the same non-empty mark. The order
    /// is part of the contract: a board holding several simultaneous lines
    /// reports the earliest one.
    pub fn winning_line(&self) -> Option<[usize; 3]> {
        for line in WIN_LINES {
            let [a, b, c] = line;
            if self.cells[a] != Cell::Empty
                && self.cells[a] == self.cells[b]
                && self.cells[b] == self.cells[c]
            {
                return Some(line);
            }
        }
        None
    }

    /// Encodes the board as the canonical 9-character string
    /// (`' '`/`'X'`/`'O'`, index = position, row-major).
    pub fn encode(&self) -> String {
        self.cells.iter().map(|c| c.to_char()).collect()
    }

    /// Decodes a board from its 9-character encoding.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDecodeError`] when the input is not exactly 9
    /// characters or contains a character other than `' '`, `'X'`, `'O'`.
    pub fn decode(encoded: &str) -> Result<Self, BoardDecodeError> {
        let chars: Vec<char> = encoded.chars().collect();
        if chars.len() != 9 {
            return Err(BoardDecodeError::BadLength { len: chars.len() });
        }
        let mut cells = [Cell::Empty; 9];
        for (pos, c) in chars.into_iter().enumerate() {
            cells[pos] =
                Cell::from_char(c).ok_or(BoardDecodeError::BadCell { c, pos })?;
        }
        Ok(Self { cells })
    }

    /// Formats the board as a human-readable grid. Empty cells show their
    /// position (0-8) so callers know what to type.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                match self.cells[pos] {
                    Cell::Empty => result.push_str(&pos.to_string()),
                    occupied => result.push(occupied.to_char()),
                }
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

// The wire form of a board is its 9-character encoding, not the cell array.
impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::decode(&encoded).map_err(D::Error::custom)
    }
}
