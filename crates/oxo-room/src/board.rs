//! Board engine: the 9-cell board and win/draw evaluation.
//!
//! Cells are indexed row-major:
//!
//! ```text
//!  0 | 1 | 2
//!  3 | 4 | 5
//!  6 | 7 | 8
//! ```

use oxo_protocol::{BOARD_CELLS, Symbol};

/// Every winning triple, in evaluation order: rows, columns, diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A tic-tac-toe board: nine cells, each empty or holding a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board([Option<Symbol>; BOARD_CELLS]);

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from explicit cells.
    pub fn from_cells(cells: [Option<Symbol>; BOARD_CELLS]) -> Self {
        Self(cells)
    }

    /// The cell at `index`, or `None` when empty or off the board.
    pub fn cell(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied().flatten()
    }

    pub fn cells(&self) -> &[Option<Symbol>; BOARD_CELLS] {
        &self.0
    }

    /// Writes `symbol` into `index`. The caller checks bounds and occupancy.
    pub(crate) fn place(&mut self, index: usize, symbol: Symbol) {
        self.0[index] = Some(symbol);
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    pub fn is_clear(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    pub(crate) fn clear(&mut self) {
        self.0 = [None; BOARD_CELLS];
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No winner yet and at least one empty cell.
    InProgress,
    /// `symbol` holds all three cells of `line`.
    Win { symbol: Symbol, line: [usize; 3] },
    /// Every cell is filled and nobody has a line.
    Draw,
}

impl Outcome {
    /// Returns `true` for `Win` and `Draw`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Evaluates a board. The first winning line in [`WIN_LINES`] order wins.
pub fn evaluate(board: &Board) -> Outcome {
    for line in WIN_LINES {
        let [a, b, c] = line;
        if let Some(symbol) = board.cell(a) {
            if board.cell(b) == Some(symbol) && board.cell(c) == Some(symbol) {
                return Outcome::Win { symbol, line };
            }
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
