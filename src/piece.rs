use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Number of pieces each side starts with. Slots `0..12` of a state belong to
/// Red, slots `12..24` to Black.
pub const PIECES_PER_SIDE: usize = 12;

/// Red is side A (top of the board, moving down), Black is side B (bottom,
/// moving up). Black moves first.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// Row delta of a man's forward step.
    pub fn forward(self) -> i8 {
        match self {
            Color::Red => 1,
            Color::Black => -1,
        }
    }

    /// The farthest row for this side, where men are crowned.
    pub fn promotion_row(self) -> i8 {
        match self {
            Color::Red => 7,
            Color::Black => 0,
        }
    }

    /// Slot indices this side owns in `State::pieces`.
    pub fn slots(self) -> Range<usize> {
        match self {
            Color::Red => 0..PIECES_PER_SIDE,
            Color::Black => PIECES_PER_SIDE..PIECES_PER_SIDE * 2,
        }
    }

    /// Side owning the given slot.
    pub fn of_slot(slot: usize) -> Color {
        if slot < PIECES_PER_SIDE {
            Color::Red
        } else {
            Color::Black
        }
    }
}

/// One slot of the piece list. Captured pieces stay in their slot with
/// off-board coordinates so that slot positions never shift.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub row: i8,
    pub col: i8,
    pub is_king: bool,
}

impl Piece {
    /// Sentinel coordinate of a captured piece.
    pub const CAPTURED: i8 = -1;

    pub fn new(row: i8, col: i8, is_king: bool) -> Self {
        Piece { row, col, is_king }
    }

    pub fn man(row: i8, col: i8) -> Self {
        Piece::new(row, col, false)
    }

    pub fn king(row: i8, col: i8) -> Self {
        Piece::new(row, col, true)
    }

    /// A piece removed from play.
    pub fn captured(is_king: bool) -> Self {
        Piece::new(Self::CAPTURED, Self::CAPTURED, is_king)
    }

    pub fn is_active(&self) -> bool {
        in_bounds(self.row, self.col)
    }

    pub fn square(&self) -> (i8, i8) {
        (self.row, self.col)
    }

    /// Whether this piece may step or jump with the given row delta.
    pub fn can_move_toward(&self, color: Color, row_delta: i8) -> bool {
        self.is_king || row_delta.signum() == color.forward()
    }

    /// The same piece relocated to `(row, col)`, crowned if it lands on the
    /// farthest row for `color`. Kings stay kings.
    pub fn moved_to(&self, row: i8, col: i8, color: Color) -> Piece {
        Piece::new(row, col, self.is_king || row == color.promotion_row())
    }
}

pub fn in_bounds(row: i8, col: i8) -> bool {
    (0..8).contains(&row) && (0..8).contains(&col)
}
