use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DraughtsError, DraughtsResult};
use crate::moves::{Move, MoveId, MoveList};
use crate::piece::{in_bounds, Color, Piece, PIECES_PER_SIDE};

/// Total number of piece slots in a state.
pub const SLOTS: usize = PIECES_PER_SIDE * 2;

/// Diagonal directions in search order: up-left, up-right, down-left,
/// down-right. Generation order (and so the engine's tie-breaks) depends on it.
const DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Contents of one square in the derived grid view.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub enum Square {
    #[default]
    Empty,
    RedMan,
    RedKing,
    BlackMan,
    BlackKing,
}

impl Square {
    fn of(color: Color, is_king: bool) -> Square {
        match (color, is_king) {
            (Color::Red, false) => Square::RedMan,
            (Color::Red, true) => Square::RedKing,
            (Color::Black, false) => Square::BlackMan,
            (Color::Black, true) => Square::BlackKing,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Square::Empty => None,
            Square::RedMan | Square::RedKing => Some(Color::Red),
            Square::BlackMan | Square::BlackKing => Some(Color::Black),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Square::Empty
    }
}

/// Dense board view, indexed `[row][col]`.
pub type Grid = [[Square; 8]; 8];

/// Immutable snapshot of the game: every piece slot plus the side to move.
///
/// Slot order never changes during a game; the first half of the slots are
/// Red's, the second half Black's. Producing a new position always yields a
/// new `State`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct State {
    pieces: [Piece; SLOTS],
    turn: Color,
}

impl Default for State {
    fn default() -> Self {
        Self::initial()
    }
}

impl State {
    /// Standard starting layout, Black to move.
    pub fn initial() -> Self {
        let mut pieces = [Piece::captured(false); SLOTS];
        let dark_squares = |rows: std::ops::Range<i8>| {
            rows.flat_map(|row| (0..8).map(move |col| (row, col)))
                .filter(|(row, col)| (row + col) % 2 == 1)
        };

        for (slot, (row, col)) in Color::Red.slots().zip(dark_squares(0..3)) {
            pieces[slot] = Piece::man(row, col);
        }
        for (slot, (row, col)) in Color::Black.slots().zip(dark_squares(5..8)) {
            pieces[slot] = Piece::man(row, col);
        }

        State {
            pieces,
            turn: Color::Black,
        }
    }

    /// Reduced layout for scenarios: each side lists `(row, col, is_king)` and
    /// the remaining slots of that side are filled with captured pieces.
    pub fn from_layout(
        red: &[(i8, i8, bool)],
        black: &[(i8, i8, bool)],
        turn: Color,
    ) -> DraughtsResult<Self> {
        let mut pieces = Vec::with_capacity(SLOTS);
        for side in [red, black] {
            if side.len() > PIECES_PER_SIDE {
                return Err(DraughtsError::TooManyPieces { count: side.len() });
            }
            pieces.extend(side.iter().map(|&(row, col, is_king)| Piece::new(row, col, is_king)));
            pieces.extend((side.len()..PIECES_PER_SIDE).map(|_| Piece::captured(false)));
        }
        Self::from_pieces(pieces, turn)
    }

    /// Build a state from a full slot list, checking the slot count and that
    /// active pieces do not overlap.
    pub fn from_pieces(pieces: Vec<Piece>, turn: Color) -> DraughtsResult<Self> {
        let pieces: [Piece; SLOTS] = pieces
            .try_into()
            .map_err(|rejected: Vec<Piece>| DraughtsError::InvalidPieceCount {
                count: rejected.len(),
            })?;

        let mut grid = Grid::default();
        for (slot, piece) in pieces.iter().enumerate() {
            if !piece.is_active() {
                if piece.square() != (Piece::CAPTURED, Piece::CAPTURED) {
                    return Err(DraughtsError::OutOfBounds {
                        row: piece.row,
                        col: piece.col,
                    });
                }
                continue;
            }
            let cell = &mut grid[piece.row as usize][piece.col as usize];
            if !cell.is_empty() {
                return Err(DraughtsError::SquareOccupied {
                    row: piece.row,
                    col: piece.col,
                });
            }
            *cell = Square::of(Color::of_slot(slot), piece.is_king);
        }

        Ok(State { pieces, turn })
    }

    pub fn piece(&self, slot: usize) -> Piece {
        self.pieces[slot]
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Copy of this state with one slot replaced.
    pub fn with_piece(&self, slot: usize, piece: Piece) -> State {
        let mut next = *self;
        next.pieces[slot] = piece;
        next
    }

    /// Copy of this state with the side to move replaced.
    pub fn with_turn(&self, turn: Color) -> State {
        State {
            pieces: self.pieces,
            turn,
        }
    }

    /// Active pieces of `color` with their slots.
    pub fn active_pieces(&self, color: Color) -> impl Iterator<Item = (usize, Piece)> + '_ {
        color
            .slots()
            .map(move |slot| (slot, self.pieces[slot]))
            .filter(|(_, piece)| piece.is_active())
    }

    pub fn active_count(&self, color: Color) -> usize {
        self.active_pieces(color).count()
    }

    /// Dense 8x8 view of the piece list, rebuilt on each call.
    pub fn grid(&self) -> Grid {
        let mut grid = Grid::default();
        for (slot, piece) in self.pieces.iter().enumerate() {
            if piece.is_active() {
                grid[piece.row as usize][piece.col as usize] =
                    Square::of(Color::of_slot(slot), piece.is_king);
            }
        }
        grid
    }

    /// Slot of the active piece standing on `(row, col)`, or `None` for an
    /// empty square.
    pub fn find_piece_at(&self, row: i8, col: i8) -> DraughtsResult<Option<usize>> {
        if !in_bounds(row, col) {
            return Err(DraughtsError::OutOfBounds { row, col });
        }
        Ok(self.slot_at(row, col))
    }

    fn slot_at(&self, row: i8, col: i8) -> Option<usize> {
        self.pieces
            .iter()
            .position(|p| p.is_active() && p.row == row && p.col == col)
    }

    /// First slot that is active in both states but holds a different piece,
    /// i.e. the piece that moved between `self` and `other`.
    pub fn changed_slot(&self, other: &State) -> Option<usize> {
        self.pieces
            .iter()
            .zip(other.pieces.iter())
            .position(|(a, b)| a.is_active() && b.is_active() && a != b)
    }

    // =========================================================================
    // Move generation
    // =========================================================================

    /// All playable moves for the side to move. If any capture exists only
    /// capture chains are returned.
    pub fn generate_moves(&self) -> MoveList {
        let mover = self.turn;
        let mut moves = MoveList::new();

        let mut has_jumps = false;
        for (slot, _) in self.active_pieces(mover) {
            has_jumps |= self.detect_jumps(slot, None, mover, &mut moves);
        }

        if has_jumps {
            trace!(captures = moves.len(), "capture available, simple moves skipped");
            return moves;
        }

        let grid = self.grid();
        for (slot, piece) in self.active_pieces(mover) {
            self.detect_steps(slot, piece, mover, &grid, &mut moves);
        }
        moves
    }

    fn detect_steps(&self, slot: usize, piece: Piece, mover: Color, grid: &Grid, moves: &mut MoveList) {
        for (dr, dc) in DIRECTIONS {
            if !piece.can_move_toward(mover, dr) {
                continue;
            }
            let (r, c) = (piece.row + dr, piece.col + dc);
            if !in_bounds(r, c) || !grid[r as usize][c as usize].is_empty() {
                continue;
            }
            let id = moves.push(Move {
                before: *self,
                after: self.with_piece(slot, piece.moved_to(r, c, mover)),
                previous: None,
                is_terminal: false,
            });
            moves.mark_terminal(id);
        }
    }

    /// Pushes every jump available to the piece in `slot` and, recursively,
    /// the jumps that follow it. A jump with no continuation is marked
    /// terminal. Returns whether any jump was found.
    fn detect_jumps(
        &self,
        slot: usize,
        previous: Option<MoveId>,
        mover: Color,
        moves: &mut MoveList,
    ) -> bool {
        let grid = self.grid();
        let piece = self.pieces[slot];
        let enemy = mover.opposite();
        let mut found = false;

        for (dr, dc) in DIRECTIONS {
            if !piece.can_move_toward(mover, dr) {
                continue;
            }
            let (lr, lc) = (piece.row + 2 * dr, piece.col + 2 * dc);
            if !in_bounds(lr, lc) || !grid[lr as usize][lc as usize].is_empty() {
                continue;
            }
            let (mr, mc) = (piece.row + dr, piece.col + dc);
            if grid[mr as usize][mc as usize].color() != Some(enemy) {
                continue;
            }
            let Some(victim) = self.slot_at(mr, mc) else {
                continue;
            };

            let after = self
                .with_piece(slot, piece.moved_to(lr, lc, mover))
                .with_piece(victim, Piece::captured(self.pieces[victim].is_king));
            let id = moves.push(Move {
                before: *self,
                after,
                previous,
                is_terminal: false,
            });
            if !after.detect_jumps(slot, Some(id), mover, moves) {
                moves.mark_terminal(id);
            }
            found = true;
        }

        found
    }

    // =========================================================================
    // Goal test
    // =========================================================================

    /// Whether `side` has lost: it has no active pieces, or `moves` (the
    /// already generated moves of the side to move) is empty.
    pub fn is_goal_state(&self, side: Color, moves: &MoveList) -> bool {
        self.active_count(side) == 0 || moves.is_empty()
    }
}
