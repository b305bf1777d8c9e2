// =============================================================================
// Draughts AI Engine
//
// Depth-bounded minimax with alpha-beta pruning. The static evaluation only
// recognises finished games: +1 when Red has won, -1 when Black has won, 0
// for anything still in play. Red maximises, Black minimises.
//
// Moves are searched in generation order and a later move only replaces the
// current best if it is strictly better, so the first move reaching the best
// value wins ties. Pruning never changes which move is chosen.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::State;
use crate::error::{DraughtsError, DraughtsResult};
use crate::moves::{Move, MoveList};
use crate::piece::Color;

// =============================================================================
// Configuration
// =============================================================================

/// Difficulty levels offered to players. Each level searches two plies
/// deeper than the one before.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn level(self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Search depth in plies: 3, 5 or 7.
    pub fn depth(self) -> u32 {
        self.level() * 2 + 3
    }

    pub fn from_level(level: u32) -> Option<Difficulty> {
        match level {
            0 => Some(Difficulty::Easy),
            1 => Some(Difficulty::Medium),
            2 => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Controls how deep the engine searches and whether alpha-beta cutoffs are
/// taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AiConfig {
    /// Search depth in plies. Must be at least 1.
    pub depth: u32,
    /// Skip siblings once alpha >= beta. Turning this off searches the full
    /// tree and picks the same move.
    pub pruning: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AiConfig {
    pub fn new() -> Self {
        Self::from_difficulty(Difficulty::default())
    }

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        AiConfig {
            depth: difficulty.depth(),
            pruning: true,
        }
    }
}

/// The result of a move search: the chosen move, its index among the root's
/// moves, its minimax value and the number of leaves evaluated. The root's
/// `MoveList` is kept so the chosen chain can be walked.
#[derive(Clone, Debug)]
pub struct PickResult {
    pub mv: Move,
    pub index: usize,
    pub value: i32,
    pub evals: u64,
    pub moves: MoveList,
}

impl PickResult {
    /// Links of the chosen move, origin first.
    pub fn steps(&self) -> Vec<&Move> {
        self.moves.steps(self.index)
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Static value of `state` given its already generated moves: +1 if Red has
/// won, -1 if Black has won, 0 otherwise. Only the side to move can have lost.
pub fn evaluate(state: &State, moves: &MoveList) -> i32 {
    let side = state.turn();
    if !state.is_goal_state(side, moves) {
        return 0;
    }
    match side {
        Color::Black => 1,
        Color::Red => -1,
    }
}

fn is_maximizing(side: Color) -> bool {
    side == Color::Red
}

// =============================================================================
// Search
// =============================================================================

/// Minimax with alpha-beta pruning. Returns the value of `state` and, for
/// the caller that needs it, the index of the move achieving it.
///
/// `evals` counts leaves: nodes at depth 0 or without legal moves.
fn minimax(
    state: &State,
    moves: &MoveList,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    pruning: bool,
    evals: &mut u64,
) -> (i32, Option<usize>) {
    if depth == 0 || moves.is_empty() {
        *evals += 1;
        return (evaluate(state, moves), None);
    }

    let maximizing = is_maximizing(state.turn());
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    let mut best_index = None;

    for (index, mv) in moves.iter().enumerate() {
        let child = mv.after;
        let child_moves = child.generate_moves();
        let (value, _) = minimax(&child, &child_moves, depth - 1, alpha, beta, pruning, evals);

        if (maximizing && value > best) || (!maximizing && value < best) {
            best = value;
            best_index = Some(index);
        }

        if maximizing {
            alpha = alpha.max(best);
        } else {
            beta = beta.min(best);
        }

        if pruning && alpha >= beta {
            break;
        }
    }

    (best, best_index)
}

// =============================================================================
// Move selection
// =============================================================================

/// Pick the engine's move for the side to move in `state`.
///
/// Fails with `NoLegalMoves` if the side to move has already lost; callers
/// are expected to check `State::is_goal_state` first.
pub fn pick_move(state: &State, config: &AiConfig) -> DraughtsResult<PickResult> {
    if config.depth == 0 {
        return Err(DraughtsError::InvalidDepth);
    }

    let moves = state.generate_moves();
    if state.is_goal_state(state.turn(), &moves) {
        return Err(DraughtsError::NoLegalMoves);
    }

    let mut evals = 0;
    let (value, index) = minimax(
        state,
        &moves,
        config.depth,
        i32::MIN,
        i32::MAX,
        config.pruning,
        &mut evals,
    );
    let (index, mv) = index
        .and_then(|i| moves.get(i).map(|mv| (i, mv.clone())))
        .ok_or(DraughtsError::NoLegalMoves)?;

    let chosen = moves.describe(index).unwrap_or_default();
    debug!(
        side = ?state.turn(),
        depth = config.depth,
        pruning = config.pruning,
        value,
        evals,
        %chosen,
        "search finished"
    );

    Ok(PickResult {
        mv,
        index,
        value,
        evals,
        moves,
    })
}

/// `pick_move` with pruning at an explicit depth.
pub fn select_move(state: &State, depth: u32) -> DraughtsResult<PickResult> {
    pick_move(
        state,
        &AiConfig {
            depth,
            pruning: true,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(red: &[(i8, i8, bool)], black: &[(i8, i8, bool)], turn: Color) -> State {
        State::from_layout(red, black, turn).expect("valid layout")
    }

    fn unpruned(depth: u32) -> AiConfig {
        AiConfig {
            depth,
            pruning: false,
        }
    }

    #[test]
    fn difficulty_maps_to_odd_depths() {
        assert_eq!(Difficulty::Easy.depth(), 3);
        assert_eq!(Difficulty::Medium.depth(), 5);
        assert_eq!(Difficulty::Hard.depth(), 7);
        assert_eq!(Difficulty::from_level(2), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_level(3), None);
        assert_eq!(AiConfig::new().depth, 5);
        assert!(AiConfig::new().pruning);
    }

    #[test]
    fn evaluation_signs_follow_the_winner() {
        // Black to move with no pieces: Red has won.
        let state = layout(&[(2, 3, false)], &[], Color::Black);
        assert_eq!(evaluate(&state, &state.generate_moves()), 1);

        // Red to move with no pieces: Black has won.
        let state = layout(&[], &[(5, 0, false)], Color::Red);
        assert_eq!(evaluate(&state, &state.generate_moves()), -1);

        // Red blocked in: (0,1) hemmed by Black men on (1,0), (1,2) backed by (2,3).
        let state = layout(
            &[(0, 1, false)],
            &[(1, 0, false), (1, 2, false), (2, 3, false)],
            Color::Red,
        );
        let moves = state.generate_moves();
        assert!(moves.is_empty());
        assert_eq!(evaluate(&state, &moves), -1);

        let state = State::initial();
        assert_eq!(evaluate(&state, &state.generate_moves()), 0);
    }

    #[test]
    fn terminal_state_is_a_caller_error() {
        let state = layout(&[(2, 3, false)], &[], Color::Black);
        assert_eq!(select_move(&state, 3).err(), Some(DraughtsError::NoLegalMoves));
        assert_eq!(
            select_move(&State::initial(), 0).err(),
            Some(DraughtsError::InvalidDepth)
        );
    }

    #[test]
    fn takes_the_winning_capture() {
        // Red's only enemy is capturable; taking it wins immediately.
        let state = layout(&[(2, 3, false), (0, 7, false)], &[(3, 4, false)], Color::Red);
        let result = select_move(&state, 3).expect("red has moves");
        assert_eq!(result.value, 1);
        assert_eq!(result.mv.to(), Some((4, 5)));
        assert_eq!(result.mv.after.active_count(Color::Black), 0);
    }

    #[test]
    fn black_minimises() {
        let state = layout(&[(3, 4, false)], &[(4, 5, false), (7, 0, false)], Color::Black);
        let result = select_move(&state, 3).expect("black has moves");
        assert_eq!(result.value, -1);
        assert_eq!(result.mv.to(), Some((2, 3)));
    }

    #[test]
    fn first_move_wins_ties() {
        // Nothing is decided within one ply, so every move is worth 0 and the
        // first generated move must be chosen.
        let state = State::initial();
        let result = select_move(&state, 1).expect("opening moves");
        assert_eq!(result.value, 0);
        assert_eq!(result.index, 0);
        assert_eq!(result.evals, 7);
        assert_eq!(result.mv.from(), Some((5, 0)));
        assert_eq!(result.mv.to(), Some((4, 1)));
    }

    #[test]
    fn first_of_equal_captures_is_chosen() {
        // Either Black man can take Red's last piece; both captures win.
        let state = layout(&[(4, 3, false)], &[(5, 2, false), (5, 4, false)], Color::Black);
        let moves = state.generate_moves();
        assert_eq!(moves.len(), 2);
        let result = select_move(&state, 3).expect("black has moves");
        assert_eq!(result.index, 0);
        assert_eq!(result.value, -1);
        assert_eq!(result.mv.from(), Some((5, 2)));
        assert_eq!(result.mv.to(), Some((3, 4)));
    }

    #[test]
    fn leaves_are_counted_once() {
        let state = State::initial();
        let shallow = select_move(&state, 1).expect("moves");
        let deeper = pick_move(&state, &unpruned(2)).expect("moves");
        // Every opening move leaves Red with 7 replies.
        assert_eq!(deeper.evals, 49);
        assert!(deeper.evals > shallow.evals);
    }

    #[test]
    fn pruning_picks_the_same_move() {
        let positions = [
            (State::initial(), 6),
            (layout(
                &[(2, 1, false), (4, 1, false), (2, 3, false)],
                &[(5, 0, false), (5, 2, false), (6, 3, false), (7, 4, false)],
                Color::Black,
            ), 7),
            (layout(
                &[(1, 2, true), (2, 5, false), (3, 0, false)],
                &[(5, 4, true), (6, 1, false), (6, 7, false)],
                Color::Red,
            ), 5),
            (layout(&[(3, 3, true)], &[(5, 5, true), (6, 0, false)], Color::Black), 7),
        ];

        for (n, (state, max_depth)) in positions.iter().enumerate() {
            for depth in 1..=*max_depth {
                let pruned = select_move(state, depth).expect("moves");
                let full = pick_move(state, &unpruned(depth)).expect("moves");
                assert_eq!(pruned.value, full.value, "position {n} depth {depth}");
                assert_eq!(pruned.index, full.index, "position {n} depth {depth}");
                assert!(pruned.evals <= full.evals, "position {n} depth {depth}");
            }
        }
    }

    #[test]
    fn searches_are_independent() {
        let state = State::initial();
        let first = select_move(&state, 3).expect("moves");
        let second = select_move(&state, 3).expect("moves");
        assert_eq!(first.index, second.index);
        assert_eq!(first.evals, second.evals);
        assert_eq!(first.mv, second.mv);
    }

    #[test]
    fn chosen_chain_is_reported_origin_first() {
        let state = layout(&[(2, 3, false)], &[(3, 2, false), (5, 2, false)], Color::Red);
        let result = select_move(&state, 1).expect("red has a capture");
        let steps = result.steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].to(), Some((4, 1)));
        assert_eq!(steps[1].to(), Some((6, 3)));
        assert_eq!(result.value, 1);
    }
}
