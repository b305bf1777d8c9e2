use crate::board::{Square, State};
use crate::engine::{pick_move, AiConfig, Difficulty};
use crate::moves::{describe_transition, MoveId, MoveList};
use crate::piece::Color;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct MoveJson {
    from: Option<[i8; 2]>,
    to: Option<[i8; 2]>,
    /// Landing square of every link, origin first.
    steps: Vec<[i8; 2]>,
    captures: usize,
    description: Option<String>,
}

/// A square a chain passes through and where a hop onto it leads.
#[derive(Serialize)]
struct PathJson {
    square: [i8; 2],
    /// A chain ends here.
    completes: bool,
    /// Landing squares of the links continuing from here.
    next: Vec<[i8; 2]>,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Square>>,
    current_turn: Color,
    game_over: bool,
    winner: Option<Color>,
    legal_moves: Vec<MoveJson>,
    /// Hop targets for the chain in progress, or for fresh chains.
    paths: Vec<PathJson>,
    /// Square of the piece partway through a chain.
    hopping_from: Option<[i8; 2]>,
    last_move: Option<String>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn build_moves(moves: &MoveList) -> Vec<MoveJson> {
    (0..moves.len())
        .map(|index| {
            let steps = moves
                .steps(index)
                .iter()
                .filter_map(|mv| mv.to())
                .map(|(r, c)| [r, c])
                .collect();
            let origin = moves.steps(index).first().and_then(|mv| mv.from());
            MoveJson {
                from: origin.map(|(r, c)| [r, c]),
                to: moves.get(index).and_then(|mv| mv.to()).map(|(r, c)| [r, c]),
                steps,
                captures: moves.captures(index),
                description: moves.describe(index),
            }
        })
        .collect()
}

fn build_paths(moves: &MoveList, pending: Option<MoveId>) -> Vec<PathJson> {
    moves
        .group_by_shared_path(pending)
        .into_iter()
        .map(|((row, col), ids)| {
            let mut completes = false;
            let mut next = Vec::new();
            for id in ids {
                match moves.node(id).to() {
                    Some(square) if square == (row, col) => completes = true,
                    Some((r, c)) => next.push([r, c]),
                    None => {}
                }
            }
            PathJson {
                square: [row, col],
                completes,
                next,
            }
        })
        .collect()
}

fn build_board_state(
    state: &State,
    moves: &MoveList,
    pending: Option<MoveId>,
    last_move: Option<String>,
) -> BoardState {
    let game_over = state.is_goal_state(state.turn(), moves);
    let shown = pending.map(|id| moves.node(id).after).unwrap_or(*state);
    BoardState {
        squares: shown.grid().iter().map(|row| row.to_vec()).collect(),
        current_turn: state.turn(),
        game_over,
        winner: game_over.then(|| state.turn().opposite()),
        legal_moves: build_moves(moves),
        paths: build_paths(moves, pending),
        hopping_from: pending
            .and_then(|id| moves.node(id).to())
            .map(|(r, c)| [r, c]),
        last_move,
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct Game {
    state: State,
    moves: MoveList,
    /// Last link played of a chain that is not finished yet.
    pending: Option<MoveId>,
    ai_config: AiConfig,
    last_move: Option<String>,
    last_evals: u64,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        let state = State::initial();
        Game {
            moves: state.generate_moves(),
            state,
            pending: None,
            ai_config: AiConfig::new(),
            last_move: None,
            last_evals: 0,
        }
    }

    /// 0 = easy, 1 = medium, 2 = hard.
    pub fn set_difficulty(&mut self, level: u32) {
        if let Some(difficulty) = Difficulty::from_level(level) {
            self.ai_config = AiConfig::from_difficulty(difficulty);
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&self.board_state())
    }

    /// Play the legal move at `index` of the list returned by
    /// `get_board_state`.
    pub fn make_move(&mut self, index: usize) -> JsValue {
        if self.state.is_goal_state(self.state.turn(), &self.moves) {
            return to_js(&MoveResult {
                board_state: None,
                error: Some("Game is already over".to_string()),
            });
        }

        let Some(next) = self.moves.get(index).map(|mv| mv.after) else {
            return to_js(&MoveResult {
                board_state: None,
                error: Some("Illegal move".to_string()),
            });
        };
        self.last_move = self.moves.describe(index);
        self.advance(next);
        self.get_board_state()
    }

    /// Play one hop of a move, from `(from_row, from_col)` to
    /// `(to_row, to_col)`. A hop that ends its chain completes the move;
    /// otherwise the chain stays pending until the next hop.
    pub fn make_hop(&mut self, from_row: i8, from_col: i8, to_row: i8, to_col: i8) -> JsValue {
        if self.state.is_goal_state(self.state.turn(), &self.moves) {
            return to_js(&MoveResult {
                board_state: None,
                error: Some("Game is already over".to_string()),
            });
        }

        let Some(id) = self
            .moves
            .hop(self.pending, (from_row, from_col), (to_row, to_col))
        else {
            return to_js(&MoveResult {
                board_state: None,
                error: Some("Illegal move".to_string()),
            });
        };

        let link = self.moves.node(id);
        let (after, is_terminal) = (link.after, link.is_terminal);
        if is_terminal {
            self.last_move = Some(describe_transition(&self.moves.origin(id).before, &after));
            self.advance(after);
        } else {
            self.pending = Some(id);
        }
        self.get_board_state()
    }

    /// Drop the chain in progress and go back to choosing a whole move.
    pub fn cancel_hops(&mut self) -> JsValue {
        self.pending = None;
        self.get_board_state()
    }

    pub fn make_ai_move(&mut self) -> JsValue {
        match pick_move(&self.state, &self.ai_config) {
            Ok(result) => {
                self.last_evals = result.evals;
                self.last_move = result.moves.describe(result.index);
                self.advance(result.mv.after);
                self.get_board_state()
            }
            Err(err) => to_js(&MoveResult {
                board_state: Some(self.board_state()),
                error: Some(err.to_string()),
            }),
        }
    }

    pub fn get_last_evals(&self) -> u64 {
        self.last_evals
    }

    pub fn build_timestamp(&self) -> String {
        crate::BUILD_TIMESTAMP.to_string()
    }
}

impl Game {
    fn advance(&mut self, next: State) {
        self.state = next;
        self.moves = next.generate_moves();
        self.pending = None;
    }

    fn board_state(&self) -> BoardState {
        build_board_state(&self.state, &self.moves, self.pending, self.last_move.clone())
    }
}
