use serde::{Deserialize, Serialize};

use crate::board::State;

/// Index of a move inside the `MoveList` that produced it. Only meaningful
/// for that list.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct MoveId(usize);

/// One transition between two states. A jump chain is a sequence of moves
/// linked through `previous`; only the last link (`is_terminal`) is playable.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub before: State,
    pub after: State,
    pub previous: Option<MoveId>,
    pub is_terminal: bool,
}

impl Move {
    pub fn is_origin(&self) -> bool {
        self.previous.is_none()
    }

    /// Slot of the piece this move relocated.
    pub fn slot(&self) -> Option<usize> {
        self.before.changed_slot(&self.after)
    }

    /// Square the moved piece started from.
    pub fn from(&self) -> Option<(i8, i8)> {
        self.slot().map(|slot| self.before.piece(slot).square())
    }

    /// Square the moved piece landed on.
    pub fn to(&self) -> Option<(i8, i8)> {
        self.slot().map(|slot| self.after.piece(slot).square())
    }

    pub fn is_jump(&self) -> bool {
        match (self.from(), self.to()) {
            (Some((fr, _)), Some((tr, _))) => (fr - tr).abs() > 1,
            _ => false,
        }
    }

    /// Human-readable summary, e.g. "jumps from [5, 0] to [3, 2]".
    pub fn describe(&self) -> String {
        describe_transition(&self.before, &self.after)
    }
}

/// Describe the change of the moved piece between two states.
pub fn describe_transition(before: &State, after: &State) -> String {
    let Some(slot) = before.changed_slot(after) else {
        return "passes".to_string();
    };
    let (fr, fc) = before.piece(slot).square();
    let (tr, tc) = after.piece(slot).square();
    let verb = if (fr - tr).abs() > 1 || (fc - tc).abs() > 1 {
        "jumps"
    } else {
        "moves"
    };
    format!("{verb} from [{fr}, {fc}] to [{tr}, {tc}]")
}

/// The state a played move leads to.
pub fn apply_move(mv: &Move) -> State {
    mv.after
}

/// Arena of every move built during one `State::generate_moves` call.
/// Intermediate jump links live in the arena so chains can be walked, but
/// only terminal moves are exposed by `iter`, `get` and `len`.
#[derive(Clone, Debug, Default)]
pub struct MoveList {
    nodes: Vec<Move>,
    terminal: Vec<MoveId>,
}

impl MoveList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, mv: Move) -> MoveId {
        self.nodes.push(mv);
        MoveId(self.nodes.len() - 1)
    }

    /// Close a chain at `id`: the move becomes playable and hands the turn
    /// to the other side.
    pub(crate) fn mark_terminal(&mut self, id: MoveId) {
        let node = &mut self.nodes[id.0];
        debug_assert!(!node.is_terminal, "move marked terminal twice");
        node.is_terminal = true;
        node.after = node.after.with_turn(node.before.turn().opposite());
        self.terminal.push(id);
    }

    /// Number of playable moves.
    pub fn len(&self) -> usize {
        self.terminal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terminal.is_empty()
    }

    /// Playable moves in generation order.
    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.terminal.iter().map(move |&id| self.node(id))
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.terminal.get(index).map(|&id| self.node(id))
    }

    /// Arena id of the playable move at `index`.
    pub fn id(&self, index: usize) -> Option<MoveId> {
        self.terminal.get(index).copied()
    }

    /// Any move of the arena, playable or intermediate.
    pub fn node(&self, id: MoveId) -> &Move {
        &self.nodes[id.0]
    }

    /// Walks from `id` back to the origin of its chain.
    pub fn chain(&self, id: MoveId) -> Chain<'_> {
        Chain {
            list: self,
            next: Some(id),
        }
    }

    /// First move of the chain containing `id`.
    pub fn origin(&self, id: MoveId) -> &Move {
        let mut current = self.node(id);
        while let Some(prev) = current.previous {
            current = self.node(prev);
        }
        current
    }

    /// Links of the playable move at `index`, origin first.
    pub fn steps(&self, index: usize) -> Vec<&Move> {
        let Some(id) = self.id(index) else {
            return Vec::new();
        };
        let mut steps: Vec<&Move> = self.chain(id).collect();
        steps.reverse();
        steps
    }

    /// Pieces captured by the playable move at `index`.
    pub fn captures(&self, index: usize) -> usize {
        match self.id(index) {
            Some(id) if self.node(id).is_jump() => self.chain(id).count(),
            _ => 0,
        }
    }

    /// Summary of the whole chain behind the playable move at `index`, from
    /// the origin square to the final landing square.
    pub fn describe(&self, index: usize) -> Option<String> {
        let id = self.id(index)?;
        let last = self.node(id);
        Some(describe_transition(&self.origin(id).before, &last.after))
    }

    /// Groups the links of every playable chain by the square they land on,
    /// so a chain can be played one hop at a time.
    ///
    /// Each square maps to the moves that continue from it: the next link of
    /// the chain, or the playable move itself when the chain ends there.
    /// Chains sharing an intermediate landing share its group. With `after`,
    /// only chains passing through that link are grouped, starting from the
    /// link that follows it. Groups come out in generation order.
    pub fn group_by_shared_path(&self, after: Option<MoveId>) -> Vec<((i8, i8), Vec<MoveId>)> {
        let mut groups: Vec<((i8, i8), Vec<MoveId>)> = Vec::new();

        for &terminal in &self.terminal {
            let mut links = Vec::new();
            let mut passes = after.is_none();
            let mut next = Some(terminal);
            while let Some(id) = next {
                if Some(id) == after {
                    passes = true;
                    break;
                }
                links.push(id);
                next = self.node(id).previous;
            }
            if !passes {
                continue;
            }
            links.reverse();

            for (i, &id) in links.iter().enumerate() {
                let Some(square) = self.node(id).to() else {
                    continue;
                };
                let continuation = links.get(i + 1).copied().unwrap_or(id);
                match groups.iter_mut().find(|(s, _)| *s == square) {
                    Some((_, ids)) => {
                        if !ids.contains(&continuation) {
                            ids.push(continuation);
                        }
                    }
                    None => groups.push((square, vec![continuation])),
                }
            }
        }

        groups
    }

    /// The link moving a piece from `from` to `to` that directly follows
    /// `after` (or starts a chain when `after` is `None`). A playable link wins
    /// over an intermediate one with the same squares.
    pub fn hop(&self, after: Option<MoveId>, from: (i8, i8), to: (i8, i8)) -> Option<MoveId> {
        let mut found = None;
        for (i, mv) in self.nodes.iter().enumerate() {
            let follows = match after {
                Some(id) => mv.previous == Some(id),
                None => mv.is_origin(),
            };
            if !follows || mv.from() != Some(from) || mv.to() != Some(to) {
                continue;
            }
            if mv.is_terminal {
                return Some(MoveId(i));
            }
            found.get_or_insert(MoveId(i));
        }
        found
    }

    /// Position of the playable move `id` in generation order.
    pub fn index_of(&self, id: MoveId) -> Option<usize> {
        self.terminal.iter().position(|&t| t == id)
    }
}

/// Iterator over a jump chain, newest link first.
pub struct Chain<'a> {
    list: &'a MoveList,
    next: Option<MoveId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Move;

    fn next(&mut self) -> Option<&'a Move> {
        let id = self.next?;
        let mv = self.list.node(id);
        self.next = mv.previous;
        Some(mv)
    }
}
