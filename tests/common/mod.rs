//! Game fixtures shared by the integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use arena_mcts::{AgentIndex, GameRules, NO_WINNER};

pub const X: AgentIndex = 1;
pub const O: AgentIndex = 2;
pub const DRAW: AgentIndex = 3;

/// 3x3 tic-tac-toe
#[derive(Debug, Default)]
pub struct TicTacToe;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub cells: [AgentIndex; 9],
    pub to_move: AgentIndex,
}

impl Board {
    pub fn empty() -> Self {
        Board {
            cells: [NO_WINNER; 9],
            to_move: X,
        }
    }

    /// Builds a board from a 9-character picture, `X`, `O` or `.` per cell
    pub fn from_picture(picture: &str, to_move: AgentIndex) -> Self {
        let mut board = Board::empty();
        for (i, c) in picture.chars().filter(|c| !c.is_whitespace()).enumerate() {
            board.cells[i] = match c {
                'X' => X,
                'O' => O,
                _ => NO_WINNER,
            };
        }
        board.to_move = to_move;
        board
    }

    /// The agent who made the last move
    pub fn last_mover(&self) -> AgentIndex {
        if self.to_move == X {
            O
        } else {
            X
        }
    }
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

impl GameRules for TicTacToe {
    type State = Board;
    type Action = usize;
    type Outcome = AgentIndex;

    fn transition(&self, state: &Board, action: &usize) -> Board {
        let mut next = state.clone();
        next.cells[*action] = state.to_move;
        next.to_move = state.last_mover();
        next
    }

    fn enumerate_actions(&self, state: &Board) -> Vec<usize> {
        (0..9).filter(|&i| state.cells[i] == NO_WINNER).collect()
    }

    fn determine_winner(&self, state: &Board) -> AgentIndex {
        for line in LINES {
            let first = state.cells[line[0]];
            if first != NO_WINNER && line.iter().all(|&i| state.cells[i] == first) {
                return first;
            }
        }
        if state.cells.iter().all(|&c| c != NO_WINNER) {
            DRAW
        } else {
            NO_WINNER
        }
    }

    fn state_to_outcome(&self, _state: &Board, winner: AgentIndex) -> AgentIndex {
        winner
    }

    fn should_credit_reward(&self, observer: &Board, outcome: &AgentIndex) -> bool {
        *outcome == observer.last_mover()
    }
}

/// A game of fixed depth and branching factor; agent 1 wins when the sum of
/// the chosen action indices is even
#[derive(Debug)]
pub struct Uniform {
    pub branching: usize,
    pub depth: usize,
    pub terminal_enumerations: AtomicUsize,
}

impl Uniform {
    pub fn new(branching: usize, depth: usize) -> Self {
        Uniform {
            branching,
            depth,
            terminal_enumerations: AtomicUsize::new(0),
        }
    }

    pub fn terminal_enumerations(&self) -> usize {
        self.terminal_enumerations.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Path {
    pub moves: Vec<usize>,
}

impl GameRules for Uniform {
    type State = Path;
    type Action = usize;
    type Outcome = AgentIndex;

    fn transition(&self, state: &Path, action: &usize) -> Path {
        let mut next = state.clone();
        next.moves.push(*action);
        next
    }

    fn enumerate_actions(&self, state: &Path) -> Vec<usize> {
        if state.moves.len() >= self.depth {
            self.terminal_enumerations.fetch_add(1, Ordering::SeqCst);
            return Vec::new();
        }
        (0..self.branching).collect()
    }

    fn determine_winner(&self, state: &Path) -> AgentIndex {
        if state.moves.len() < self.depth {
            return NO_WINNER;
        }
        if state.moves.iter().sum::<usize>() % 2 == 0 {
            1
        } else {
            2
        }
    }

    fn state_to_outcome(&self, _state: &Path, winner: AgentIndex) -> AgentIndex {
        winner
    }

    fn should_credit_reward(&self, _observer: &Path, outcome: &AgentIndex) -> bool {
        *outcome == 1
    }
}

/// A game that never ends: every state has two actions and no winner
#[derive(Debug)]
pub struct Endless;

impl GameRules for Endless {
    type State = u64;
    type Action = u64;
    type Outcome = AgentIndex;

    fn transition(&self, state: &u64, action: &u64) -> u64 {
        state.wrapping_mul(2).wrapping_add(*action)
    }

    fn enumerate_actions(&self, _state: &u64) -> Vec<u64> {
        vec![0, 1]
    }

    fn determine_winner(&self, _state: &u64) -> AgentIndex {
        NO_WINNER
    }

    fn state_to_outcome(&self, _state: &u64, winner: AgentIndex) -> AgentIndex {
        winner
    }

    fn should_credit_reward(&self, _observer: &u64, _outcome: &AgentIndex) -> bool {
        false
    }
}

/// Routes `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
