//! Tic-Tac-Toe example for the MCTS engine
//!
//! Plays a human (X) against the engine (O). Run with `--self-play` to let the
//! engine play both sides, X with the tree-parallel driver and O with the
//! root-parallel driver.
//!
//! Set `RUST_LOG=arena_mcts=debug` to see what the workers are doing.

use std::fmt;
use std::io::{self, Write};

use arena_mcts::{config::SearchStrategy, AgentIndex, GameRules, MCTSConfig, MCTS, NO_WINNER};

const X: AgentIndex = 1;
const O: AgentIndex = 2;
const DRAW: AgentIndex = 3;

fn main() {
    // Initialize logging
    env_logger::init();

    let self_play = std::env::args().any(|arg| arg == "--self-play");

    println!("MCTS Tic-Tac-Toe Example");
    println!("========================");
    println!();

    // Set up a new game
    let mut board = Board::new();

    let base = MCTSConfig::default()
        .with_exploration_constant(std::f64::consts::SQRT_2)
        .with_max_iterations_per_thread(5_000)
        .with_thread_count(4);
    let x_config = base.clone().with_strategy(SearchStrategy::TreeParallel);
    let o_config = base.with_strategy(SearchStrategy::RootParallel);

    // Main game loop
    while TicTacToe.determine_winner(&board) == NO_WINNER {
        // Display the board
        println!("{}", board);

        let action = if board.to_move == X && !self_play {
            match read_human_move(&board) {
                Some(cell) => cell,
                None => continue,
            }
        } else {
            let config = if board.to_move == X {
                x_config.clone()
            } else {
                o_config.clone()
            };
            println!("AI is thinking...");

            let mut mcts = MCTS::new(TicTacToe, board.clone(), config);

            // Find the best move
            match mcts.search() {
                Ok(cell) => {
                    println!("AI chooses: {} (row {}, col {})", cell, cell / 3, cell % 3);
                    println!("{}", mcts.get_statistics().summary());
                    cell
                }
                Err(e) => {
                    println!("Error: {}", e);
                    break;
                }
            }
        };

        board = TicTacToe.transition(&board, &action);
    }

    // Display final state
    println!("{}", board);

    // Report the result
    match TicTacToe.determine_winner(&board) {
        DRAW => println!("The game is a draw!"),
        winner => println!("Player {} wins!", symbol(winner)),
    }
}

fn read_human_move(board: &Board) -> Option<usize> {
    println!("Your move (enter row column, e.g. '1 2'): ");
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        println!("Could not read input.");
        return None;
    }

    let coords: Vec<usize> = input
        .split_whitespace()
        .filter_map(|s| s.parse::<usize>().ok())
        .collect();

    if coords.len() != 2 || coords[0] > 2 || coords[1] > 2 {
        println!("Invalid move! Enter row and column (0-2).");
        return None;
    }

    let cell = coords[0] * 3 + coords[1];
    if board.cells[cell] != NO_WINNER {
        println!("Illegal move! Try again.");
        return None;
    }
    Some(cell)
}

fn symbol(agent: AgentIndex) -> &'static str {
    match agent {
        X => "X",
        O => "O",
        _ => ".",
    }
}

/// Tic-Tac-Toe rules
struct TicTacToe;

/// Tic-Tac-Toe position
#[derive(Clone, Debug)]
struct Board {
    /// Occupant of each cell, `NO_WINNER` when empty
    cells: [AgentIndex; 9],

    /// Agent whose turn it is
    to_move: AgentIndex,
}

impl Board {
    /// Creates a new empty board with X to move
    fn new() -> Self {
        Board {
            cells: [NO_WINNER; 9],
            to_move: X,
        }
    }

    /// The agent that made the last move
    fn last_mover(&self) -> AgentIndex {
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

    fn transition(&self, board: &Board, cell: &usize) -> Board {
        let mut next = board.clone();
        next.cells[*cell] = board.to_move;
        next.to_move = board.last_mover();
        next
    }

    fn enumerate_actions(&self, board: &Board) -> Vec<usize> {
        (0..9).filter(|&i| board.cells[i] == NO_WINNER).collect()
    }

    fn determine_winner(&self, board: &Board) -> AgentIndex {
        for line in LINES {
            let first = board.cells[line[0]];
            if first != NO_WINNER && line.iter().all(|&i| board.cells[i] == first) {
                return first;
            }
        }

        // Full board without a line
        if board.cells.iter().all(|&c| c != NO_WINNER) {
            DRAW
        } else {
            NO_WINNER
        }
    }

    fn state_to_outcome(&self, _board: &Board, winner: AgentIndex) -> AgentIndex {
        winner
    }

    fn should_credit_reward(&self, board: &Board, winner: &AgentIndex) -> bool {
        *winner == board.last_mover()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  0 1 2")?;
        for row in 0..3 {
            write!(f, "{} ", row)?;
            for col in 0..3 {
                write!(f, "{} ", symbol(self.cells[row * 3 + col]))?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\nPlayer {}'s turn", symbol(self.to_move))?;
        Ok(())
    }
}
