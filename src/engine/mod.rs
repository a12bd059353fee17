pub mod attacks;
pub mod board;
pub mod evaluation;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod types;

pub use board::Position;
pub use evaluation::{evaluate, evaluate_relative};
pub use fen::FenRecord;
pub use game::Game;
pub use movegen::{is_game_over, legal_moves, legal_moves_from};
pub use moves::{Move, MoveFlags, move_to_uci, uci_to_move};
pub use types::*;
