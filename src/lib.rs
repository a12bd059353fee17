//! Bitboard chess position model and legal move generation.
//!
//! The [`engine`] module holds the core: squares and bitboards, attack tables,
//! the [`Position`] state with apply/undo, FEN and coordinate notation, and
//! the legal move generator. [`perft`] counts move-tree leaves for
//! verification, and [`config`] drives the command-line report tool.

pub mod config;
pub mod engine;
pub mod perft;

pub use engine::{ChessError, Game, GameStatus, Move, Position};
