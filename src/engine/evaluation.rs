//! Static position evaluation.
//!
//! Returns a material score in centipawns from White's perspective.
//! Positive = White advantage, negative = Black advantage. This is a
//! placeholder number for callers that want one; nothing searches on it.

use crate::engine::board::Position;
use crate::engine::types::{Color, PieceType};

/// Material balance: sum of White's piece values minus Black's.
pub fn evaluate(pos: &Position) -> i32 {
    PieceType::ALL
        .into_iter()
        .map(|kind| {
            let white = pos.bb(Color::White, kind).pop_count() as i32;
            let black = pos.bb(Color::Black, kind).pop_count() as i32;
            (white - black) * kind.value()
        })
        .sum()
}

/// Score from the side-to-move's perspective.
pub fn evaluate_relative(pos: &Position) -> i32 {
    match pos.side_to_move {
        Color::White => evaluate(pos),
        Color::Black => -evaluate(pos),
    }
}
