//! Perft (PERFormance Test): count the leaves of the legal move tree.
//!
//! Every node is visited by applying a move to one shared position and
//! undoing it afterwards, so a wrong count points at move generation, the
//! legality filter, or apply/undo.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use serde::Serialize;

use crate::engine::board::Position;
use crate::engine::movegen::legal_moves;
use crate::engine::types::ChessError;

/// Leaf count for one root move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DivideEntry {
    #[serde(rename = "move")]
    pub uci: String,
    pub nodes: u64,
}

/// Result of a perft run, as printed by the report tool.
#[derive(Clone, Debug, Serialize)]
pub struct PerftReport {
    pub fen: String,
    pub depth: u32,
    pub nodes: u64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divide: Option<Vec<DivideEntry>>,
    pub elapsed_ms: u128,
}

/// Failures of the report tool: a bad position or move, or an unencodable report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Chess(#[from] ChessError),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PerftReport {
    /// Pretty-printed JSON for the report.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Count leaf nodes at `depth`. `pos` is restored before returning.
pub fn perft(pos: &mut Position, depth: u32) -> Result<u64, ChessError> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = legal_moves(pos);
    if depth == 1 {
        return Ok(moves.len() as u64);
    }
    let mut nodes = 0u64;
    for mut mv in moves {
        pos.apply(&mut mv)?;
        let child = perft(pos, depth - 1);
        pos.undo(&mut mv)?;
        nodes += child?;
    }
    Ok(nodes)
}

/// Per-root-move leaf counts at `depth`, sorted by coordinate text.
pub fn divide(pos: &mut Position, depth: u32) -> Result<Vec<DivideEntry>, ChessError> {
    let mut entries = Vec::new();
    for mut mv in legal_moves(pos) {
        pos.apply(&mut mv)?;
        let nodes = perft(pos, depth.saturating_sub(1));
        pos.undo(&mut mv)?;
        entries.push(DivideEntry {
            uci: mv.to_string(),
            nodes: nodes?,
        });
    }
    entries.sort_by(|a, b| a.uci.cmp(&b.uci));
    Ok(entries)
}
