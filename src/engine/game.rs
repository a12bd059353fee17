//! Stateful game controller wrapping Position.
//!
//! `Game` owns a position plus the stack of moves applied to it, so moves can
//! be taken back in order. It is the surface a command loop drives: load a
//! FEN, list legal moves, play coordinate text, undo, classify, evaluate.

use crate::engine::board::Position;
use crate::engine::evaluation;
use crate::engine::movegen;
use crate::engine::moves::{self, Move};
use crate::engine::types::{ChessError, Color, GameStatus, Square};

// =========================================================================
// Game
// =========================================================================

/// A position with its applied-move history and cached status.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    /// Applied moves, oldest first. Each carries the snapshot its undo needs.
    history: Vec<Move>,
    status: GameStatus,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self {
            position: Position::starting(),
            history: Vec::new(),
            status: GameStatus::Active,
        }
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let position = Position::from_fen(fen)?;
        let status = movegen::status(&position);
        Ok(Self {
            position,
            history: Vec::new(),
            status,
        })
    }

    /// Load a FEN position, resetting all history. The game is unchanged on
    /// error.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        *self = Game::from_fen(fen)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Moves applied so far, oldest first.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.position)
    }

    /// Legal moves from a specific square.
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        movegen::legal_moves_from(&self.position, sq)
    }

    /// Does `mv` describe one of the current legal moves?
    pub fn is_move_legal(&self, mv: &Move) -> bool {
        self.legal_moves().iter().any(|m| m.same_action(mv))
    }

    /// True when the side to move has no legal move.
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Material score from White's perspective.
    pub fn evaluate(&self) -> i32 {
        evaluation::evaluate(&self.position)
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Play a move and return the applied move.
    ///
    /// `mv` is matched against the legal moves by squares and promotion; the
    /// generated move (with its capture and castling details) is what gets
    /// applied and recorded.
    pub fn make_move(&mut self, mv: Move) -> Result<Move, ChessError> {
        if self.status.is_game_over() {
            tracing::warn!(%mv, status = %self.status, "move rejected: game is over");
            return Err(ChessError::IllegalMoveRequested {
                uci: mv.to_string(),
                reason: format!("game is over ({})", self.status),
            });
        }

        let Some(mut legal) = self.legal_moves().into_iter().find(|m| m.same_action(&mv)) else {
            tracing::warn!(%mv, fen = %self.to_fen(), "move rejected: not legal");
            return Err(ChessError::IllegalMoveRequested {
                uci: mv.to_string(),
                reason: "not a legal move".to_string(),
            });
        };

        self.commit(&mut legal)?;
        Ok(legal)
    }

    /// Play a move given in coordinate notation (`e2e4`, `e7e8q`).
    pub fn play_uci(&mut self, text: &str) -> Result<Move, ChessError> {
        if self.status.is_game_over() {
            tracing::warn!(uci = text, status = %self.status, "move rejected: game is over");
            return Err(ChessError::IllegalMoveRequested {
                uci: text.to_string(),
                reason: format!("game is over ({})", self.status),
            });
        }

        let mut mv = moves::uci_to_move(&self.position, text).inspect_err(|err| {
            tracing::warn!(uci = text, %err, "move rejected");
        })?;
        self.commit(&mut mv)?;
        Ok(mv)
    }

    fn commit(&mut self, mv: &mut Move) -> Result<(), ChessError> {
        self.position.apply(mv)?;
        self.history.push(*mv);
        self.status = movegen::status(&self.position);
        tracing::debug!(%mv, status = %self.status, "move played");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Undo move
    // -----------------------------------------------------------------

    /// Undo the last move. Returns the move that was undone, with its
    /// snapshot consumed.
    pub fn undo_move(&mut self) -> Result<Move, ChessError> {
        let mut mv = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        if let Err(err) = self.position.undo(&mut mv) {
            self.history.push(mv);
            return Err(err);
        }
        self.status = movegen::status(&self.position);
        tracing::debug!(%mv, "move undone");
        Ok(mv)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fen::STARTING_FEN;
    use crate::engine::types::{Piece, PieceType};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn play_all(g: &mut Game, line: &[&str]) {
        for uci in line {
            g.play_uci(uci).unwrap();
        }
    }

    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    #[test]
    fn new_game_is_active() {
        let g = Game::new();
        assert_eq!(g.status(), GameStatus::Active);
        assert!(!g.is_game_over());
        assert_eq!(g.side_to_move(), Color::White);
        assert_eq!(g.to_fen(), STARTING_FEN);
        assert!(g.history().is_empty());
    }

    #[test]
    fn game_from_fen() {
        let g =
            Game::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(g.side_to_move(), Color::Black);
    }

    #[test]
    fn game_from_invalid_fen() {
        assert!(matches!(
            Game::from_fen("invalid"),
            Err(ChessError::MalformedInput(_))
        ));
    }

    #[test]
    fn game_from_finished_fen_reports_status() {
        let g = Game::from_fen("k6R/8/1K6/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(g.status(), GameStatus::Checkmate);
        assert!(g.is_game_over());
    }

    #[test]
    fn load_fen_resets_history() {
        let mut g = Game::new();
        g.play_uci("e2e4").unwrap();
        g.load_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(g.history().is_empty());
        assert!(g.load_fen("bad fen").is_err());
        assert_eq!(g.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    // -----------------------------------------------------------------
    // Making moves
    // -----------------------------------------------------------------

    #[test]
    fn make_move_fills_in_details() {
        let mut g = Game::new();
        let request = Move::new(sq("e2"), sq("e4"), Piece::new(PieceType::Pawn, Color::White));
        assert!(g.is_move_legal(&request));
        let played = g.make_move(request).unwrap();
        assert!(played.flags.is_double_push());
        assert!(played.is_applied());
        assert_eq!(g.side_to_move(), Color::Black);
        assert_eq!(g.history().len(), 1);
        assert_eq!(g.position().en_passant, Some(sq("e3")));
    }

    #[test]
    fn make_illegal_move_errors() {
        let mut g = Game::new();
        let mv = Move::new(sq("e2"), sq("e5"), Piece::new(PieceType::Pawn, Color::White));
        assert!(!g.is_move_legal(&mv));
        assert!(matches!(
            g.make_move(mv),
            Err(ChessError::IllegalMoveRequested { .. })
        ));
        assert_eq!(g.to_fen(), STARTING_FEN);
    }

    #[test]
    fn play_uci_rejects_bad_requests() {
        let mut g = Game::new();
        assert!(matches!(
            g.play_uci("e2"),
            Err(ChessError::MalformedInput(_))
        ));
        assert!(matches!(
            g.play_uci("e3e4"),
            Err(ChessError::IllegalMoveRequested { .. })
        ));
        assert!(matches!(
            g.play_uci("e7e5"),
            Err(ChessError::IllegalMoveRequested { .. })
        ));
        assert!(g.history().is_empty());
    }

    #[test]
    fn moves_rejected_after_mate() {
        let mut g = Game::new();
        play_all(&mut g, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(g.status(), GameStatus::Checkmate);
        assert!(g.legal_moves().is_empty());
        assert!(matches!(
            g.play_uci("e1f2"),
            Err(ChessError::IllegalMoveRequested { .. })
        ));
    }

    #[test]
    fn scholars_mate() {
        let mut g = Game::new();
        play_all(
            &mut g,
            &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"],
        );
        assert_eq!(g.status(), GameStatus::Checkmate);
        assert_eq!(g.history().len(), 7);
        assert_eq!(g.evaluate(), 100);
    }

    #[test]
    fn check_status_after_move() {
        let mut g = Game::new();
        play_all(&mut g, &["e2e4", "f7f6", "d2d4", "g7g5"]);
        g.play_uci("d1h5").unwrap();
        assert_eq!(g.status(), GameStatus::Checkmate);

        let mut g = Game::new();
        play_all(&mut g, &["e2e4", "d7d5", "f1b5"]);
        assert_eq!(g.status(), GameStatus::Check);
        assert!(!g.is_game_over());
    }

    #[test]
    fn stalemate_detection() {
        let mut g = Game::from_fen("k7/8/2K5/8/8/8/8/1Q6 w - - 0 1").unwrap();
        g.play_uci("b1b6").unwrap();
        assert_eq!(g.status(), GameStatus::Stalemate);
        assert!(g.is_game_over());
    }

    // -----------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------

    #[test]
    fn undo_single_move() {
        let mut g = Game::new();
        g.play_uci("g1f3").unwrap();
        let undone = g.undo_move().unwrap();
        assert_eq!(undone.to_string(), "g1f3");
        assert!(!undone.is_applied());
        assert_eq!(g.to_fen(), STARTING_FEN);
        assert_eq!(*g.position(), Position::starting());
    }

    #[test]
    fn undo_nothing_errors() {
        let mut g = Game::new();
        assert!(matches!(g.undo_move(), Err(ChessError::NothingToUndo)));
    }

    #[test]
    fn undo_restores_every_intermediate_position() {
        let mut g = Game::new();
        let line = [
            "e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6", "d5c6", "d8d2", "b1d2", "e8d8",
            "c6b7", "a7a6", "b7a8q",
        ];
        let mut fens = vec![g.to_fen()];
        for uci in line {
            g.play_uci(uci).unwrap();
            fens.push(g.to_fen());
        }
        fens.pop();
        while let Some(expected) = fens.pop() {
            g.undo_move().unwrap();
            assert_eq!(g.to_fen(), expected);
        }
        assert!(g.history().is_empty());
        assert!(matches!(g.undo_move(), Err(ChessError::NothingToUndo)));
    }

    #[test]
    fn undo_after_mate_reopens_game() {
        let mut g = Game::new();
        play_all(&mut g, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert!(g.is_game_over());
        g.undo_move().unwrap();
        assert_eq!(g.status(), GameStatus::Active);
        assert!(!g.is_game_over());
    }
}
