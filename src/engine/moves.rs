//! Move representation and coordinate notation.
//!
//! Every kind of move (quiet, capture, en passant, promotion, castling) is a
//! single [`Move`] value with optional fields, so apply and undo follow one
//! code path. A move also carries the [`Snapshot`] of state that apply
//! overwrites; it is written by [`Position::apply`] and consumed by
//! [`Position::undo`].
//!
//! [`Position::apply`]: crate::engine::board::Position::apply
//! [`Position::undo`]: crate::engine::board::Position::undo

use std::fmt;

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{CastlingRights, ChessError, Piece, PieceType, Square};

// ---------------------------------------------------------------------------
// MoveFlags
// ---------------------------------------------------------------------------

/// Flags for special move types packed in a single byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags(pub u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1);
    pub const EN_PASSANT: MoveFlags = MoveFlags(2);
    pub const CASTLING: MoveFlags = MoveFlags(4);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(8);

    #[inline]
    pub fn is_capture(self) -> bool {
        self.0 & Self::CAPTURE.0 != 0
    }

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT.0 != 0
    }

    #[inline]
    pub fn is_castling(self) -> bool {
        self.0 & Self::CASTLING.0 != 0
    }

    #[inline]
    pub fn is_double_push(self) -> bool {
        self.0 & Self::DOUBLE_PUSH.0 != 0
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        MoveFlags(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// CastlingRook / Snapshot
// ---------------------------------------------------------------------------

/// The rook transfer that accompanies a castling king move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingRook {
    pub from: Square,
    pub to: Square,
}

/// Position state overwritten by apply and restored by undo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A chess move with everything needed to apply and reverse it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// The piece standing on `from` before the move.
    pub piece: Piece,
    /// The captured piece. For en passant this pawn is not on `to`.
    pub captured: Option<Piece>,
    /// The piece kind a pawn becomes on the far rank.
    pub promotion: Option<PieceType>,
    pub castling: Option<CastlingRook>,
    pub flags: MoveFlags,
    pub(crate) snapshot: Option<Snapshot>,
}

impl Move {
    /// A quiet move.
    pub fn new(from: Square, to: Square, piece: Piece) -> Self {
        Move {
            from,
            to,
            piece,
            captured: None,
            promotion: None,
            castling: None,
            flags: MoveFlags::NONE,
            snapshot: None,
        }
    }

    /// A move onto a square holding `captured`.
    pub fn capture(from: Square, to: Square, piece: Piece, captured: Piece) -> Self {
        Move {
            captured: Some(captured),
            flags: MoveFlags::CAPTURE,
            ..Move::new(from, to, piece)
        }
    }

    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    pub fn with_promotion(mut self, promotion: PieceType) -> Self {
        self.promotion = Some(promotion);
        self
    }

    pub fn with_castling(mut self, rook_from: Square, rook_to: Square) -> Self {
        self.castling = Some(CastlingRook {
            from: rook_from,
            to: rook_to,
        });
        self.flags = self.flags | MoveFlags::CASTLING;
        self
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_castling(&self) -> bool {
        self.castling.is_some()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.flags.is_en_passant()
    }

    /// Whether apply has run and undo has not.
    #[inline]
    pub fn is_applied(&self) -> bool {
        self.snapshot.is_some()
    }

    /// State saved by the last apply, if the move is currently applied.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Same from/to/promotion, ignoring snapshot state.
    pub fn same_action(&self, other: &Move) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Coordinate notation
// ---------------------------------------------------------------------------

/// Coordinate text for a move: `e2e4`, `a7a8q`.
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_string()
}

/// Parsed-but-unresolved coordinate text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

/// Split coordinate text into squares and an optional promotion letter.
pub fn parse_uci(text: &str) -> Result<UciMove, ChessError> {
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(ChessError::MalformedInput(format!(
            "move text '{text}' must be 4 or 5 characters"
        )));
    }
    let from = Square::from_algebraic(&text[0..2])?;
    let to = Square::from_algebraic(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(c) => match PieceType::from_char(c) {
            Some(kind) if c.is_ascii_lowercase() && PieceType::PROMOTIONS.contains(&kind) => {
                Some(kind)
            }
            _ => {
                return Err(ChessError::MalformedInput(format!(
                    "invalid promotion letter '{c}' in '{text}'"
                )));
            }
        },
    };
    Ok(UciMove {
        from,
        to,
        promotion,
    })
}

/// Resolve coordinate text against `pos` into the matching legal move.
///
/// Fails with `IllegalMoveRequested` when the source square is empty, holds
/// a piece of the side not to move, or no legal move matches.
pub fn uci_to_move(pos: &Position, text: &str) -> Result<Move, ChessError> {
    let parsed = parse_uci(text)?;
    let illegal = |reason: String| ChessError::IllegalMoveRequested {
        uci: text.to_string(),
        reason,
    };

    match pos.piece_at(parsed.from) {
        None => return Err(illegal(format!("no piece on {}", parsed.from))),
        Some(piece) if piece.color != pos.side_to_move => {
            return Err(illegal(format!(
                "{} belongs to {}, but {} is to move",
                parsed.from, piece.color, pos.side_to_move
            )));
        }
        Some(_) => {}
    }

    movegen::legal_moves_from(pos, parsed.from)
        .into_iter()
        .find(|m| m.to == parsed.to && m.promotion == parsed.promotion)
        .ok_or_else(|| illegal("not a legal move".to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
