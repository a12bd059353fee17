//! Bitboard-based chess position representation.
//!
//! `Position` stores piece placement as 12 bitboards (2 colours × 6 piece types),
//! redundant occupancy bitboards, side to move, castling rights, en-passant
//! square and the move counters. Moves are applied and reversed in place.

use crate::engine::attacks::{self, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use crate::engine::fen::{self, FenRecord};
use crate::engine::moves::{Move, Snapshot};
use crate::engine::types::{
    Bitboard, CastlingRights, ChessError, Color, Piece, PieceType, Square, Wing,
};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position using bitboard representation.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
///
/// Equality compares every bitboard and every auxiliary field, so two
/// positions are `==` exactly when they are bit-for-bit identical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Piece bitboards: `pieces[color][piece_type]`.
    pieces: [[Bitboard; PieceType::COUNT]; 2],

    /// Per-colour occupancy (union of all piece bitboards for that colour).
    occupied: [Bitboard; 2],

    /// Total occupancy (union of both colours).
    all_occupied: Bitboard,

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock (reset on pawn move or capture).
    pub halfmove_clock: u16,

    /// Full-move number, incremented after Black's move.
    pub fullmove_number: u16,
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; PieceType::COUNT]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        let mut pos = Position::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for color in Color::BOTH {
            let back = color.back_rank() * 8;
            let pawns = color.pawn_start_rank() * 8;
            for (file, &kind) in back_rank.iter().enumerate() {
                let file = file as u8;
                pos.put_piece(Square::from_index(back + file), Piece::new(kind, color));
                pos.put_piece(
                    Square::from_index(pawns + file),
                    Piece::new(PieceType::Pawn, color),
                );
            }
        }
        pos.castling_rights = CastlingRights::ALL;
        pos
    }

    /// Build a position from an already-parsed FEN record.
    ///
    /// Rejects records that assign a square twice or give a side more than
    /// one king.
    pub fn from_record(record: &FenRecord) -> Result<Self, ChessError> {
        let mut pos = Position::empty();
        for &(sq, piece) in &record.placement {
            if let Some(existing) = pos.piece_at(sq) {
                return Err(ChessError::MalformedInput(format!(
                    "square {sq} assigned twice ({} and {})",
                    existing.to_char(),
                    piece.to_char()
                )));
            }
            pos.put_piece(sq, piece);
        }

        for color in Color::BOTH {
            let kings = pos.bb(color, PieceType::King).pop_count();
            if kings > 1 {
                return Err(ChessError::MalformedInput(format!(
                    "{color} has {kings} kings"
                )));
            }
        }

        pos.side_to_move = record.side_to_move;
        pos.castling_rights = record.castling_rights;
        pos.en_passant = record.en_passant;
        pos.halfmove_clock = record.halfmove_clock;
        pos.fullmove_number = record.fullmove_number;

        #[cfg(debug_assertions)]
        pos.assert_consistent();

        Ok(pos)
    }

    /// Parse a FEN string into a `Position`.
    pub fn from_fen(text: &str) -> Result<Self, ChessError> {
        let record = fen::parse(text)?;
        let pos = Position::from_record(&record)?;
        tracing::debug!(fen = text, "position loaded");
        Ok(pos)
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        fen::serialize(self)
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// Place a piece on a square. The square must be empty.
    #[inline]
    pub(crate) fn put_piece(&mut self, sq: Square, piece: Piece) {
        let bb = Bitboard::from_square(sq);
        self.pieces[piece.color.index()][piece.kind.index()] |= bb;
        self.occupied[piece.color.index()] |= bb;
        self.all_occupied |= bb;
    }

    /// Remove a known piece from a square.
    #[inline]
    pub(crate) fn remove_piece(&mut self, sq: Square, piece: Piece) {
        let bb = !Bitboard::from_square(sq);
        self.pieces[piece.color.index()][piece.kind.index()] &= bb;
        self.occupied[piece.color.index()] &= bb;
        self.all_occupied &= bb;
    }

    /// Empty a square in all 12 bitboards, returning what stood there.
    pub fn clear_square(&mut self, sq: Square) -> Option<Piece> {
        let previous = self.piece_at(sq);
        let mask = !Bitboard::from_square(sq);
        for color in Color::BOTH {
            for kind in PieceType::ALL {
                self.pieces[color.index()][kind.index()] &= mask;
            }
            self.occupied[color.index()] &= mask;
        }
        self.all_occupied &= mask;
        previous
    }

    /// Set the content of a square. The square is cleared from every piece
    /// bitboard first, so placements never overlap.
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.clear_square(sq);
        if let Some(piece) = piece {
            self.put_piece(sq, piece);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        let bb = Bitboard::from_square(sq);

        if (self.all_occupied & bb).is_empty() {
            return None;
        }

        let color = if (self.occupied[Color::White.index()] & bb).is_not_empty() {
            Color::White
        } else {
            Color::Black
        };

        PieceType::ALL
            .into_iter()
            .find(|pt| (self.pieces[color.index()][pt.index()] & bb).is_not_empty())
            .map(|kind| Piece::new(kind, color))
    }

    /// Bitboard of all pieces of a given colour and type.
    #[inline]
    pub fn bb(&self, color: Color, piece: PieceType) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occupied[color.index()]
    }

    #[inline]
    pub fn white_occupied(&self) -> Bitboard {
        self.occupied[Color::White.index()]
    }

    #[inline]
    pub fn black_occupied(&self) -> Bitboard {
        self.occupied[Color::Black.index()]
    }

    /// Union of all 12 piece bitboards.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.all_occupied
    }

    /// The king square for `color`, or `None` on a board without that king.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.bb(color, PieceType::King).lsb()
    }

    // -----------------------------------------------------------------------
    // Consistency check
    // -----------------------------------------------------------------------

    /// Verify that piece bitboards are disjoint and that the redundant
    /// occupancy bitboards match them. Panics on violation.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        let mut seen = Bitboard::EMPTY;
        for color in Color::BOTH {
            let mut expected = Bitboard::EMPTY;
            for pt in PieceType::ALL {
                let bb = self.pieces[color.index()][pt.index()];
                assert!(
                    (seen & bb).is_empty(),
                    "overlapping piece bitboards at {color} {pt}"
                );
                seen |= bb;
                expected |= bb;
            }
            assert_eq!(
                self.occupied[color.index()],
                expected,
                "occupancy mismatch for {color:?}",
            );
        }
        assert!(
            (self.white_occupied() & self.black_occupied()).is_empty(),
            "colour occupancies overlap"
        );
        assert_eq!(
            self.all_occupied,
            self.white_occupied() | self.black_occupied(),
            "all_occupied mismatch",
        );
    }

    // -----------------------------------------------------------------------
    // Attack detection
    // -----------------------------------------------------------------------

    /// Is `sq` attacked by any piece of colour `by`?
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let t = attacks::tables();
        let occ = self.all_occupied;

        // A `by` pawn attacks `sq` iff a pawn of the other colour on `sq`
        // would attack that pawn's square.
        if (t.pawn_attacks(!by, sq) & self.bb(by, PieceType::Pawn)).is_not_empty() {
            return true;
        }

        if (t.knight_attacks(sq) & self.bb(by, PieceType::Knight)).is_not_empty() {
            return true;
        }

        if (t.king_attacks(sq) & self.bb(by, PieceType::King)).is_not_empty() {
            return true;
        }

        let rook_queen = self.bb(by, PieceType::Rook) | self.bb(by, PieceType::Queen);
        let bishop_queen = self.bb(by, PieceType::Bishop) | self.bb(by, PieceType::Queen);

        let mut orthogonal = ROOK_DIRECTIONS
            .iter()
            .filter_map(|&dir| attacks::first_blocker(sq, dir, occ));
        let mut diagonal = BISHOP_DIRECTIONS
            .iter()
            .filter_map(|&dir| attacks::first_blocker(sq, dir, occ));

        orthogonal.any(|b| rook_queen.is_set(b)) || diagonal.any(|b| bishop_queen.is_set(b))
    }

    /// Is `color`'s king attacked? A side without a king is never in check.
    pub fn is_king_attacked(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_square_attacked(king, !color))
    }

    /// Is the side-to-move's king currently in check?
    #[inline]
    pub fn is_in_check(&self) -> bool {
        self.is_king_attacked(self.side_to_move)
    }

    // -----------------------------------------------------------------------
    // Apply / Undo
    // -----------------------------------------------------------------------

    /// Apply `mv` in place, recording the overwritten state in the move.
    ///
    /// The move must describe this position: its piece stands on `from` and
    /// belongs to the side to move, its capture matches the board, and it is
    /// not already applied. Legality (own king safety) is the generator's
    /// responsibility. Nothing is mutated when an error is returned.
    pub fn apply(&mut self, mv: &mut Move) -> Result<(), ChessError> {
        if mv.is_applied() {
            return Err(ChessError::MoveAlreadyApplied(mv.to_string()));
        }
        self.check_applicable(mv)?;
        mv.snapshot = Some(self.play(mv));
        Ok(())
    }

    /// Reverse `mv`, which must be the most recent move applied here.
    ///
    /// Restores the position bit for bit and clears the move's snapshot.
    pub fn undo(&mut self, mv: &mut Move) -> Result<(), ChessError> {
        let snapshot = mv
            .snapshot
            .ok_or_else(|| ChessError::MoveNotApplied(mv.to_string()))?;

        let landing = landing_piece(mv);
        if self.side_to_move == mv.piece.color || self.piece_at(mv.to) != Some(landing) {
            return Err(ChessError::IllegalMoveRequested {
                uci: mv.to_string(),
                reason: "position does not follow this move".to_string(),
            });
        }

        self.unplay(mv, &snapshot);
        mv.snapshot = None;
        Ok(())
    }

    fn check_applicable(&self, mv: &Move) -> Result<(), ChessError> {
        let reject = |reason: &str| {
            Err(ChessError::IllegalMoveRequested {
                uci: mv.to_string(),
                reason: reason.to_string(),
            })
        };

        if mv.piece.color != self.side_to_move {
            return reject("piece does not belong to the side to move");
        }
        if self.piece_at(mv.from) != Some(mv.piece) {
            return reject("moving piece is not on the source square");
        }
        if mv.flags.is_en_passant() {
            if mv.piece.kind != PieceType::Pawn || self.en_passant != Some(mv.to) {
                return reject("destination is not the en passant target");
            }
            let Some(victim) = en_passant_victim(mv.to, mv.piece.color) else {
                return reject("en passant target has no square behind it");
            };
            if self.piece_at(mv.to).is_some() || self.piece_at(victim) != mv.captured {
                return reject("en passant capture does not match the board");
            }
        } else if self.piece_at(mv.to) != mv.captured {
            return reject("captured piece does not match the destination");
        }
        if let Some(rook) = mv.castling {
            let own_rook = Piece::new(PieceType::Rook, mv.piece.color);
            if self.piece_at(rook.from) != Some(own_rook) || self.piece_at(rook.to).is_some() {
                return reject("castling rook is not in place");
            }
        }
        Ok(())
    }

    /// Move the pieces and update state without validation. Returns the
    /// state needed to reverse the move.
    pub(crate) fn play(&mut self, mv: &Move) -> Snapshot {
        let us = mv.piece.color;
        let them = !us;

        let snapshot = Snapshot {
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };

        // ---- Capture ----
        if mv.flags.is_en_passant() {
            if let Some(victim) = en_passant_victim(mv.to, us) {
                self.remove_piece(victim, Piece::new(PieceType::Pawn, them));
            }
        } else if let Some(captured) = mv.captured {
            self.remove_piece(mv.to, captured);
        }

        // ---- Move (and promote) the piece ----
        self.remove_piece(mv.from, mv.piece);
        self.put_piece(mv.to, landing_piece(mv));

        // ---- Castling: move the rook ----
        let rook = Piece::new(PieceType::Rook, us);
        if let Some(castle) = mv.castling {
            self.remove_piece(castle.from, rook);
            self.put_piece(castle.to, rook);
            self.castling_rights.remove_color(us);
        }

        // ---- Castling rights touched by king/rook moves and rook captures ----
        revoke_rights(&mut self.castling_rights, mv.from);
        revoke_rights(&mut self.castling_rights, mv.to);

        // ---- En passant target ----
        self.en_passant = if mv.flags.is_double_push() {
            Some(Square::from_index(((mv.from.index() + mv.to.index()) / 2) as u8))
        } else {
            None
        };

        // ---- Clocks ----
        if mv.piece.kind == PieceType::Pawn || mv.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = them;
        snapshot
    }

    /// Exact inverse of [`play`](Self::play).
    pub(crate) fn unplay(&mut self, mv: &Move, snapshot: &Snapshot) {
        let us = mv.piece.color;
        let them = !us;

        self.side_to_move = us;

        if let Some(castle) = mv.castling {
            let rook = Piece::new(PieceType::Rook, us);
            self.remove_piece(castle.to, rook);
            self.put_piece(castle.from, rook);
        }

        self.remove_piece(mv.to, landing_piece(mv));
        self.put_piece(mv.from, mv.piece);

        if mv.flags.is_en_passant() {
            if let Some(victim) = en_passant_victim(mv.to, us) {
                self.put_piece(victim, Piece::new(PieceType::Pawn, them));
            }
        } else if let Some(captured) = mv.captured {
            self.put_piece(mv.to, captured);
        }

        self.castling_rights = snapshot.castling_rights;
        self.en_passant = snapshot.en_passant;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8u8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8u8 {
                let sq = Square::from_index(rank * 8 + file);
                s.push(self.piece_at(sq).map_or('.', Piece::to_char));
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// Helpers (free functions)
// ---------------------------------------------------------------------------

/// The piece that stands on `to` after the move.
#[inline]
fn landing_piece(mv: &Move) -> Piece {
    mv.promotion
        .map_or(mv.piece, |kind| Piece::new(kind, mv.piece.color))
}

/// Square of the pawn removed by an en-passant capture landing on `to`:
/// one rank behind the destination, seen from the capturing side.
#[inline]
fn en_passant_victim(to: Square, mover: Color) -> Option<Square> {
    match mover {
        Color::White => to.offset(0, -1),
        Color::Black => to.offset(0, 1),
    }
}

/// A move leaving or landing on a king/rook home square drops the rights
/// that depend on that piece.
fn revoke_rights(rights: &mut CastlingRights, sq: Square) {
    match sq {
        Square::E1 => rights.remove_color(Color::White),
        Square::A1 => rights.remove(Color::White, Wing::Queenside),
        Square::H1 => rights.remove(Color::White, Wing::Kingside),
        Square::E8 => rights.remove_color(Color::Black),
        Square::A8 => rights.remove(Color::Black, Wing::Queenside),
        Square::H8 => rights.remove(Color::Black, Wing::Kingside),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::starting()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
