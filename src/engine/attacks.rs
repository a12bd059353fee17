//! Attack tables and ray walking.
//!
//! Leaper tables (knight, king, pawn pushes and captures) are built once per
//! process via `OnceLock` and are read-only afterwards, so any number of
//! positions may share them. Each table entry is produced by shifting a
//! single-square bitboard by the piece's offset and masking out the files a
//! wrapped shift would land on.
//!
//! Sliding pieces are not tabulated per occupancy: their attacks are found by
//! walking each ray from the source square until the edge of the board or the
//! first occupied square, which is included.

use crate::engine::types::{Bitboard, Color, Square};
use std::sync::OnceLock;

// =========================================================================
// Public API
// =========================================================================

/// Get a reference to the global attack tables.
pub fn tables() -> &'static AttackTables {
    static TABLES: OnceLock<AttackTables> = OnceLock::new();
    TABLES.get_or_init(AttackTables::init)
}

/// Orthogonal ray directions as (file delta, rank delta).
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Diagonal ray directions as (file delta, rank delta).
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Pre-computed attack/move tables for the non-sliding pieces.
pub struct AttackTables {
    pub knight: [Bitboard; 64],
    pub king: [Bitboard; 64],
    /// `pawn_push[color][square]`: the square one step ahead.
    pub pawn_push: [[Bitboard; 64]; 2],
    /// `pawn_double_push[color][square]`: two steps ahead, start rank only.
    pub pawn_double_push: [[Bitboard; 64]; 2],
    /// `pawn_attacks[color][square]`: squares a pawn on `square` attacks.
    pub pawn_attacks: [[Bitboard; 64]; 2],
}

impl AttackTables {
    /// Knight attacks from a square.
    #[inline]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight[sq.index()]
    }

    /// King attacks from a square.
    #[inline]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king[sq.index()]
    }

    #[inline]
    pub fn pawn_push(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_push[color.index()][sq.index()]
    }

    #[inline]
    pub fn pawn_double_push(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_double_push[color.index()][sq.index()]
    }

    /// Pawn capture squares for a given colour.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_attacks[color.index()][sq.index()]
    }

    /// Rook attacks from `sq` given current `occupied` bitboard.
    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        ray_attacks(sq, &ROOK_DIRECTIONS, occupied)
    }

    /// Bishop attacks from `sq` given current `occupied` bitboard.
    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        ray_attacks(sq, &BISHOP_DIRECTIONS, occupied)
    }

    /// Queen attacks = rook | bishop.
    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook_attacks(sq, occupied) | self.bishop_attacks(sq, occupied)
    }
}

// =========================================================================
// Ray walking
// =========================================================================

/// Walk every direction in `directions` from `sq`. Each empty square is
/// included; the first occupied square is included and ends the ray.
pub fn ray_attacks(sq: Square, directions: &[(i8, i8)], occupied: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in directions {
        let mut cursor = sq;
        while let Some(next) = cursor.offset(df, dr) {
            attacks.set(next);
            if occupied.is_set(next) {
                break;
            }
            cursor = next;
        }
    }
    attacks
}

/// First occupied square along one ray from `sq`, if any.
pub fn first_blocker(sq: Square, (df, dr): (i8, i8), occupied: Bitboard) -> Option<Square> {
    let mut cursor = sq;
    while let Some(next) = cursor.offset(df, dr) {
        if occupied.is_set(next) {
            return Some(next);
        }
        cursor = next;
    }
    None
}

// =========================================================================
// Initialisation
// =========================================================================

impl AttackTables {
    fn init() -> Self {
        let mut tables = AttackTables {
            knight: [Bitboard::EMPTY; 64],
            king: [Bitboard::EMPTY; 64],
            pawn_push: [[Bitboard::EMPTY; 64]; 2],
            pawn_double_push: [[Bitboard::EMPTY; 64]; 2],
            pawn_attacks: [[Bitboard::EMPTY; 64]; 2],
        };

        for sq in Square::all() {
            let i = sq.index();
            let bb = Bitboard::from_square(sq);
            tables.knight[i] = knight_attacks_for(bb);
            tables.king[i] = king_attacks_for(bb);

            for color in Color::BOTH {
                let c = color.index();
                tables.pawn_push[c][i] = pawn_push_for(bb, color);
                tables.pawn_attacks[c][i] = pawn_attacks_for(bb, color);
                if sq.rank() == color.pawn_start_rank() {
                    tables.pawn_double_push[c][i] = pawn_push_for(pawn_push_for(bb, color), color);
                }
            }
        }

        tables
    }
}

#[inline]
fn shl(bb: Bitboard, n: u32) -> Bitboard {
    Bitboard(bb.0 << n)
}

#[inline]
fn shr(bb: Bitboard, n: u32) -> Bitboard {
    Bitboard(bb.0 >> n)
}

fn knight_attacks_for(bb: Bitboard) -> Bitboard {
    (shl(bb, 17) & Bitboard::NOT_FILE_A)
        | (shl(bb, 15) & Bitboard::NOT_FILE_H)
        | (shl(bb, 10) & Bitboard::NOT_FILE_AB)
        | (shl(bb, 6) & Bitboard::NOT_FILE_GH)
        | (shr(bb, 17) & Bitboard::NOT_FILE_H)
        | (shr(bb, 15) & Bitboard::NOT_FILE_A)
        | (shr(bb, 10) & Bitboard::NOT_FILE_GH)
        | (shr(bb, 6) & Bitboard::NOT_FILE_AB)
}

fn king_attacks_for(bb: Bitboard) -> Bitboard {
    // Vertical steps fall off the end of the word instead of wrapping.
    shl(bb, 8)
        | shr(bb, 8)
        | (shl(bb, 1) & Bitboard::NOT_FILE_A)
        | (shr(bb, 1) & Bitboard::NOT_FILE_H)
        | (shl(bb, 9) & Bitboard::NOT_FILE_A)
        | (shl(bb, 7) & Bitboard::NOT_FILE_H)
        | (shr(bb, 7) & Bitboard::NOT_FILE_A)
        | (shr(bb, 9) & Bitboard::NOT_FILE_H)
}

fn pawn_push_for(bb: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => shl(bb, 8),
        Color::Black => shr(bb, 8),
    }
}

fn pawn_attacks_for(bb: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => (shl(bb, 7) & Bitboard::NOT_FILE_H) | (shl(bb, 9) & Bitboard::NOT_FILE_A),
        Color::Black => (shr(bb, 9) & Bitboard::NOT_FILE_H) | (shr(bb, 7) & Bitboard::NOT_FILE_A),
    }
}

// =========================================================================
// Tests
// =========================================================================
