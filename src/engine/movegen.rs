//! Legal move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves (ignoring pins / check evasion).
//!   2. Filter: play the move on a scratch copy and reject it if the mover's
//!      own king is then attacked.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::moves::{Move, MoveFlags};
use crate::engine::types::{Bitboard, Color, GameStatus, Piece, PieceType, Square, Wing};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal(pos, &mut pseudo);

    pseudo
        .into_iter()
        .filter(|mv| leaves_king_safe(pos, mv))
        .collect()
}

/// Generate all legal moves originating from a specific square.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    legal_moves(pos)
        .into_iter()
        .filter(|m| m.from == from)
        .collect()
}

/// Moves that follow piece movement rules but may leave the own king attacked.
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    generate_pseudo_legal(pos, &mut moves);
    moves
}

/// The side to move has no legal move (checkmate or stalemate).
pub fn is_game_over(pos: &Position) -> bool {
    legal_moves(pos).is_empty()
}

/// Classify the position for the side to move.
pub fn status(pos: &Position) -> GameStatus {
    let in_check = pos.is_in_check();
    match (legal_moves(pos).is_empty(), in_check) {
        (true, true) => GameStatus::Checkmate,
        (true, false) => GameStatus::Stalemate,
        (false, true) => GameStatus::Check,
        (false, false) => GameStatus::Active,
    }
}

fn leaves_king_safe(pos: &Position, mv: &Move) -> bool {
    let us = mv.piece.color;
    let mut scratch = pos.clone();
    scratch.play(mv);
    if scratch.is_king_attacked(us) {
        tracing::trace!(%mv, "rejected: leaves king attacked");
        return false;
    }
    true
}

// =========================================================================
// Pseudo-legal generation (internal)
// =========================================================================

fn generate_pseudo_legal(pos: &Position, moves: &mut Vec<Move>) {
    let us = pos.side_to_move;
    generate_pawn_moves(pos, us, moves);
    generate_leaper_moves(pos, us, PieceType::Knight, moves);
    generate_leaper_moves(pos, us, PieceType::King, moves);
    generate_slider_moves(pos, us, PieceType::Bishop, moves);
    generate_slider_moves(pos, us, PieceType::Rook, moves);
    generate_slider_moves(pos, us, PieceType::Queen, moves);
    generate_castling_moves(pos, us, moves);
}

/// Quiet move or capture, depending on what stands on `to`.
fn step(pos: &Position, from: Square, to: Square, piece: Piece) -> Move {
    match pos.piece_at(to) {
        Some(captured) => Move::capture(from, to, piece, captured),
        None => Move::new(from, to, piece),
    }
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(pos: &Position, us: Color, moves: &mut Vec<Move>) {
    let t = attacks::tables();
    let piece = Piece::new(PieceType::Pawn, us);
    let enemy = pos.occupied_by(!us);
    let empty = !pos.occupied();

    for from in pos.bb(us, PieceType::Pawn).iter() {
        // --- Single push, then double push through the same empty square ---
        for to in (t.pawn_push(us, from) & empty).iter() {
            push_pawn_move(Move::new(from, to, piece), us, moves);

            for to2 in (t.pawn_double_push(us, from) & empty).iter() {
                moves.push(Move::new(from, to2, piece).with_flags(MoveFlags::DOUBLE_PUSH));
            }
        }

        // --- Captures (including promotion captures) ---
        for to in (t.pawn_attacks(us, from) & enemy).iter() {
            push_pawn_move(step(pos, from, to, piece), us, moves);
        }

        // --- En passant ---
        if let Some(ep_sq) = pos.en_passant
            && t.pawn_attacks(us, from).is_set(ep_sq)
            && !pos.occupied().is_set(ep_sq)
            && let Some(mv) = en_passant_capture(pos, from, ep_sq, piece)
        {
            moves.push(mv);
        }
    }
}

/// The passed pawn sits beside the capturer, one rank behind the target.
fn en_passant_capture(pos: &Position, from: Square, ep_sq: Square, piece: Piece) -> Option<Move> {
    let victim_sq = Square::from_file_rank(ep_sq.file(), from.rank()).ok()?;
    let victim = Piece::new(PieceType::Pawn, !piece.color);
    (pos.piece_at(victim_sq) == Some(victim))
        .then(|| Move::capture(from, ep_sq, piece, victim).with_flags(MoveFlags::EN_PASSANT))
}

/// Push a pawn move, expanding it into the four promotions on the last rank.
fn push_pawn_move(mv: Move, us: Color, moves: &mut Vec<Move>) {
    if mv.to.rank() == us.promotion_rank() {
        for promo in PieceType::PROMOTIONS {
            moves.push(mv.with_promotion(promo));
        }
    } else {
        moves.push(mv);
    }
}

// =========================================================================
// Knight and king moves (non-castling)
// =========================================================================

fn generate_leaper_moves(pos: &Position, us: Color, kind: PieceType, moves: &mut Vec<Move>) {
    let t = attacks::tables();
    let piece = Piece::new(kind, us);
    let friendly = pos.occupied_by(us);

    for from in pos.bb(us, kind).iter() {
        let attacks = match kind {
            PieceType::Knight => t.knight_attacks(from),
            PieceType::King => t.king_attacks(from),
            _ => unreachable!("not a leaper: {kind}"),
        };
        for to in (attacks & !friendly).iter() {
            moves.push(step(pos, from, to, piece));
        }
    }
}

// =========================================================================
// Slider moves (bishop, rook, queen)
// =========================================================================

fn generate_slider_moves(pos: &Position, us: Color, kind: PieceType, moves: &mut Vec<Move>) {
    let t = attacks::tables();
    let piece = Piece::new(kind, us);
    let friendly = pos.occupied_by(us);
    let occ = pos.occupied();

    for from in pos.bb(us, kind).iter() {
        let attacks = match kind {
            PieceType::Bishop => t.bishop_attacks(from, occ),
            PieceType::Rook => t.rook_attacks(from, occ),
            PieceType::Queen => t.queen_attacks(from, occ),
            _ => unreachable!("not a slider: {kind}"),
        };
        // Rays include the first blocker; masking own pieces keeps enemy captures.
        for to in (attacks & !friendly).iter() {
            moves.push(step(pos, from, to, piece));
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

/// Fixed squares involved in one castling move.
struct CastlingPath {
    king_from: Square,
    king_to: Square,
    rook_from: Square,
    rook_to: Square,
    /// Squares between king and rook; all must be empty.
    between: Bitboard,
    /// Squares the king passes over or lands on; none may be attacked.
    transit: [Square; 2],
}

const fn castling_path(color: Color, wing: Wing) -> CastlingPath {
    match (color, wing) {
        (Color::White, Wing::Kingside) => CastlingPath {
            king_from: Square::E1,
            king_to: Square::G1,
            rook_from: Square::H1,
            rook_to: Square::F1,
            between: Bitboard(0x0000_0000_0000_0060),
            transit: [Square::F1, Square::G1],
        },
        (Color::White, Wing::Queenside) => CastlingPath {
            king_from: Square::E1,
            king_to: Square::C1,
            rook_from: Square::A1,
            rook_to: Square::D1,
            between: Bitboard(0x0000_0000_0000_000E),
            transit: [Square::D1, Square::C1],
        },
        (Color::Black, Wing::Kingside) => CastlingPath {
            king_from: Square::E8,
            king_to: Square::G8,
            rook_from: Square::H8,
            rook_to: Square::F8,
            between: Bitboard(0x6000_0000_0000_0000),
            transit: [Square::F8, Square::G8],
        },
        (Color::Black, Wing::Queenside) => CastlingPath {
            king_from: Square::E8,
            king_to: Square::C8,
            rook_from: Square::A8,
            rook_to: Square::D8,
            between: Bitboard(0x0E00_0000_0000_0000),
            transit: [Square::D8, Square::C8],
        },
    }
}

fn generate_castling_moves(pos: &Position, us: Color, moves: &mut Vec<Move>) {
    let them = !us;
    let king = Piece::new(PieceType::King, us);
    let rook = Piece::new(PieceType::Rook, us);

    for wing in [Wing::Kingside, Wing::Queenside] {
        if !pos.castling_rights.has(us, wing) {
            continue;
        }
        let path = castling_path(us, wing);

        if pos.piece_at(path.king_from) != Some(king)
            || pos.piece_at(path.rook_from) != Some(rook)
            || (pos.occupied() & path.between).is_not_empty()
        {
            continue;
        }

        // Can't castle out of, through, or into check.
        if pos.is_square_attacked(path.king_from, them)
            || path
                .transit
                .iter()
                .any(|&sq| pos.is_square_attacked(sq, them))
        {
            continue;
        }

        moves.push(
            Move::new(path.king_from, path.king_to, king).with_castling(path.rook_from, path.rook_to),
        );
    }
}

// =========================================================================
// Tests
// =========================================================================
