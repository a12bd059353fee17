//! FEN text codec.
//!
//! [`parse`] checks the six fields syntactically and produces a
//! [`FenRecord`]; [`Position::from_record`] applies the semantic checks.
//! [`serialize`] writes the canonical form, so `serialize(parse(f)) == f`
//! for canonically formatted input.

use crate::engine::board::Position;
use crate::engine::types::{CastlingRights, ChessError, Color, Piece, Square};

/// Standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A syntactically valid FEN, not yet checked against chess rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FenRecord {
    /// Occupied squares in FEN order (rank 8 first, files a..h).
    pub placement: Vec<(Square, Piece)>,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
}

fn malformed(msg: String) -> ChessError {
    ChessError::MalformedInput(msg)
}

/// Parse FEN text into a [`FenRecord`].
pub fn parse(text: &str) -> Result<FenRecord, ChessError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(malformed(format!(
            "expected 6 fields, got {}",
            fields.len()
        )));
    }

    // ----- Field 1: Piece placement -----
    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(malformed(format!("expected 8 ranks, got {}", ranks.len())));
    }

    let mut placement = Vec::with_capacity(32);
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8; // FEN starts from rank 8
        let mut file: u8 = 0;
        for ch in rank_str.chars() {
            if file > 7 {
                return Err(malformed(format!(
                    "too many squares in rank {}",
                    rank + 1
                )));
            }
            if let Some(digit) = ch.to_digit(10) {
                if !(1..=8).contains(&digit) {
                    return Err(malformed(format!(
                        "invalid empty count '{ch}' in rank {}",
                        rank + 1
                    )));
                }
                file += digit as u8;
            } else if let Some(piece) = Piece::from_char(ch) {
                placement.push((Square::from_index(rank * 8 + file), piece));
                file += 1;
            } else {
                return Err(malformed(format!(
                    "invalid character '{ch}' in piece placement"
                )));
            }
        }
        if file != 8 {
            return Err(malformed(format!(
                "rank {} has {} squares instead of 8",
                rank + 1,
                file
            )));
        }
    }

    // ----- Field 2: Side to move -----
    let side_to_move = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(malformed(format!("invalid side to move: '{other}'"))),
    };

    // ----- Field 3: Castling availability -----
    let castling_rights = CastlingRights::from_fen(fields[2])
        .ok_or_else(|| malformed(format!("invalid castling string: '{}'", fields[2])))?;

    // ----- Field 4: En passant target square -----
    let en_passant = match fields[3] {
        "-" => None,
        text => {
            let sq = Square::from_algebraic(text)
                .map_err(|_| malformed(format!("invalid en passant square: '{text}'")))?;
            if sq.rank() != 2 && sq.rank() != 5 {
                return Err(malformed(format!(
                    "en passant square {text} is not on rank 3 or 6"
                )));
            }
            Some(sq)
        }
    };

    // ----- Field 5: Halfmove clock -----
    let halfmove_clock = fields[4]
        .parse::<u16>()
        .map_err(|_| malformed(format!("invalid halfmove clock: '{}'", fields[4])))?;

    // ----- Field 6: Fullmove number -----
    let fullmove_number = fields[5]
        .parse::<u16>()
        .map_err(|_| malformed(format!("invalid fullmove number: '{}'", fields[5])))?;
    if fullmove_number == 0 {
        return Err(malformed("fullmove number must be >= 1".to_string()));
    }

    Ok(FenRecord {
        placement,
        side_to_move,
        castling_rights,
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}

/// Write the canonical FEN text for `pos`.
pub fn serialize(pos: &Position) -> String {
    let mut fen = String::with_capacity(80);

    // ----- Field 1: Piece placement -----
    for rank in (0..8u8).rev() {
        let mut empty_count = 0u8;
        for file in 0..8u8 {
            match pos.piece_at(Square::from_index(rank * 8 + file)) {
                Some(piece) => {
                    if empty_count > 0 {
                        fen.push((b'0' + empty_count) as char);
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                }
                None => empty_count += 1,
            }
        }
        if empty_count > 0 {
            fen.push((b'0' + empty_count) as char);
        }
        if rank > 0 {
            fen.push('/');
        }
    }

    // ----- Fields 2-6 -----
    let side = match pos.side_to_move {
        Color::White => 'w',
        Color::Black => 'b',
    };
    let en_passant = pos
        .en_passant
        .map_or_else(|| "-".to_string(), Square::to_algebraic);

    fen.push_str(&format!(
        " {side} {} {en_passant} {} {}",
        pos.castling_rights.to_fen(),
        pos.halfmove_clock,
        pos.fullmove_number
    ));
    fen
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::PieceType;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn round_trip(fen: &str) {
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.to_fen(), fen, "round trip failed for {fen}");
    }

    fn assert_malformed(fen: &str) {
        assert!(
            matches!(parse(fen), Err(ChessError::MalformedInput(_))),
            "expected MalformedInput for {fen:?}"
        );
    }

    // ===================================================================
    // Round trips
    // ===================================================================

    #[test]
    fn round_trip_starting() {
        round_trip(STARTING_FEN);
        assert_eq!(Position::starting().to_fen(), STARTING_FEN);
    }

    #[test]
    fn round_trip_kiwipete() {
        round_trip(KIWIPETE);
    }

    #[test]
    fn round_trip_with_en_passant_and_clocks() {
        round_trip("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3");
        round_trip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 17 42");
    }

    #[test]
    fn round_trip_empty_board() {
        round_trip("8/8/8/8/8/8/8/8 w - - 0 1");
    }

    #[test]
    fn partial_castling_rights_round_trip() {
        round_trip("r3k2r/8/8/8/8/8/8/R3K2R b Kq - 3 20");
    }

    // ===================================================================
    // Parsed record contents
    // ===================================================================

    #[test]
    fn parse_record_fields() {
        let record = parse("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(record.placement.len(), 3);
        assert_eq!(
            record.placement[0],
            (
                Square::from_algebraic("e8").unwrap(),
                Piece::new(PieceType::King, Color::Black)
            )
        );
        assert_eq!(record.side_to_move, Color::Black);
        assert_eq!(record.castling_rights, CastlingRights::NONE);
        assert_eq!(record.en_passant, Square::from_algebraic("e3").ok());
        assert_eq!(record.halfmove_clock, 0);
        assert_eq!(record.fullmove_number, 1);
    }

    // ===================================================================
    // Rejections
    // ===================================================================

    #[test]
    fn wrong_field_count() {
        assert_malformed("8/8/8/8/8/8/8/8 w - - 0");
        assert_malformed("");
        assert_malformed("8/8/8/8/8/8/8/8 w - - 0 1 extra");
    }

    #[test]
    fn bad_placement() {
        assert_malformed("8/8/8/8/8/8/8 w - - 0 1");
        assert_malformed("9/8/8/8/8/8/8/8 w - - 0 1");
        assert_malformed("7/8/8/8/8/8/8/8 w - - 0 1");
        assert_malformed("8/8/8/8/8/8/8/ppppppppp w - - 0 1");
        assert_malformed("8/8/8/8/8/8/8/7x w - - 0 1");
        assert_malformed("8/8/8/8/8/8/8/0P6 w - - 0 1");
    }

    #[test]
    fn bad_side_to_move() {
        assert_malformed("8/8/8/8/8/8/8/8 x - - 0 1");
        assert_malformed("8/8/8/8/8/8/8/8 W - - 0 1");
    }

    #[test]
    fn bad_castling() {
        assert_malformed("8/8/8/8/8/8/8/8 w KK - 0 1");
        assert_malformed("8/8/8/8/8/8/8/8 w X - 0 1");
    }

    #[test]
    fn bad_en_passant() {
        assert_malformed("8/8/8/8/8/8/8/8 w - e4 0 1");
        assert_malformed("8/8/8/8/8/8/8/8 w - i6 0 1");
        assert_malformed("8/8/8/8/8/8/8/8 w - e9 0 1");
    }

    #[test]
    fn bad_clocks() {
        assert_malformed("8/8/8/8/8/8/8/8 w - - -1 1");
        assert_malformed("8/8/8/8/8/8/8/8 w - - 0 0");
        assert_malformed("8/8/8/8/8/8/8/8 w - - x 1");
    }

    #[test]
    fn extra_whitespace_normalizes() {
        let pos = Position::from_fen("  8/8/8/8/8/8/8/8   w  -  -  0  1 ").unwrap();
        assert_eq!(pos.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    }
}
