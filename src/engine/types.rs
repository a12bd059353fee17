use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Rank (0-based) a pawn of this colour starts on.
    #[inline]
    pub const fn pawn_start_rank(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Rank (0-based) a pawn of this colour promotes on.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Rank (0-based) the king and rooks of this colour start on.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// All piece types in order.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Pieces a pawn may promote to, in generation order.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Number of piece types.
    pub const COUNT: usize = 6;

    /// Index for array lookups: Pawn=0 .. King=5.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Material value in centipawns.
    pub fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 0,
        }
    }

    /// Lowercase letter used in FEN and coordinate notation.
    pub fn to_char(self) -> char {
        match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        }
    }

    /// Parse a piece letter, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Bishops, rooks and queens move along rays.
    #[inline]
    pub fn is_slider(self) -> bool {
        matches!(self, PieceType::Bishop | PieceType::Rook | PieceType::Queen)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A coloured piece. An empty square is `Option::<Piece>::None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece { kind, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn to_char(self) -> char {
        let c = self.kind.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a FEN letter; the case selects the colour.
    pub fn from_char(c: char) -> Option<Self> {
        let kind = PieceType::from_char(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece { kind, color })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the chess board (0..63, LERF: a1=0, h8=63).
///
/// The index is private so every `Square` in circulation is in range; public
/// constructors validate and return [`ChessError::InvalidSquare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    pub const A1: Square = Square(0);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);

    /// Square from a flat index.
    pub fn new(index: u8) -> Result<Self, ChessError> {
        if (index as usize) < Self::NUM {
            Ok(Square(index))
        } else {
            Err(ChessError::InvalidSquare(format!(
                "index {index} is outside 0..63"
            )))
        }
    }

    /// Square from zero-based file (a=0) and rank (1=0).
    pub fn from_file_rank(file: u8, rank: u8) -> Result<Self, ChessError> {
        if file < 8 && rank < 8 {
            Ok(Square(rank * 8 + file))
        } else {
            Err(ChessError::InvalidSquare(format!(
                "file {file} / rank {rank} is outside 0..7"
            )))
        }
    }

    /// Crate-internal constructor for indices already known to be in range.
    #[inline]
    pub(crate) const fn from_index(index: u8) -> Self {
        debug_assert!(index < 64, "square index out of range");
        Square(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// The square `df` files and `dr` ranks away, or `None` off the board.
    #[inline]
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square((rank * 8 + file) as u8))
        } else {
            None
        }
    }

    /// All 64 squares, a1 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Result<Self, ChessError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(format!("'{s}'")));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::from_file_rank(file, rank)
            .map_err(|_| ChessError::InvalidSquare(format!("'{s}'")))
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        format!("{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Bitboard
// ---------------------------------------------------------------------------

/// A 64-bit bitboard, one bit per square.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const ALL: Bitboard = Bitboard(!0u64);

    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_B: Bitboard = Bitboard(0x0202_0202_0202_0202);
    pub const FILE_G: Bitboard = Bitboard(0x4040_4040_4040_4040);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    pub const NOT_FILE_A: Bitboard = Bitboard(!Self::FILE_A.0);
    pub const NOT_FILE_H: Bitboard = Bitboard(!Self::FILE_H.0);
    pub const NOT_FILE_AB: Bitboard = Bitboard(!(Self::FILE_A.0 | Self::FILE_B.0));
    pub const NOT_FILE_GH: Bitboard = Bitboard(!(Self::FILE_G.0 | Self::FILE_H.0));

    /// Bitboard from a raw bit pattern.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Bitboard(raw)
    }

    #[inline]
    pub fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.0)
    }

    #[inline]
    pub fn is_set(self, sq: Square) -> bool {
        self.0 & (1u64 << sq.0) != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.0;
    }

    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.0);
    }

    #[inline]
    pub fn pop_count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Least significant bit index (first set square).
    #[inline]
    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square(self.0.trailing_zeros() as u8))
        }
    }

    /// Pop the least significant bit, returning the square.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Iterate over all set bit positions as `Square`s.
    #[inline]
    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

/// Iterator over set bits in a `Bitboard`.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.pop_count() as usize;
        (count, Some(count))
    }
}

impl ExactSizeIterator for BitboardIter {}

impl std::ops::BitAnd for Bitboard {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitXor for Bitboard {
    type Output = Self;
    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Bitboard(self.0 ^ rhs.0)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl std::ops::BitAndAssign for Bitboard {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl std::ops::BitOrAssign for Bitboard {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard(0x{:016x})", self.0)?;
        for rank in (0..8u8).rev() {
            write!(f, "  {} ", rank + 1)?;
            for file in 0..8u8 {
                let sq = Square(rank * 8 + file);
                write!(f, "{}", if self.is_set(sq) { '1' } else { '.' })?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "    a b c d e f g h")
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Which side of the board a castling move goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wing {
    Kingside,
    Queenside,
}

/// Four independent castling flags (K, Q, k, q).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    #[inline]
    pub fn has(self, color: Color, wing: Wing) -> bool {
        match (color, wing) {
            (Color::White, Wing::Kingside) => self.white_kingside,
            (Color::White, Wing::Queenside) => self.white_queenside,
            (Color::Black, Wing::Kingside) => self.black_kingside,
            (Color::Black, Wing::Queenside) => self.black_queenside,
        }
    }

    #[inline]
    pub fn remove(&mut self, color: Color, wing: Wing) {
        match (color, wing) {
            (Color::White, Wing::Kingside) => self.white_kingside = false,
            (Color::White, Wing::Queenside) => self.white_queenside = false,
            (Color::Black, Wing::Kingside) => self.black_kingside = false,
            (Color::Black, Wing::Queenside) => self.black_queenside = false,
        }
    }

    /// Drop both rights of one side.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove(color, Wing::Kingside);
        self.remove(color, Wing::Queenside);
    }

    pub fn is_empty(self) -> bool {
        self == CastlingRights::NONE
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        if s.is_empty() {
            return None;
        }
        let mut rights = CastlingRights::NONE;
        for c in s.chars() {
            let flag = match c {
                'K' => &mut rights.white_kingside,
                'Q' => &mut rights.white_queenside,
                'k' => &mut rights.black_kingside,
                'q' => &mut rights.black_queenside,
                _ => return None,
            };
            if *flag {
                return None;
            }
            *flag = true;
        }
        Some(rights)
    }

    /// Convert to FEN castling string.
    pub fn to_fen(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        if self.white_kingside {
            s.push('K');
        }
        if self.white_queenside {
            s.push('Q');
        }
        if self.black_kingside {
            s.push('k');
        }
        if self.black_queenside {
            s.push('q');
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Status of the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine.
///
/// All of these are raised before any state is mutated. Broken internal
/// invariants are not represented here; they panic.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    #[error("illegal move {uci}: {reason}")]
    IllegalMoveRequested { uci: String, reason: String },

    #[error("move {0} has already been applied")]
    MoveAlreadyApplied(String),

    #[error("move {0} was never applied")]
    MoveNotApplied(String),

    #[error("no moves to undo")]
    NothingToUndo,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_ranks() {
        assert_eq!(Color::White.pawn_start_rank(), 1);
        assert_eq!(Color::Black.pawn_start_rank(), 6);
        assert_eq!(Color::White.promotion_rank(), 7);
        assert_eq!(Color::Black.promotion_rank(), 0);
    }

    #[test]
    fn piece_char_round_trip() {
        for kind in PieceType::ALL {
            for color in Color::BOTH {
                let piece = Piece::new(kind, color);
                let c = piece.to_char();
                assert_eq!(c.is_ascii_uppercase(), color == Color::White);
                assert_eq!(Piece::from_char(c), Some(piece));
            }
        }
    }

    #[test]
    fn piece_from_char_invalid() {
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::from_char('1'), None);
        assert_eq!(PieceType::from_char('/'), None);
    }

    #[test]
    fn piece_type_index_matches_all() {
        assert_eq!(PieceType::ALL.len(), PieceType::COUNT);
        for (i, &pt) in PieceType::ALL.iter().enumerate() {
            assert_eq!(pt.index(), i);
        }
    }

    #[test]
    fn square_new_rejects_out_of_range() {
        assert!(Square::new(0).is_ok());
        assert!(Square::new(63).is_ok());
        assert!(matches!(Square::new(64), Err(ChessError::InvalidSquare(_))));
        assert!(Square::from_file_rank(8, 0).is_err());
        assert!(Square::from_file_rank(0, 8).is_err());
    }

    #[test]
    fn square_index_file_rank_mapping() {
        for idx in 0..64u8 {
            let s = Square::new(idx).unwrap();
            assert_eq!(s.file(), idx % 8);
            assert_eq!(s.rank(), idx / 8);
            assert_eq!(Square::from_file_rank(s.file(), s.rank()).unwrap(), s);
        }
    }

    #[test]
    fn square_algebraic() {
        assert_eq!(sq("a1").index(), 0);
        assert_eq!(sq("h1").index(), 7);
        assert_eq!(sq("a8").index(), 56);
        assert_eq!(sq("h8").index(), 63);
        assert_eq!(sq("e4").index(), 28);
        assert_eq!(sq("e4").to_string(), "e4");
        for s in Square::all() {
            assert_eq!(s.to_algebraic().parse::<Square>().unwrap(), s);
        }
    }

    #[test]
    fn square_from_algebraic_invalid() {
        for bad in ["", "a", "a9", "i1", "abc", "A1"] {
            assert!(Square::from_algebraic(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn square_offset_stays_on_board() {
        assert_eq!(sq("e4").offset(1, 2), Some(sq("f6")));
        assert_eq!(sq("a1").offset(-1, 0), None);
        assert_eq!(sq("h8").offset(0, 1), None);
        assert_eq!(sq("h4").offset(1, 0), None);
    }

    #[test]
    fn bitboard_basic_ops() {
        let mut bb = Bitboard::EMPTY;
        assert!(bb.is_empty());

        let e4 = sq("e4");
        bb.set(e4);
        assert!(bb.is_set(e4));
        assert_eq!(bb.pop_count(), 1);

        bb.clear(e4);
        assert!(bb.is_empty());
        assert_eq!(bb, Bitboard::new(0));
    }

    #[test]
    fn bitboard_bitwise_ops() {
        let a = Bitboard(0xFF);
        let b = Bitboard(0x0F);
        assert_eq!((a & b).0, 0x0F);
        assert_eq!((a | b).0, 0xFF);
        assert_eq!((a ^ b).0, 0xF0);
        assert_eq!(!Bitboard::EMPTY, Bitboard::ALL);
    }

    #[test]
    fn bitboard_iter() {
        let bb = Bitboard::from_square(sq("a1"))
            | Bitboard::from_square(sq("c2"))
            | Bitboard::from_square(sq("h8"));
        let squares: Vec<Square> = bb.iter().collect();
        assert_eq!(squares, vec![sq("a1"), sq("c2"), sq("h8")]);
        assert_eq!(bb.iter().len(), 3);
        assert_eq!(Bitboard::EMPTY.iter().count(), 0);
    }

    #[test]
    fn file_masks() {
        assert!(Bitboard::FILE_A.is_set(sq("a5")));
        assert!(!Bitboard::NOT_FILE_A.is_set(sq("a5")));
        assert!(!Bitboard::NOT_FILE_AB.is_set(sq("b2")));
        assert!(!Bitboard::NOT_FILE_GH.is_set(sq("g7")));
        assert!(Bitboard::NOT_FILE_GH.is_set(sq("f7")));
    }

    #[test]
    fn castling_rights_fen_round_trip() {
        for s in ["-", "K", "Kq", "KQkq", "kq", "Q"] {
            let cr = CastlingRights::from_fen(s).unwrap();
            assert_eq!(cr.to_fen(), s);
        }
    }

    #[test]
    fn castling_rights_from_fen_invalid() {
        assert_eq!(CastlingRights::from_fen("X"), None);
        assert_eq!(CastlingRights::from_fen("KZ"), None);
        assert_eq!(CastlingRights::from_fen("KK"), None);
        assert_eq!(CastlingRights::from_fen(""), None);
    }

    #[test]
    fn castling_rights_flags() {
        let mut cr = CastlingRights::ALL;
        cr.remove(Color::White, Wing::Kingside);
        assert!(!cr.has(Color::White, Wing::Kingside));
        assert!(cr.has(Color::White, Wing::Queenside));

        cr.remove_color(Color::Black);
        assert!(!cr.has(Color::Black, Wing::Kingside));
        assert!(!cr.has(Color::Black, Wing::Queenside));
        assert_eq!(cr.to_fen(), "Q");
    }

    #[test]
    fn game_status_strings() {
        assert_eq!(GameStatus::Active.as_str(), "active");
        assert_eq!(GameStatus::Checkmate.to_string(), "checkmate");
        assert!(GameStatus::Checkmate.is_game_over());
        assert!(GameStatus::Stalemate.is_game_over());
        assert!(!GameStatus::Check.is_game_over());
    }
}
