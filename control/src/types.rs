//! Value types shared by every layer of the controller.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The other side.
    pub fn invert(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn is_white(self) -> bool {
        self == Side::White
    }

    /// The lowercase name used on the wire, e.g. in `init white`.
    pub fn wire_name(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    /// The FEN active colour letter.
    pub fn fen_char(self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }

    /// Whether a board-state piece letter belongs to this side. Empty squares belong to nobody.
    pub fn owns(self, piece: char) -> bool {
        match self {
            Side::White => piece.is_ascii_uppercase(),
            Side::Black => piece.is_ascii_lowercase(),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected `white` or `black`, got `{0}`")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Side::White),
            "black" | "b" => Ok(Side::Black),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// A square of the board, indexed `rank * 8 + file` with a1 = 0 and h8 = 63.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// The square with the given index, if it is on the board.
    pub fn new(index: u8) -> Option<Square> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Creates a square from a file (0 = a) and a rank (0 = first rank).
    pub fn from_coords(file: u8, rank: u8) -> Option<Square> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    /// Creates a square from on-screen coordinates, where row 0 is the eighth rank as seen from
    /// white's side of the board.
    pub fn from_row_col(row: u8, col: u8) -> Option<Square> {
        if row < 8 {
            Square::from_coords(col, 7 - row)
        } else {
            None
        }
    }

    /// The on-screen `(row, col)` of this square. Inverse of `from_row_col`.
    pub fn row_col(self) -> (u8, u8) {
        (7 - self.rank(), self.file())
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// All 64 squares, a1 first.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, (b'1' + self.rank()) as char)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("`{0}` is not a square, expected e.g. `e2`")]
pub struct ParseSquareError(pub String);

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSquareError(s.to_string());
        match s.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
                Square::from_coords(file - b'a', rank - b'1').ok_or_else(err)
            }
            _ => Err(err()),
        }
    }
}

/// The piece a pawn promotes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum PromotionPiece {
    #[default]
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    /// Parse a user's promotion choice: `Q`, `R`, `B` or `N`, case-insensitive.
    pub fn from_choice(choice: &str) -> Option<PromotionPiece> {
        match choice.trim().to_ascii_uppercase().as_str() {
            "Q" => Some(PromotionPiece::Queen),
            "R" => Some(PromotionPiece::Rook),
            "B" => Some(PromotionPiece::Bishop),
            "N" => Some(PromotionPiece::Knight),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            PromotionPiece::Queen => 'Q',
            PromotionPiece::Rook => 'R',
            PromotionPiece::Bishop => 'B',
            PromotionPiece::Knight => 'N',
        }
    }
}

/// A candidate or committed move.
///
/// Descriptors handed to `Transport::commit` always originate from the transport's own legal-move
/// query (or its search), never from raw user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveDesc {
    pub from: Square,
    pub to: Square,
    pub side: Side,
    /// The move is a pawn reaching the last rank and needs a promotion piece.
    pub is_promotion: bool,
    /// The chosen promotion piece. `None` on a promotion means the default, a queen.
    pub promotion: Option<PromotionPiece>,
    /// The move resets the half-move clock (pawn move or capture), as far as the transport knows.
    pub is_zeroing: bool,
}

impl MoveDesc {
    pub fn new(from: Square, to: Square, side: Side) -> Self {
        Self {
            from,
            to,
            side,
            is_promotion: false,
            promotion: None,
            is_zeroing: false,
        }
    }

    /// Whether this move goes from `from` to `to`.
    pub fn connects(&self, from: Square, to: Square) -> bool {
        self.from == from && self.to == to
    }

    /// Coordinate notation, e.g. `e2e4` or `e7e8=Q`.
    pub fn coordinate(&self) -> String {
        let mut out = format!("{}{}", self.from, self.to);
        if self.is_promotion {
            out.push('=');
            out.push(self.promotion.unwrap_or_default().letter());
        }
        out
    }
}

impl fmt::Display for MoveDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.to)
    }
}

/// Game-end status as reported by the engine collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TerminalStatus {
    #[default]
    None,
    /// The side to move is in check.
    Check,
    Checkmate {
        winner: Side,
    },
    Stalemate,
}

impl TerminalStatus {
    /// Checkmate and stalemate end the game; check does not.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TerminalStatus::Checkmate { .. } | TerminalStatus::Stalemate
        )
    }

    pub fn winner(self) -> Option<Side> {
        match self {
            TerminalStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }
}

const PIECE_CHARS: &str = "PNBRQKpnbrqk";

/// The board as rows of piece letters, row 0 being the eighth rank. Uppercase letters are white
/// pieces, lowercase black, `.` an empty square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardState {
    rows: [[char; 8]; 8],
}

impl BoardState {
    /// Parse the wire form: 8 rows of 8 characters joined by `/`. Returns `None` for anything
    /// that is not structurally a board.
    pub fn parse(s: &str) -> Option<BoardState> {
        let mut rows = [['.'; 8]; 8];
        let mut count = 0;

        for (row, text) in s.trim().split('/').enumerate() {
            if row >= 8 {
                return None;
            }
            let chars: Vec<char> = text.chars().collect();
            if chars.len() != 8 {
                return None;
            }
            for (col, ch) in chars.into_iter().enumerate() {
                if ch != '.' && !PIECE_CHARS.contains(ch) {
                    return None;
                }
                rows[row][col] = ch;
            }
            count += 1;
        }

        if count == 8 {
            Some(BoardState { rows })
        } else {
            None
        }
    }

    /// Build a board from a per-square accessor returning piece letters or `.`.
    pub fn from_fn(mut square_char: impl FnMut(Square) -> char) -> BoardState {
        let mut rows = [['.'; 8]; 8];
        for sq in Square::all() {
            let (row, col) = sq.row_col();
            rows[row as usize][col as usize] = square_char(sq);
        }
        BoardState { rows }
    }

    pub fn piece_at(&self, sq: Square) -> char {
        let (row, col) = sq.row_col();
        self.rows[row as usize][col as usize]
    }

    /// The piece placement field of a FEN string.
    pub fn fen_placement(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            let mut empty = 0;
            for &ch in row {
                if ch == '.' {
                    empty += 1;
                } else {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(ch);
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if i < 7 {
                out.push('/');
            }
        }
        out
    }
}

impl BoardState {
    /// An ascii diagram with rank and file labels, eighth rank on top.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate() {
            out.push_str(&format!("{} ", 8 - i));
            for ch in row {
                out.push(' ');
                out.push(*ch);
            }
            out.push('\n');
        }
        out.push_str("   a b c d e f g h\n");
        out
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            for ch in row {
                write!(f, "{}", ch)?;
            }
            if i < 7 {
                write!(f, "/")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str =
        "rnbqkbnr/pppppppp/......../......../......../......../PPPPPPPP/RNBQKBNR";

    #[test]
    fn square_names() {
        assert_eq!("a1".parse::<Square>().unwrap().index(), 0);
        assert_eq!("e2".parse::<Square>().unwrap().index(), 12);
        assert_eq!("e4".parse::<Square>().unwrap().index(), 28);
        assert_eq!("h8".parse::<Square>().unwrap().index(), 63);
        assert_eq!(Square::new(12).unwrap().to_string(), "e2");

        assert!("i1".parse::<Square>().is_err());
        assert!("e9".parse::<Square>().is_err());
        assert!("E2".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!(Square::new(64).is_none());
    }

    #[test]
    fn row_col_mapping_is_a_bijection() {
        let mut seen = [false; 64];
        for row in 0..8 {
            for col in 0..8 {
                let sq = Square::from_row_col(row, col).unwrap();
                assert!(!seen[sq.index() as usize]);
                seen[sq.index() as usize] = true;
                assert_eq!(sq.row_col(), (row, col));
            }
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(Square::from_row_col(7, 4).unwrap().to_string(), "e1");
        assert_eq!(Square::from_row_col(0, 0).unwrap().to_string(), "a8");
        assert!(Square::from_row_col(8, 0).is_none());
    }

    #[test]
    fn sides() {
        assert_eq!(Side::White.invert(), Side::Black);
        assert_eq!(Side::Black.invert().invert(), Side::Black);
        assert_eq!("W".parse::<Side>(), Ok(Side::White));
        assert_eq!("black".parse::<Side>(), Ok(Side::Black));
        assert!("red".parse::<Side>().is_err());
        assert!(Side::White.owns('K'));
        assert!(!Side::White.owns('k'));
        assert!(!Side::Black.owns('.'));
    }

    #[test]
    fn promotion_choices() {
        assert_eq!(PromotionPiece::from_choice("n"), Some(PromotionPiece::Knight));
        assert_eq!(PromotionPiece::from_choice(" R "), Some(PromotionPiece::Rook));
        assert_eq!(PromotionPiece::from_choice("x"), None);
        assert_eq!(PromotionPiece::from_choice(""), None);
    }

    #[test]
    fn coordinate_notation() {
        let e7 = "e7".parse().unwrap();
        let e8 = "e8".parse().unwrap();
        let mut mov = MoveDesc::new(e7, e8, Side::White);
        assert_eq!(mov.coordinate(), "e7e8");
        mov.is_promotion = true;
        assert_eq!(mov.coordinate(), "e7e8=Q");
        mov.promotion = Some(PromotionPiece::Knight);
        assert_eq!(mov.coordinate(), "e7e8=N");
        assert_eq!(mov.to_string(), "e7 e8");
    }

    #[test]
    fn board_state_round_trip_and_fen() {
        let board = BoardState::parse(START).unwrap();
        assert_eq!(board.to_string(), START);
        assert_eq!(board.piece_at(Square::new(4).unwrap()), 'K');
        assert_eq!(board.piece_at(Square::new(59).unwrap()), 'q');
        assert_eq!(board.fen_placement(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");

        let pretty = board.pretty();
        assert_eq!(pretty.lines().next(), Some("8  r n b q k b n r"));
        assert_eq!(pretty.lines().nth(7), Some("1  R N B Q K B N R"));
        assert_eq!(pretty.lines().count(), 9);
    }

    #[test]
    fn malformed_board_states_are_rejected() {
        assert!(BoardState::parse("initSuccess").is_none());
        assert!(BoardState::parse("rnbqkbnr/pppppppp").is_none());
        assert!(BoardState::parse(&START.replace('K', "X")).is_none());
        assert!(BoardState::parse(&format!("{}/........", START)).is_none());
        assert!(BoardState::parse(&START.replacen("........", ".......", 1)).is_none());
    }

    #[test]
    fn terminal_status() {
        assert!(!TerminalStatus::Check.is_terminal());
        assert!(TerminalStatus::Stalemate.is_terminal());
        let mate = TerminalStatus::Checkmate {
            winner: Side::Black,
        };
        assert!(mate.is_terminal());
        assert_eq!(mate.winner(), Some(Side::Black));
    }
}
