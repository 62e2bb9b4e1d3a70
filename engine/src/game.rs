//! The position handle the rest of the program holds on to.

use crate::init::init_globals;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, Color, File, Move, MoveList, Position, Square};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid FEN: {0}")]
    Fen(String),
}

/// Game-end status of a position, for the side to move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

/// A game in progress: the current position, mutated in place as moves are played.
#[derive(Clone, Debug)]
pub struct Game {
    pos: Chess,
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        init_globals();
        Self {
            pos: Chess::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        init_globals();
        let setup: Fen = fen.parse().map_err(|err| GameError::Fen(format!("{}", err)))?;
        let pos = setup
            .into_position::<Chess>(CastlingMode::Standard)
            .map_err(|err| GameError::Fen(format!("{}", err)))?;
        Ok(Self { pos })
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    pub fn turn(&self) -> Color {
        self.pos.turn()
    }

    /// All legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        self.pos.legal_moves()
    }

    /// Play a legal move and return its SAN, including any check or mate suffix.
    ///
    /// The move must come from `legal_moves()` for the current position.
    pub fn play(&mut self, mov: &Move) -> String {
        SanPlus::from_move_and_play_unchecked(&mut self.pos, mov).to_string()
    }

    pub fn status(&self) -> Status {
        if self.pos.is_checkmate() {
            Status::Checkmate
        } else if self.pos.is_stalemate() {
            Status::Stalemate
        } else if self.pos.is_check() {
            Status::Check
        } else {
            Status::Ongoing
        }
    }

    /// The piece letter on the square with the given index (a1 = 0), uppercase for white, or `.`
    /// for an empty square.
    pub fn square_char(&self, index: u8) -> char {
        match square_at(index).and_then(|sq| self.pos.board().piece_at(sq)) {
            Some(piece) => piece.char(),
            None => '.',
        }
    }

    /// The board as eight rows of eight characters separated by `/`, eighth rank first.
    pub fn board_string(&self) -> String {
        let mut out = String::with_capacity(71);
        for rank in (0..8u8).rev() {
            for file in 0..8u8 {
                out.push(self.square_char(rank * 8 + file));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// The square with the given index, if the index is on the board.
pub fn square_at(index: u8) -> Option<Square> {
    if index < 64 {
        Some(Square::new(u32::from(index)))
    } else {
        None
    }
}

/// The origin and destination of a move as a player sees it. Castling is reported as the king's
/// two-square step rather than the king-takes-rook encoding used internally.
pub fn endpoints(mov: &Move) -> Option<(Square, Square)> {
    match *mov {
        Move::Castle { king, rook } => {
            let file = if (rook as u8) > (king as u8) {
                File::G
            } else {
                File::C
            };
            Some((king, Square::from_coords(file, king.rank())))
        }
        _ => mov.from().map(|from| (from, mov.to())),
    }
}
