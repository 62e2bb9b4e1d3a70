//! The controller's authoritative record of the game.

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{BoardState, MoveDesc, Side, TerminalStatus};

use log::{debug, info};

/// Side to move, move counters, movetext and terminal status of the game in progress.
///
/// Mutated once per committed move. Once the status is checkmate or stalemate the record is frozen:
/// `record_move` fails and `check_terminal` keeps answering the same status.
#[derive(Clone, Debug)]
pub struct GameSession {
    side_to_move: Side,
    fullmove: u32,
    halfmove_clock: u32,
    notation: String,
    status: TerminalStatus,
    history: Vec<MoveDesc>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            side_to_move: Side::White,
            fullmove: 1,
            halfmove_clock: 0,
            notation: String::new(),
            status: TerminalStatus::None,
            history: Vec::new(),
        }
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// The full-move number, starting at 1 and incremented after each of Black's moves.
    pub fn fullmove(&self) -> u32 {
        self.fullmove
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Number of moves committed so far.
    pub fn plies(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[MoveDesc] {
        &self.history
    }

    /// Movetext accumulated so far, e.g. `1.e4 e5 2.Nf3 `.
    pub fn notation(&self) -> &str {
        &self.notation
    }

    /// The status found by the last `check_terminal`.
    pub fn status(&self) -> TerminalStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a committed move and its notation text.
    pub fn record_move(&mut self, mov: &MoveDesc, text: &str) -> Result<()> {
        if self.is_over() {
            return Err(Error::GameOver);
        }
        if mov.side != self.side_to_move {
            return Err(Error::InvalidInput(format!(
                "{} moved but {} is to move",
                mov.side, self.side_to_move
            )));
        }

        if mov.side == Side::White {
            self.notation.push_str(&format!("{}.", self.fullmove));
        }
        self.notation.push_str(text);
        self.notation.push(' ');

        if mov.is_zeroing {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if mov.side == Side::Black {
            self.fullmove += 1;
        }

        self.side_to_move = self.side_to_move.invert();
        self.status = TerminalStatus::None;
        self.history.push(mov.clone());
        debug!("recorded {} {}, {} to move", mov.side, text, self.side_to_move);
        Ok(())
    }

    /// Ask the transport whether the game has ended. Freezes the record on checkmate or stalemate;
    /// once frozen the transport is not asked again.
    pub fn check_terminal<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
    ) -> Result<TerminalStatus> {
        if self.is_over() {
            return Ok(self.status);
        }

        self.status = transport.terminal_status(self.side_to_move)?;
        if self.status.is_terminal() {
            info!("game over: {:?}", self.status);
        }
        Ok(self.status)
    }

    /// The FEN of the current position. Castling and en passant fields are not tracked and are
    /// always `-`.
    pub fn fen(&self, board: &BoardState) -> String {
        format!(
            "{} {} - - {} {}",
            board.fen_placement(),
            self.side_to_move.fen_char(),
            self.halfmove_clock,
            self.fullmove
        )
    }

    /// PGN movetext, followed by the result once the game is over.
    pub fn pgn(&self) -> String {
        let moves = self.notation.trim_end();
        let result = match self.status {
            TerminalStatus::Checkmate {
                winner: Side::White,
            } => "1-0",
            TerminalStatus::Checkmate {
                winner: Side::Black,
            } => "0-1",
            TerminalStatus::Stalemate => "1/2-1/2",
            _ => return moves.to_string(),
        };
        if moves.is_empty() {
            result.to_string()
        } else {
            format!("{} {}", moves, result)
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
