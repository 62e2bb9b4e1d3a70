//! The Engine Transport: one interface to the engine collaborator, two ways of reaching it.

mod child;
mod local;

pub use child::Child;
pub use local::Local;

use crate::error::Result;
use crate::types::{BoardState, MoveDesc, Side, Square, TerminalStatus};

use engine::Limits;

/// Everything the controller asks of the engine collaborator.
///
/// The position itself lives behind the transport and is only ever changed by `commit` (and, for
/// a child process, by the engine applying its own move during `search_best_move`). Nothing above
/// this trait branches on which implementation is in use.
pub trait Transport {
    /// Start a new game from the initial position, telling the engine which side the human plays.
    fn initialize(&mut self, human: Side) -> Result<()>;

    /// The legal moves of `side` that start on `origin`, one descriptor per destination. Empty when
    /// the square has no legal moves or it is not `side`'s turn.
    fn legal_moves(&mut self, side: Side, origin: Square) -> Result<Vec<MoveDesc>>;

    /// Apply a move previously returned by `legal_moves` or `search_best_move`, returning its
    /// notation text.
    fn commit(&mut self, mov: &MoveDesc) -> Result<String>;

    /// Ask the engine for its move as `side`. Returns the move and the search debug text (empty
    /// unless requested and available). The caller still commits the move.
    fn search_best_move(&mut self, side: Side, limits: &Limits) -> Result<(MoveDesc, String)>;

    /// Game-end status of the current position, where `side` is the side to move.
    fn terminal_status(&mut self, side: Side) -> Result<TerminalStatus>;

    /// The current board, for display and FEN output.
    fn board(&mut self) -> Result<BoardState>;

    fn invert(&self, side: Side) -> Side {
        side.invert()
    }

    /// Release the engine. Further calls may fail.
    fn shutdown(&mut self) {}
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn initialize(&mut self, human: Side) -> Result<()> {
        (**self).initialize(human)
    }

    fn legal_moves(&mut self, side: Side, origin: Square) -> Result<Vec<MoveDesc>> {
        (**self).legal_moves(side, origin)
    }

    fn commit(&mut self, mov: &MoveDesc) -> Result<String> {
        (**self).commit(mov)
    }

    fn search_best_move(&mut self, side: Side, limits: &Limits) -> Result<(MoveDesc, String)> {
        (**self).search_best_move(side, limits)
    }

    fn terminal_status(&mut self, side: Side) -> Result<TerminalStatus> {
        (**self).terminal_status(side)
    }

    fn board(&mut self) -> Result<BoardState> {
        (**self).board()
    }

    fn invert(&self, side: Side) -> Side {
        (**self).invert(side)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}
