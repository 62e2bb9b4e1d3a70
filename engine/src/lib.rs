//! The in-process rules and search collaborator.
//!
//! Legal move generation and game-end detection are delegated to `shakmaty`. This crate adds the
//! pieces a playing partner needs on top of the rules: global lookup tables, a static evaluation,
//! a depth and time limited search, and the board accessors a front end renders from.

pub mod eval;
pub mod game;
pub mod init;
pub mod search;
pub mod trace;

pub use game::{Game, GameError, Status};
pub use search::params::Limits;
pub use search::search::{find_best_move, Search};

pub use shakmaty;
