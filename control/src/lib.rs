//! Game session control: everything between a front end and the engine collaborator.
//!
//! A front end feeds raw input (square clicks or typed moves) into an `orchestrator::Controller`.
//! The controller runs the selection state machine, commits validated moves through a
//! `transport::Transport`, keeps the authoritative `session::GameSession` record and plays the
//! engine's turns. The transport is either a direct in-process call (`transport::Local`) or a
//! line-protocol session with a child process (`transport::Child`); nothing above the transport
//! knows which one is in use.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod protocol;
pub mod selection;
pub mod server;
pub mod session;
pub mod transport;
pub mod types;

pub use config::{Config, Player, Players};
pub use error::{Error, Result};
pub use orchestrator::{Controller, Phase, Update};
pub use session::GameSession;
pub use types::{BoardState, MoveDesc, PromotionPiece, Side, Square, TerminalStatus};
