//! The Turn Orchestrator: input gating, move commits and engine turns.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::selection::{self, Outcome, Selection};
use crate::session::GameSession;
use crate::transport::Transport;
use crate::types::{BoardState, MoveDesc, PromotionPiece, Side, Square, TerminalStatus};

use log::{debug, error, info, warn};

/// What the controller is doing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// A human is to move; input is accepted.
    AwaitingInput,
    /// The engine is to move. Input is dropped, not queued.
    EngineThinking,
    /// The engine never confirmed a human move. Input is dropped until `resume` sends it again.
    Unconfirmed,
    /// The game ended. Input is dropped for good.
    Over,
    /// A fatal transport failure ended the session.
    Broken,
}

/// A state change for the front end to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Update {
    Selected {
        origin: Square,
        destinations: Vec<Square>,
    },
    Deselected,
    /// The input matched no legal move. Nothing is selected.
    Rejected {
        origin: Option<Square>,
        target: Square,
    },
    Moved {
        side: Side,
        mov: MoveDesc,
        notation: String,
        /// Search debug text, for engine moves made with debugging on.
        debug: String,
    },
    /// The side to move is in check.
    Check(Side),
    GameOver(TerminalStatus),
    /// Input arrived while it was not a human's turn.
    Ignored,
}

/// Drives one game: the selection state machine, the session record and engine turns, all over a
/// single transport.
///
/// When a call fails, moves committed before the failure stay recorded in `session()`. A transient
/// failure during an engine turn leaves the turn pending in `Phase::EngineThinking`, and one while
/// committing a human move leaves that move pending in `Phase::Unconfirmed`. `resume` retries
/// either.
pub struct Controller<T: Transport> {
    transport: T,
    config: Config,
    session: GameSession,
    selection: Selection,
    phase: Phase,
    unconfirmed: Option<MoveDesc>,
}

impl<T: Transport> Controller<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            session: GameSession::new(),
            selection: Selection::Empty,
            phase: Phase::AwaitingInput,
            unconfirmed: None,
        }
    }

    /// Begin a new game. If the engine has the first move and a human is playing, the engine's
    /// move is made before returning.
    pub fn start(&mut self) -> Result<Vec<Update>> {
        let human = self.config.players.human_side();
        let started = self.transport.initialize(human);
        self.guard(started)?;

        info!(
            "new game: white {:?}, black {:?}",
            self.config.players.white, self.config.players.black
        );
        self.session = GameSession::new();
        self.selection.clear();
        self.phase = Phase::AwaitingInput;
        self.unconfirmed = None;

        let mut updates = Vec::new();
        let settled = self.settle(&mut updates);
        self.guard(settled)?;
        Ok(updates)
    }

    /// A click on `square` by the human to move.
    pub fn click(&mut self, square: Square) -> Result<Vec<Update>> {
        if self.phase != Phase::AwaitingInput {
            debug!("click on {} ignored in {:?}", square, self.phase);
            return Ok(vec![Update::Ignored]);
        }

        let side = self.session.side_to_move();
        let outcome = self.selection.click(&mut self.transport, side, square);
        let mut updates = Vec::new();
        match self.guard(outcome)? {
            Outcome::Selected {
                origin,
                destinations,
            } => updates.push(Update::Selected {
                origin,
                destinations,
            }),
            Outcome::Deselected => updates.push(Update::Deselected),
            Outcome::Rejected { origin, target } => {
                updates.push(Update::Rejected { origin, target })
            }
            Outcome::Resolved(mut mov) => {
                if mov.is_promotion && mov.promotion.is_none() {
                    mov.promotion = Some(PromotionPiece::Queen);
                }
                self.human_move(mov, &mut updates)?;
            }
        }
        Ok(updates)
    }

    /// A typed move by the human to move. `choose_promotion` is consulted only when the move is a
    /// promotion; `None` means a queen.
    pub fn play_typed<F>(
        &mut self,
        from: Square,
        to: Square,
        choose_promotion: F,
    ) -> Result<Vec<Update>>
    where
        F: FnOnce() -> Option<PromotionPiece>,
    {
        if self.phase != Phase::AwaitingInput {
            debug!("typed move {} {} ignored in {:?}", from, to, self.phase);
            return Ok(vec![Update::Ignored]);
        }

        let side = self.session.side_to_move();
        let resolved = selection::resolve(&mut self.transport, side, from, to);
        let mut mov = match resolved {
            Ok(mov) => mov,
            Err(Error::IllegalMove { .. }) => {
                return Ok(vec![Update::Rejected {
                    origin: Some(from),
                    target: to,
                }])
            }
            Err(err) => return Err(self.fail(err)),
        };
        if mov.is_promotion {
            mov.promotion = Some(choose_promotion().unwrap_or_default());
        }

        self.selection.clear();
        let mut updates = Vec::new();
        self.human_move(mov, &mut updates)?;
        Ok(updates)
    }

    /// Retry the engine turn or the human move left pending by a transient failure.
    pub fn resume(&mut self) -> Result<Vec<Update>> {
        match self.phase {
            Phase::EngineThinking => self.engine_step(),
            Phase::Unconfirmed => {
                self.phase = Phase::AwaitingInput;
                let mut updates = Vec::new();
                if let Some(mov) = self.unconfirmed.take() {
                    debug!("sending {} again", mov.coordinate());
                    self.human_move(mov, &mut updates)?;
                }
                Ok(updates)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Play exactly one engine move, then let the game settle. Front ends pace engine-only games
    /// with this.
    pub fn engine_step(&mut self) -> Result<Vec<Update>> {
        match self.phase {
            Phase::Over => return Err(Error::GameOver),
            Phase::Broken => return Err(Error::Unusable),
            _ => {}
        }
        if !self.config.players.is_engine(self.session.side_to_move()) {
            return Ok(vec![Update::Ignored]);
        }

        let mut updates = Vec::new();
        self.phase = Phase::EngineThinking;
        let played = self.engine_move(&mut updates);
        self.guard(played)?;
        let settled = self.settle(&mut updates);
        self.guard(settled)?;
        Ok(updates)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn side_to_move(&self) -> Side {
        self.session.side_to_move()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn board(&mut self) -> Result<BoardState> {
        let board = self.transport.board();
        self.guard(board)
    }

    pub fn fen(&mut self) -> Result<String> {
        let board = self.board()?;
        Ok(self.session.fen(&board))
    }

    /// Shut the transport down, consuming the controller.
    pub fn finish(mut self) {
        self.transport.shutdown();
    }

    fn human_move(&mut self, mov: MoveDesc, updates: &mut Vec<Update>) -> Result<()> {
        let notation = match self.transport.commit(&mov) {
            Ok(notation) => notation,
            // The transport refused after all; the position is unchanged.
            Err(Error::IllegalMove { from, to }) => {
                updates.push(Update::Rejected {
                    origin: Some(from),
                    target: to,
                });
                return Ok(());
            }
            Err(err) => {
                if err.is_transient() {
                    // The engine may yet apply it, so only this move may be sent next.
                    self.phase = Phase::Unconfirmed;
                    self.selection.clear();
                    self.unconfirmed = Some(mov);
                }
                return Err(self.fail(err));
            }
        };
        let recorded = self.record(mov, notation, String::new(), updates);
        self.guard(recorded)?;
        let settled = self.settle(updates);
        self.guard(settled)
    }

    /// Commit a move, record it and check for the end of the game.
    fn apply(&mut self, mov: MoveDesc, debug: String, updates: &mut Vec<Update>) -> Result<()> {
        let notation = self.transport.commit(&mov)?;
        self.record(mov, notation, debug, updates)
    }

    fn record(
        &mut self,
        mov: MoveDesc,
        notation: String,
        debug: String,
        updates: &mut Vec<Update>,
    ) -> Result<()> {
        self.session.record_move(&mov, &notation)?;
        updates.push(Update::Moved {
            side: mov.side,
            mov,
            notation,
            debug,
        });

        let status = self.session.check_terminal(&mut self.transport)?;
        if status.is_terminal() {
            info!("game over after {} moves: {:?}", self.session.plies(), status);
            self.phase = Phase::Over;
            self.selection.clear();
            updates.push(Update::GameOver(status));
        } else if status == TerminalStatus::Check {
            updates.push(Update::Check(self.session.side_to_move()));
        }
        Ok(())
    }

    fn engine_move(&mut self, updates: &mut Vec<Update>) -> Result<()> {
        let side = self.session.side_to_move();
        debug!("engine thinking for {}", side);
        let (mov, debug) = self.transport.search_best_move(side, &self.config.limits)?;
        self.apply(mov, debug, updates)
    }

    /// Run engine turns until a human is to move or the game ends. With no human player only the
    /// phase is updated; `engine_step` then plays each move.
    fn settle(&mut self, updates: &mut Vec<Update>) -> Result<()> {
        while self.phase != Phase::Over {
            if !self.config.players.is_engine(self.session.side_to_move()) {
                self.phase = Phase::AwaitingInput;
                return Ok(());
            }
            self.phase = Phase::EngineThinking;
            if !self.config.players.has_human() {
                return Ok(());
            }
            self.engine_move(updates)?;
        }
        Ok(())
    }

    /// Mark the session broken on a fatal error.
    fn guard<R>(&mut self, result: Result<R>) -> Result<R> {
        result.map_err(|err| self.fail(err))
    }

    fn fail(&mut self, err: Error) -> Error {
        if err.is_fatal() {
            error!("session unusable: {}", err);
            self.phase = Phase::Broken;
            self.selection.clear();
        } else if err.is_transient() {
            warn!("{}", err);
        }
        err
    }
}
