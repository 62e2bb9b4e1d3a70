//! The engine side of the line protocol, serving the in-process engine over any line stream.
//!
//! `duel --serve` runs this over stdin/stdout so that the binary can act as the child process of
//! another controller.

use crate::error::Error;
use crate::protocol::{Reply, Request};
use crate::selection;
use crate::transport::{Local, Transport};
use crate::types::{PromotionPiece, Side, Square};

use engine::Limits;
use log::{debug, info, warn};

use std::io::{self, BufRead, Write};

/// Answers protocol requests from an in-process engine.
pub struct Server {
    local: Local,
    human: Side,
    limits: Limits,
}

impl Server {
    pub fn new(limits: Limits) -> Self {
        Self {
            local: Local::new(),
            human: Side::White,
            limits,
        }
    }

    /// Answer one request. `None` for requests without a reply.
    pub fn handle(&mut self, request: &Request) -> Option<Reply> {
        let reply = match request {
            Request::Init(side) => self.init(*side),
            Request::Move(from, to) => self.human_move(*from, *to),
            Request::FetchState => self.local.board().map(Reply::State),
            Request::BotMove => self.bot_move(),
            Request::IsMate => {
                let side = self.local.side_to_move();
                self.local.terminal_status(side).map(Reply::Status)
            }
            Request::GetMoves(origin) => self.get_moves(*origin),
            Request::Quit => return None,
        };

        Some(reply.unwrap_or_else(|err| Reply::Error(err.to_string())))
    }

    fn init(&mut self, human: Side) -> Result<Reply, Error> {
        self.local.initialize(human)?;
        self.human = human;
        Ok(Reply::InitSuccess)
    }

    fn human_move(&mut self, from: Square, to: Square) -> Result<Reply, Error> {
        if self.local.side_to_move() != self.human {
            return Ok(Reply::InvalidMove);
        }

        let mut mov = match selection::resolve(&mut self.local, self.human, from, to) {
            Ok(mov) => mov,
            Err(Error::IllegalMove { .. }) => return Ok(Reply::InvalidMove),
            Err(err) => return Err(err),
        };
        if mov.is_promotion {
            mov.promotion = Some(PromotionPiece::Queen);
        }
        self.local.commit(&mov)?;
        Ok(Reply::MoveMade)
    }

    fn bot_move(&mut self) -> Result<Reply, Error> {
        let side = self.local.side_to_move();
        if side == self.human {
            return Err(Error::InvalidInput(format!("{} is not the engine's side", side)));
        }
        let (mov, debug_text) = self.local.search_best_move(side, &self.limits)?;
        for line in debug_text.lines() {
            debug!("{}", line);
        }
        self.local.commit(&mov)?;
        Ok(Reply::BotMoved(Some((mov.from, mov.to))))
    }

    fn get_moves(&mut self, origin: Square) -> Result<Reply, Error> {
        if self.local.side_to_move() != self.human {
            return Ok(Reply::Moves(Vec::new()));
        }
        let moves = self.local.legal_moves(self.human, origin)?;
        Ok(Reply::Moves(moves.into_iter().map(|m| m.to).collect()))
    }
}

/// Serve requests read from `input` until `quit` or end of input, writing one reply line per
/// request to `output`.
pub fn serve<R: BufRead, W: Write>(input: R, mut output: W, limits: Limits) -> io::Result<()> {
    let mut server = Server::new(limits);
    info!("serving engine protocol");

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("< {}", line);

        let reply = match Request::parse(line) {
            Ok(request) => match server.handle(&request) {
                Some(reply) => reply,
                None => break,
            },
            Err(err) => {
                warn!("bad request `{}`: {}", line, err);
                Reply::Error(err.to_string())
            }
        };

        debug!("> {}", reply);
        writeln!(output, "{}", reply)?;
        output.flush()?;
    }

    info!("engine protocol session finished");
    Ok(())
}
