//! The text console front end.

use control::selection::parse_typed;
use control::transport::Transport;
use control::{Controller, Error, Phase, PromotionPiece, Side, Square, TerminalStatus, Update};
use log::debug;

use std::io::{self, BufRead, Write};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    /// Ask which side the human plays. `None` when the user quits.
    pub fn ask_side(&mut self) -> io::Result<Option<Side>> {
        loop {
            write!(self.output, "Play as (w)hite or (b)lack? ")?;
            self.output.flush()?;
            let line = match read_line(&mut self.input)? {
                Some(line) => line,
                None => return Ok(None),
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "q" | "quit" => return Ok(None),
                answer => match answer.parse::<Side>() {
                    Ok(side) => return Ok(Some(side)),
                    Err(_) => self.say("Please answer w or b, or q to quit.")?,
                },
            }
        }
    }

    /// Play a game to the end. Returns the process exit code: non-zero after a fatal engine
    /// failure.
    pub fn play<T: Transport>(&mut self, ctl: &mut Controller<T>) -> io::Result<i32> {
        self.banner(ctl)?;
        match ctl.start() {
            Ok(updates) => self.report(ctl, &updates)?,
            Err(err) => {
                if let Some(code) = self.failure(&err)? {
                    return Ok(code);
                }
            }
        }

        loop {
            let result = match ctl.phase() {
                Phase::Over => {
                    self.say(&format!("PGN: {}", ctl.session().pgn()))?;
                    return Ok(0);
                }
                Phase::Broken => return Ok(1),
                Phase::EngineThinking if !ctl.config().players.has_human() => {
                    self.show(ctl)?;
                    ctl.engine_step()
                }
                Phase::Unconfirmed => {
                    write!(self.output, "Press enter to send your move again, or type quit: ")?;
                    self.output.flush()?;
                    match read_line(&mut self.input)? {
                        Some(line) if line.trim() != "quit" => ctl.resume(),
                        _ => return Ok(0),
                    }
                }
                Phase::EngineThinking => {
                    write!(self.output, "Press enter to retry the engine, or type quit: ")?;
                    self.output.flush()?;
                    match read_line(&mut self.input)? {
                        Some(line) if line.trim() != "quit" => ctl.resume(),
                        _ => return Ok(0),
                    }
                }
                Phase::AwaitingInput => {
                    self.show(ctl)?;
                    write!(self.output, "> ")?;
                    self.output.flush()?;
                    let line = match read_line(&mut self.input)? {
                        Some(line) => line,
                        None => return Ok(0),
                    };
                    match line.trim() {
                        "" => continue,
                        "quit" => return Ok(0),
                        text => self.human_input(ctl, text),
                    }
                }
            };

            match result {
                Ok(updates) => self.report(ctl, &updates)?,
                Err(err) => {
                    if let Some(code) = self.failure(&err)? {
                        return Ok(code);
                    }
                }
            }
        }
    }

    /// A single square acts as a click; two squares are a typed move.
    fn human_input<T: Transport>(
        &mut self,
        ctl: &mut Controller<T>,
        text: &str,
    ) -> control::Result<Vec<Update>> {
        if !text.contains(char::is_whitespace) {
            let square: Square = text
                .parse()
                .map_err(|err| Error::InvalidInput(format!("{}", err)))?;
            return ctl.click(square);
        }

        let (from, to) = parse_typed(text)?;
        let Self { input, output } = self;
        ctl.play_typed(from, to, || ask_promotion(input, output).ok().flatten())
    }

    fn banner<T: Transport>(&mut self, ctl: &Controller<T>) -> io::Result<()> {
        let players = ctl.config().players;
        let text = if !players.has_human() {
            "The engine plays both sides.".to_string()
        } else if !players.is_engine(Side::White) && !players.is_engine(Side::Black) {
            "Two players share the board.".to_string()
        } else {
            format!("You play {} against the engine.", players.human_side())
        };
        self.say(&text)?;
        self.say("Enter moves as `e2 e4`, a single square to select, or `quit`.")
    }

    fn show<T: Transport>(&mut self, ctl: &mut Controller<T>) -> io::Result<()> {
        let board = match ctl.board() {
            Ok(board) => board,
            Err(err) => {
                self.say(&format!("Could not fetch the board: {}", err))?;
                return Ok(());
            }
        };
        let session = ctl.session();

        self.say("")?;
        self.say(&format!(
            "Move {}, {} to move",
            session.fullmove(),
            session.side_to_move()
        ))?;
        if session.status() == TerminalStatus::Check {
            self.say("CHECK!")?;
        }
        write!(self.output, "{}", board.pretty())?;
        self.say(&format!("FEN: {}", session.fen(&board)))?;
        self.say(&format!("PGN: {}", session.pgn()))
    }

    fn report<T: Transport>(
        &mut self,
        ctl: &Controller<T>,
        updates: &[Update],
    ) -> io::Result<()> {
        for update in updates {
            match update {
                Update::Selected {
                    origin,
                    destinations,
                } => {
                    let targets: Vec<String> =
                        destinations.iter().map(|sq| sq.to_string()).collect();
                    self.say(&format!(
                        "{} selected, moves to: {}",
                        origin,
                        targets.join(" ")
                    ))?;
                }
                Update::Deselected => self.say("Selection cleared.")?,
                Update::Rejected {
                    origin: Some(origin),
                    target,
                } => self.say(&format!("Illegal move: {} {}", origin, target))?,
                Update::Rejected {
                    origin: None,
                    target,
                } => self.say(&format!("No legal moves from {}.", target))?,
                Update::Moved {
                    side, mov, debug, ..
                } => {
                    if ctl.config().players.is_engine(*side) {
                        self.say(&format!("Computer plays: {}", mov))?;
                        for line in debug.lines() {
                            self.say(&format!("  {}", line))?;
                        }
                    }
                }
                Update::Check(side) => debug!("{} is in check", side),
                Update::GameOver(status) => match status {
                    TerminalStatus::Checkmate { winner } => {
                        self.say(&format!("CHECKMATE! {} wins.", winner))?
                    }
                    _ => self.say("STALEMATE! Nobody wins")?,
                },
                Update::Ignored => self.say("Please wait, it is the engine's turn.")?,
            }
        }
        Ok(())
    }

    /// Tell the user about a failed request. Returns the exit code when the game cannot go on.
    fn failure(&mut self, err: &Error) -> io::Result<Option<i32>> {
        if err.is_fatal() {
            self.say(&format!("Engine failure, the game cannot continue: {}", err))?;
            Ok(Some(1))
        } else if err.is_transient() {
            self.say(&format!("The engine did not respond: {}", err))?;
            Ok(None)
        } else {
            self.say(&format!("{}", err))?;
            Ok(None)
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

/// Ask for a promotion piece. Anything but Q, R, B or N means a queen.
fn ask_promotion<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<PromotionPiece>> {
    write!(output, "Promote to (Q)ueen, (R)ook, (B)ishop or k(N)ight? ")?;
    output.flush()?;
    Ok(read_line(input)?.and_then(|line| PromotionPiece::from_choice(&line)))
}
