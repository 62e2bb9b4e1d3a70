//! The engine line protocol: one command per line, one reply per line.
//!
//! Squares travel as indices `rank * 8 + file` (a1 = 0). Requests are parsed with a small token
//! parser; replies are only ever parsed against the request that is outstanding, so an answer of
//! the wrong shape is detected structurally.

use crate::types::{BoardState, Side, Square, TerminalStatus};

use thiserror::Error;

use std::fmt;

/// A command sent to the engine process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Start a new game; the side is the one the human plays.
    Init(Side),
    /// Play the human's move.
    Move(Square, Square),
    /// Report the board.
    FetchState,
    /// Let the engine search and play its own move.
    BotMove,
    /// Report check, checkmate or stalemate.
    IsMate,
    /// List the destinations of the piece on a square.
    GetMoves(Square),
    /// Terminate the engine process. Has no reply.
    Quit,
}

impl Request {
    pub fn parse(line: &str) -> Result<Request, ParseError> {
        Parser::new(line).parse_request()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Init(side) => write!(f, "init {}", side.wire_name()),
            Request::Move(from, to) => write!(f, "move {} {}", from.index(), to.index()),
            Request::FetchState => write!(f, "fetchState"),
            Request::BotMove => write!(f, "botMove"),
            Request::IsMate => write!(f, "isMate"),
            Request::GetMoves(sq) => write!(f, "getMoves {}", sq.index()),
            Request::Quit => write!(f, "quit"),
        }
    }
}

/// An engine's answer to a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    InitSuccess,
    MoveMade,
    InvalidMove,
    State(BoardState),
    /// The engine played a move. Older engines do not say which one.
    BotMoved(Option<(Square, Square)>),
    Status(TerminalStatus),
    Moves(Vec<Square>),
    /// The engine could not make sense of a request.
    Error(String),
}

impl Reply {
    /// Parse `line` as a reply to `request`. Returns `None` when the line is not a valid answer to
    /// that request, including any `error` line.
    pub fn parse_for(request: &Request, line: &str) -> Option<Reply> {
        let mut toks = line.split_whitespace();
        let head = toks.next()?;

        let reply = match (request, head) {
            (Request::Init(_), "initSuccess") => Reply::InitSuccess,
            (Request::Move(..), "moveMade") => Reply::MoveMade,
            (Request::Move(..), "invalidMove") => Reply::InvalidMove,
            (Request::FetchState, _) => return BoardState::parse(line).map(Reply::State),
            (Request::BotMove, "botMoved") => {
                let rest: Vec<&str> = toks.by_ref().collect();
                return match rest.as_slice() {
                    [] => Some(Reply::BotMoved(None)),
                    [from, to] => Some(Reply::BotMoved(Some((
                        parse_index(from)?,
                        parse_index(to)?,
                    )))),
                    _ => None,
                };
            }
            (Request::IsMate, status) => Reply::Status(match status {
                "whiteWins" => TerminalStatus::Checkmate {
                    winner: Side::White,
                },
                "blackWins" => TerminalStatus::Checkmate {
                    winner: Side::Black,
                },
                "staleMate" => TerminalStatus::Stalemate,
                "check" => TerminalStatus::Check,
                "none" => TerminalStatus::None,
                _ => return None,
            }),
            (Request::GetMoves(_), "moves") => {
                let squares = toks.by_ref().map(parse_index).collect::<Option<Vec<_>>>()?;
                return Some(Reply::Moves(squares));
            }
            _ => return None,
        };

        match toks.next() {
            None => Some(reply),
            Some(_) => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::InitSuccess => write!(f, "initSuccess"),
            Reply::MoveMade => write!(f, "moveMade"),
            Reply::InvalidMove => write!(f, "invalidMove"),
            Reply::State(board) => write!(f, "{}", board),
            Reply::BotMoved(None) => write!(f, "botMoved"),
            Reply::BotMoved(Some((from, to))) => {
                write!(f, "botMoved {} {}", from.index(), to.index())
            }
            Reply::Status(status) => match status {
                TerminalStatus::None => write!(f, "none"),
                TerminalStatus::Check => write!(f, "check"),
                TerminalStatus::Checkmate {
                    winner: Side::White,
                } => write!(f, "whiteWins"),
                TerminalStatus::Checkmate {
                    winner: Side::Black,
                } => write!(f, "blackWins"),
                TerminalStatus::Stalemate => write!(f, "staleMate"),
            },
            Reply::Moves(squares) => {
                write!(f, "moves")?;
                for sq in squares {
                    write!(f, " {}", sq.index())?;
                }
                Ok(())
            }
            Reply::Error(reason) => write!(f, "error {}", reason),
        }
    }
}

fn parse_index(tok: &str) -> Option<Square> {
    tok.parse::<u8>().ok().and_then(Square::new)
}

/// A request parsing error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// There were no tokens to parse.
    #[error("empty command")]
    NoInput,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    /// Expected a square index between 0 and 63.
    #[error("expected a square index 0-63")]
    ExpectedSquare,
    #[error("expected `white` or `black`")]
    ExpectedSide,
    /// Unexpected additional tokens after an otherwise valid command.
    #[error("unexpected input after command")]
    ExpectedEnd,
}

#[derive(Copy, Clone, PartialEq)]
enum Keyword {
    Init,
    Move,
    FetchState,
    BotMove,
    IsMate,
    GetMoves,
    Quit,
}

#[derive(PartialEq)]
enum Token<'a> {
    Kw(Keyword),
    String(&'a str),
}

impl<'a> Token<'a> {
    fn scan(t: &'a str) -> Token<'a> {
        match t {
            "init" => Token::Kw(Keyword::Init),
            "move" => Token::Kw(Keyword::Move),
            "fetchState" => Token::Kw(Keyword::FetchState),
            "botMove" => Token::Kw(Keyword::BotMove),
            "isMate" => Token::Kw(Keyword::IsMate),
            "getMoves" => Token::Kw(Keyword::GetMoves),
            "quit" => Token::Kw(Keyword::Quit),
            _ => Token::String(t),
        }
    }
}

type PResult = Result<Request, ParseError>;

struct Parser<'a> {
    toks: Vec<Token<'a>>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Parser<'a> {
        Parser {
            toks: input.split_whitespace().map(Token::scan).collect(),
            cursor: 0,
        }
    }

    fn advance(&mut self) -> Option<&Token<'a>> {
        let next = self.toks.get(self.cursor);
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn expect_end(&self, p: PResult) -> PResult {
        if self.cursor == self.toks.len() {
            p
        } else {
            Err(ParseError::ExpectedEnd)
        }
    }

    fn parse_square(&mut self) -> Result<Square, ParseError> {
        match self.advance() {
            Some(Token::String(s)) => parse_index(s).ok_or(ParseError::ExpectedSquare),
            _ => Err(ParseError::ExpectedSquare),
        }
    }

    fn parse_side(&mut self) -> Result<Side, ParseError> {
        match self.advance() {
            Some(Token::String(s)) => s.parse().map_err(|_| ParseError::ExpectedSide),
            _ => Err(ParseError::ExpectedSide),
        }
    }

    fn parse_request(&mut self) -> PResult {
        let kw = match self.advance() {
            Some(Token::Kw(kw)) => *kw,
            Some(Token::String(s)) => return Err(ParseError::UnknownCommand(s.to_string())),
            None => return Err(ParseError::NoInput),
        };

        let request = match kw {
            Keyword::Init => Request::Init(self.parse_side()?),
            Keyword::Move => {
                let from = self.parse_square()?;
                let to = self.parse_square()?;
                Request::Move(from, to)
            }
            Keyword::FetchState => Request::FetchState,
            Keyword::BotMove => Request::BotMove,
            Keyword::IsMate => Request::IsMate,
            Keyword::GetMoves => Request::GetMoves(self.parse_square()?),
            Keyword::Quit => Request::Quit,
        };
        self.expect_end(Ok(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    #[test]
    fn requests_print_in_wire_form() {
        assert_eq!(Request::Init(Side::White).to_string(), "init white");
        assert_eq!(Request::Move(sq(12), sq(28)).to_string(), "move 12 28");
        assert_eq!(Request::GetMoves(sq(12)).to_string(), "getMoves 12");
        assert_eq!(Request::FetchState.to_string(), "fetchState");
    }

    #[test]
    fn parse_requests() {
        assert_eq!(Request::parse("init black"), Ok(Request::Init(Side::Black)));
        assert_eq!(
            Request::parse("  move 12   28 "),
            Ok(Request::Move(sq(12), sq(28)))
        );
        assert_eq!(Request::parse("getMoves 63"), Ok(Request::GetMoves(sq(63))));
        assert_eq!(Request::parse("isMate"), Ok(Request::IsMate));
        assert_eq!(Request::parse("quit"), Ok(Request::Quit));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Request::parse(""), Err(ParseError::NoInput));
        assert_eq!(
            Request::parse("fly 1 2"),
            Err(ParseError::UnknownCommand("fly".to_string()))
        );
        assert_eq!(Request::parse("move 12"), Err(ParseError::ExpectedSquare));
        assert_eq!(Request::parse("move 12 64"), Err(ParseError::ExpectedSquare));
        assert_eq!(Request::parse("getMoves e2"), Err(ParseError::ExpectedSquare));
        assert_eq!(Request::parse("init red"), Err(ParseError::ExpectedSide));
        assert_eq!(Request::parse("botMove now"), Err(ParseError::ExpectedEnd));
    }

    #[test]
    fn replies_are_matched_against_the_request() {
        let mov = Request::Move(sq(12), sq(28));
        assert_eq!(Reply::parse_for(&mov, "moveMade"), Some(Reply::MoveMade));
        assert_eq!(Reply::parse_for(&mov, "invalidMove"), Some(Reply::InvalidMove));
        assert_eq!(Reply::parse_for(&mov, "initSuccess"), None);
        assert_eq!(Reply::parse_for(&mov, "error bad move"), None);

        assert_eq!(Reply::parse_for(&Request::FetchState, "moveMade"), None);
        assert_eq!(
            Reply::parse_for(&Request::Init(Side::White), "initSuccess extra"),
            None
        );
    }

    #[test]
    fn bot_moved_with_and_without_squares() {
        assert_eq!(
            Reply::parse_for(&Request::BotMove, "botMoved"),
            Some(Reply::BotMoved(None))
        );
        assert_eq!(
            Reply::parse_for(&Request::BotMove, "botMoved 52 36"),
            Some(Reply::BotMoved(Some((sq(52), sq(36)))))
        );
        assert_eq!(Reply::parse_for(&Request::BotMove, "botMoved 52"), None);
    }

    #[test]
    fn status_and_moves_replies() {
        assert_eq!(
            Reply::parse_for(&Request::IsMate, "blackWins"),
            Some(Reply::Status(TerminalStatus::Checkmate {
                winner: Side::Black
            }))
        );
        assert_eq!(
            Reply::parse_for(&Request::IsMate, "staleMate"),
            Some(Reply::Status(TerminalStatus::Stalemate))
        );
        assert_eq!(Reply::parse_for(&Request::IsMate, "draw"), None);

        let get = Request::GetMoves(sq(11));
        assert_eq!(
            Reply::parse_for(&get, "moves 19 27"),
            Some(Reply::Moves(vec![sq(19), sq(27)]))
        );
        assert_eq!(Reply::parse_for(&get, "moves"), Some(Reply::Moves(vec![])));
        assert_eq!(Reply::parse_for(&get, "moves 19 x"), None);
    }

    #[test]
    fn replies_print_in_wire_form() {
        assert_eq!(Reply::Moves(vec![sq(19), sq(27)]).to_string(), "moves 19 27");
        assert_eq!(Reply::Moves(vec![]).to_string(), "moves");
        assert_eq!(Reply::BotMoved(Some((sq(52), sq(36)))).to_string(), "botMoved 52 36");
        assert_eq!(Reply::Status(TerminalStatus::None).to_string(), "none");
        assert_eq!(Reply::Error("empty command".into()).to_string(), "error empty command");
    }
}
