use super::Transport;

use crate::error::{Error, Result};
use crate::types::{BoardState, MoveDesc, PromotionPiece, Side, Square, TerminalStatus};

use engine::game::endpoints;
use engine::init::init_globals;
use engine::shakmaty::{Color, Move, Role};
use engine::{find_best_move, Game, GameError, Limits, Status};
use log::{debug, trace};

/// Direct, synchronous calls into the in-process engine.
pub struct Local {
    game: Game,
    human: Side,
}

impl Local {
    pub fn new() -> Self {
        init_globals();
        Self {
            game: Game::new(),
            human: Side::White,
        }
    }

    /// Start from an arbitrary position. `initialize` returns to the standard start.
    pub fn from_fen(fen: &str) -> std::result::Result<Self, GameError> {
        init_globals();
        Ok(Self {
            game: Game::from_fen(fen)?,
            human: Side::White,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The side the human was declared to play at initialization.
    pub fn human(&self) -> Side {
        self.human
    }

    pub fn side_to_move(&self) -> Side {
        side_of(self.game.turn())
    }

    /// The engine's legal moves matching `from`/`to`. Promotions yield one move per piece.
    fn matching(&self, from: Square, to: Square) -> Vec<Move> {
        self.game
            .legal_moves()
            .into_iter()
            .filter(|m| endpoints_of(m) == Some((from, to)))
            .collect()
    }

    fn describe(&self, mov: &Move) -> Option<MoveDesc> {
        let (from, to) = endpoints_of(mov)?;
        Some(MoveDesc {
            from,
            to,
            side: self.side_to_move(),
            is_promotion: mov.is_promotion(),
            promotion: mov.promotion().and_then(promotion_piece),
            is_zeroing: mov.is_zeroing(),
        })
    }
}

impl Default for Local {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for Local {
    fn initialize(&mut self, human: Side) -> Result<()> {
        debug!("new in-process game, human plays {}", human);
        self.game = Game::new();
        self.human = human;
        Ok(())
    }

    fn legal_moves(&mut self, side: Side, origin: Square) -> Result<Vec<MoveDesc>> {
        if side != self.side_to_move() {
            return Ok(Vec::new());
        }

        let mut moves: Vec<MoveDesc> = Vec::new();
        for mov in self.game.legal_moves().iter() {
            let mut desc = match self.describe(mov) {
                Some(desc) if desc.from == origin => desc,
                _ => continue,
            };
            // One descriptor per destination; the piece is picked at commit time.
            if moves.iter().any(|m| m.to == desc.to) {
                continue;
            }
            desc.promotion = None;
            moves.push(desc);
        }
        moves.sort_by_key(|m| m.to);
        trace!("{} legal moves from {}", moves.len(), origin);
        Ok(moves)
    }

    fn commit(&mut self, mov: &MoveDesc) -> Result<String> {
        let illegal = Error::IllegalMove {
            from: mov.from,
            to: mov.to,
        };
        if mov.side != self.side_to_move() {
            return Err(illegal);
        }

        let wanted = role_of(mov.promotion.unwrap_or_default());
        let found = self
            .matching(mov.from, mov.to)
            .into_iter()
            .find(|m| !m.is_promotion() || m.promotion() == Some(wanted));

        match found {
            Some(m) => {
                let san = self.game.play(&m);
                debug!("{} played {}", mov.side, san);
                Ok(san)
            }
            None => Err(illegal),
        }
    }

    fn search_best_move(&mut self, side: Side, limits: &Limits) -> Result<(MoveDesc, String)> {
        if side != self.side_to_move() {
            return Err(Error::InvalidInput(format!("it is not {}'s turn", side)));
        }

        let (mov, debug_text) =
            find_best_move(self.game.position(), limits).ok_or(Error::NoMove(side))?;
        let desc = self.describe(&mov).ok_or(Error::NoMove(side))?;
        Ok((desc, debug_text))
    }

    fn terminal_status(&mut self, side: Side) -> Result<TerminalStatus> {
        let to_move = self.side_to_move();
        if side != to_move {
            debug!("status asked for {} but {} is to move", side, to_move);
        }

        Ok(match self.game.status() {
            Status::Ongoing => TerminalStatus::None,
            Status::Check => TerminalStatus::Check,
            Status::Checkmate => TerminalStatus::Checkmate {
                winner: to_move.invert(),
            },
            Status::Stalemate => TerminalStatus::Stalemate,
        })
    }

    fn board(&mut self) -> Result<BoardState> {
        Ok(BoardState::from_fn(|sq| self.game.square_char(sq.index())))
    }
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

fn endpoints_of(mov: &Move) -> Option<(Square, Square)> {
    let (from, to) = endpoints(mov)?;
    Some((Square::new(from as u8)?, Square::new(to as u8)?))
}

fn promotion_piece(role: Role) -> Option<PromotionPiece> {
    match role {
        Role::Queen => Some(PromotionPiece::Queen),
        Role::Rook => Some(PromotionPiece::Rook),
        Role::Bishop => Some(PromotionPiece::Bishop),
        Role::Knight => Some(PromotionPiece::Knight),
        _ => None,
    }
}

fn role_of(piece: PromotionPiece) -> Role {
    match piece {
        PromotionPiece::Queen => Role::Queen,
        PromotionPiece::Rook => Role::Rook,
        PromotionPiece::Bishop => Role::Bishop,
        PromotionPiece::Knight => Role::Knight,
    }
}
