//! Turning square clicks and typed moves into a single legal move.

use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{MoveDesc, Side, Square};

use log::trace;

/// The selection cursor over the board.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Selection {
    /// No origin chosen.
    #[default]
    Empty,
    /// A piece is picked up; `destinations` are its legal moves at the time it was picked.
    OriginChosen {
        origin: Square,
        destinations: Vec<MoveDesc>,
    },
}

/// What a click did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Selected {
        origin: Square,
        destinations: Vec<Square>,
    },
    Deselected,
    /// A legal move was found. The selection is empty again and the move is ready to commit.
    Resolved(MoveDesc),
    /// The click matched no legal move and selected nothing. The selection is empty.
    Rejected {
        origin: Option<Square>,
        target: Square,
    },
}

impl Selection {
    pub fn origin(&self) -> Option<Square> {
        match self {
            Selection::Empty => None,
            Selection::OriginChosen { origin, .. } => Some(*origin),
        }
    }

    /// The destinations highlighted for the chosen origin.
    pub fn destinations(&self) -> Vec<Square> {
        match self {
            Selection::Empty => Vec::new(),
            Selection::OriginChosen { destinations, .. } => {
                destinations.iter().map(|m| m.to).collect()
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::Empty;
    }

    /// Feed a click on `square` by `side`. The transport is the sole judge of legality, and the
    /// move list is queried afresh for the commit attempt. On error the selection is unchanged.
    pub fn click<T: Transport + ?Sized>(
        &mut self,
        transport: &mut T,
        side: Side,
        square: Square,
    ) -> Result<Outcome> {
        let origin = match self {
            Selection::Empty => {
                let moves = transport.legal_moves(side, square)?;
                return Ok(self.pick(square, moves, None));
            }
            Selection::OriginChosen { origin, .. } => *origin,
        };

        if square == origin {
            trace!("deselected {}", origin);
            self.clear();
            return Ok(Outcome::Deselected);
        }

        let fresh = transport.legal_moves(side, origin)?;
        if let Some(mov) = fresh.into_iter().find(|m| m.connects(origin, square)) {
            self.clear();
            return Ok(Outcome::Resolved(mov));
        }

        let moves = transport.legal_moves(side, square)?;
        Ok(self.pick(square, moves, Some(origin)))
    }

    /// Select `square` if it has legal moves, else reset to empty.
    fn pick(&mut self, square: Square, moves: Vec<MoveDesc>, previous: Option<Square>) -> Outcome {
        if moves.is_empty() {
            self.clear();
            return Outcome::Rejected {
                origin: previous,
                target: square,
            };
        }

        let destinations = moves.iter().map(|m| m.to).collect();
        trace!("selected {}", square);
        *self = Selection::OriginChosen {
            origin: square,
            destinations: moves,
        };
        Outcome::Selected {
            origin: square,
            destinations,
        }
    }
}

/// Parse a typed move of the form `<from> <to>`, e.g. `e2 e4`.
pub fn parse_typed(line: &str) -> Result<(Square, Square)> {
    let toks: Vec<&str> = line.split_whitespace().collect();
    match toks.as_slice() {
        [from, to] => {
            let from = from
                .parse()
                .map_err(|err| Error::InvalidInput(format!("{}", err)))?;
            let to = to
                .parse()
                .map_err(|err| Error::InvalidInput(format!("{}", err)))?;
            Ok((from, to))
        }
        _ => Err(Error::InvalidInput(format!(
            "`{}` is not a move, expected e.g. `e2 e4`",
            line.trim()
        ))),
    }
}

/// Look up the legal move of `side` from `from` to `to`.
pub fn resolve<T: Transport + ?Sized>(
    transport: &mut T,
    side: Side,
    from: Square,
    to: Square,
) -> Result<MoveDesc> {
    transport
        .legal_moves(side, from)?
        .into_iter()
        .find(|m| m.connects(from, to))
        .ok_or(Error::IllegalMove { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Local;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    #[test]
    fn select_then_commit() {
        let mut local = Local::new();
        let mut selection = Selection::default();

        let outcome = selection.click(&mut local, Side::White, sq("e2")).unwrap();
        assert_eq!(
            outcome,
            Outcome::Selected {
                origin: sq("e2"),
                destinations: vec![sq("e3"), sq("e4")]
            }
        );
        assert_eq!(selection.origin(), Some(sq("e2")));

        match selection.click(&mut local, Side::White, sq("e4")).unwrap() {
            Outcome::Resolved(mov) => assert!(mov.connects(sq("e2"), sq("e4"))),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(selection, Selection::Empty);
    }

    #[test]
    fn click_without_moves_stays_empty() {
        let mut local = Local::new();
        let mut selection = Selection::default();
        for square in ["e4", "e7", "a1"] {
            let outcome = selection.click(&mut local, Side::White, sq(square)).unwrap();
            assert!(matches!(outcome, Outcome::Rejected { origin: None, .. }));
            assert_eq!(selection, Selection::Empty);
        }
    }

    #[test]
    fn same_square_deselects() {
        let mut local = Local::new();
        let mut selection = Selection::default();
        selection.click(&mut local, Side::White, sq("g1")).unwrap();
        let outcome = selection.click(&mut local, Side::White, sq("g1")).unwrap();
        assert_eq!(outcome, Outcome::Deselected);
        assert_eq!(selection, Selection::Empty);
    }

    #[test]
    fn other_own_piece_reselects() {
        let mut local = Local::new();
        let mut selection = Selection::default();
        selection.click(&mut local, Side::White, sq("e2")).unwrap();
        let outcome = selection.click(&mut local, Side::White, sq("d2")).unwrap();
        assert!(matches!(outcome, Outcome::Selected { origin, .. } if origin == sq("d2")));
        assert_eq!(selection.destinations(), vec![sq("d3"), sq("d4")]);
    }

    #[test]
    fn illegal_target_clears() {
        let mut local = Local::new();
        let mut selection = Selection::default();
        selection.click(&mut local, Side::White, sq("e2")).unwrap();
        let outcome = selection.click(&mut local, Side::White, sq("e5")).unwrap();
        assert_eq!(
            outcome,
            Outcome::Rejected {
                origin: Some(sq("e2")),
                target: sq("e5")
            }
        );
        assert_eq!(selection, Selection::Empty);
    }

    #[test]
    fn typed_moves() {
        assert_eq!(parse_typed(" e2  e4 ").unwrap(), (sq("e2"), sq("e4")));
        assert!(matches!(parse_typed("e2"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_typed("e2 e9"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_typed("e2 e4 e5"), Err(Error::InvalidInput(_))));

        let mut local = Local::new();
        let mov = resolve(&mut local, Side::White, sq("b1"), sq("c3")).unwrap();
        assert_eq!(mov.side, Side::White);
        assert!(matches!(
            resolve(&mut local, Side::White, sq("b1"), sq("b3")),
            Err(Error::IllegalMove { .. })
        ));
    }
}
