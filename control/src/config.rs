use crate::types::Side;

use engine::Limits;

use std::path::PathBuf;
use std::time::Duration;

/// Default bounded wait for a single reply from a child engine process.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Who makes the moves for one side.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Player {
    Human,
    Engine,
}

/// The player assignment for both sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Players {
    pub white: Player,
    pub black: Player,
}

impl Players {
    /// A human playing `human` against the engine.
    pub fn versus_engine(human: Side) -> Self {
        match human {
            Side::White => Self {
                white: Player::Human,
                black: Player::Engine,
            },
            Side::Black => Self {
                white: Player::Engine,
                black: Player::Human,
            },
        }
    }

    /// Two humans sharing the board.
    pub fn hotseat() -> Self {
        Self {
            white: Player::Human,
            black: Player::Human,
        }
    }

    /// The engine playing itself.
    pub fn engine_only() -> Self {
        Self {
            white: Player::Engine,
            black: Player::Engine,
        }
    }

    pub fn get(&self, side: Side) -> Player {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    pub fn is_engine(&self, side: Side) -> bool {
        self.get(side) == Player::Engine
    }

    pub fn has_human(&self) -> bool {
        self.white == Player::Human || self.black == Player::Human
    }

    /// The side reported to the engine collaborator at initialization. With no human player this
    /// is White; with two it is also White, and the legal-move queries follow the side to move.
    pub fn human_side(&self) -> Side {
        if self.white == Player::Human || self.black == Player::Engine {
            Side::White
        } else {
            Side::Black
        }
    }
}

impl Default for Players {
    fn default() -> Self {
        Self::versus_engine(Side::White)
    }
}

/// Session configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub players: Players,
    /// Limits handed to every engine search.
    pub limits: Limits,
    /// How long a child engine process gets to answer one command.
    pub reply_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: Players::default(),
            limits: Limits::default(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

/// Where the child engine executable is looked for when no path is given.
pub fn default_engine_path() -> PathBuf {
    let mut path = PathBuf::from("out");
    if cfg!(windows) {
        path.push("chess.exe");
    } else {
        path.push("chess");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_assignments() {
        let players = Players::versus_engine(Side::Black);
        assert!(players.is_engine(Side::White));
        assert!(!players.is_engine(Side::Black));
        assert_eq!(players.human_side(), Side::Black);

        assert_eq!(Players::hotseat().human_side(), Side::White);
        assert!(!Players::engine_only().has_human());
        assert_eq!(Players::engine_only().human_side(), Side::White);
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.players, Players::versus_engine(Side::White));
        assert_eq!(config.limits.max_depth, 3);
        assert_eq!(config.reply_timeout, Duration::from_secs(5));
    }

    #[test]
    fn engine_path_has_platform_suffix() {
        let path = default_engine_path();
        assert!(path.starts_with("out"));
        if cfg!(windows) {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("exe"));
        } else {
            assert!(path.extension().is_none());
        }
    }
}
