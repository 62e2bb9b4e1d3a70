use crate::types::{Side, Square};

use thiserror::Error;

use std::time::Duration;

/// Everything that can go wrong between a front end and the engine collaborator.
#[derive(Debug, Error)]
pub enum Error {
    /// The child process did not reply within the bounded wait. The child may still be healthy.
    #[error("engine did not reply to `{command}` within {timeout:?}")]
    NoResponse { command: String, timeout: Duration },

    /// Writing to the child failed or its output closed. The child has been terminated.
    #[error("engine process disconnected: {0}")]
    Disconnected(String),

    /// The child replied with something that does not fit the outstanding command.
    #[error("protocol desync: `{command}` got reply `{reply}`")]
    Desync { command: String, reply: String },

    /// A previous fatal failure left the transport without a child process.
    #[error("engine transport is no longer usable")]
    Unusable,

    /// The child process could not be started.
    #[error("failed to start engine `{path}`: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("illegal move {from} {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("the game is over")]
    GameOver,

    #[error("{0} has no legal move")]
    NoMove(Side),

    #[error("{0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether the session cannot continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Disconnected(_) | Error::Desync { .. } | Error::Unusable | Error::Spawn { .. }
        )
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::NoResponse { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let timeout = Error::NoResponse {
            command: "botMove".to_string(),
            timeout: Duration::from_millis(10),
        };
        assert!(timeout.is_transient());
        assert!(!timeout.is_fatal());

        let desync = Error::Desync {
            command: "fetchState".to_string(),
            reply: "moveMade".to_string(),
        };
        assert!(desync.is_fatal());
        assert!(!desync.is_transient());

        assert!(Error::Unusable.is_fatal());
        assert!(Error::Disconnected("broken pipe".to_string()).is_fatal());

        let illegal = Error::IllegalMove {
            from: Square::new(12).unwrap(),
            to: Square::new(36).unwrap(),
        };
        assert!(!illegal.is_fatal() && !illegal.is_transient());
        assert_eq!(illegal.to_string(), "illegal move e2 e5");
    }
}
