use std::time::Duration;

/// Default maximum search depth, in plies.
pub const DEFAULT_MAX_DEPTH: u8 = 3;

/// Default wall-clock budget for one search.
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(5);

/// The limits a single search runs under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum iterative deepening depth, in plies. A depth of 0 is treated as 1.
    pub max_depth: u8,
    /// Wall-clock budget. When it runs out the best move of the last completed iteration is
    /// returned.
    pub max_time: Duration,
    /// Whether to produce the per-iteration debug text.
    pub debug: bool,
}

impl Limits {
    pub fn new(max_depth: u8, max_time: Duration) -> Self {
        Self {
            max_depth,
            max_time,
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, DEFAULT_MAX_TIME)
    }
}
