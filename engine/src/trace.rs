//! Utility for tracing data about the progress of a search, such as node visit counts and nodes
//! per second.

use separator::Separatable;

use std::time::{Duration, Instant};

/// Object responsible for tracing data about the search.
pub struct Tracer {
    /// The time the search commenced.
    start_time: Instant,
    /// The number of nodes visited during search.
    nodes_visited: usize,
}

impl Tracer {
    pub fn new() -> Self {
        Self {
            // Set to the time the struct was created for now. This is updated by
            // `commence_search()`.
            start_time: Instant::now(),
            nodes_visited: 0,
        }
    }

    /// To be called immediately before a new search commences.
    pub fn commence_search(&mut self) {
        self.start_time = Instant::now();
        self.nodes_visited = 0;
    }

    #[inline(always)]
    pub fn visit_node(&mut self) {
        self.nodes_visited += 1;
    }

    pub fn nodes(&self) -> usize {
        self.nodes_visited
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn nps(&self) -> usize {
        let micros = self.elapsed().as_micros().max(1);
        (self.nodes_visited as u128 * 1_000_000 / micros) as usize
    }

    /// A single line summary of one completed iteration.
    pub fn report(&self, depth: u8, score: i32, best: &str) -> String {
        format!(
            "depth {} score {} nodes {} nps {} time {}ms best {}",
            depth,
            score,
            self.nodes_visited.separated_string(),
            self.nps().separated_string(),
            self.elapsed().as_millis(),
            best
        )
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}
