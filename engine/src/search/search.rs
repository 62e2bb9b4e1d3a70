//! Iterative deepening negamax search with alpha-beta pruning.
//!
//! Each iteration searches the whole tree to a fixed depth. The wall-clock budget is checked every
//! few thousand nodes; when it runs out the iteration in progress is abandoned and the best move
//! of the last completed iteration stands.

use super::ordering::order_moves;
use super::params::Limits;

use crate::eval::evaluate;
use crate::init::init_globals;
use crate::trace::Tracer;

use log::debug;
use shakmaty::{CastlingMode, Chess, Move, Position};

use std::cmp::max;
use std::time::Instant;

/// Score of being checkmated at the root. Mates further from the root score closer to zero so
/// that the search prefers the quickest mate.
pub const MATE: i32 = 30_000;
const INFINITY: i32 = 32_000;

/// How many nodes are visited between two checks of the clock.
const CLOCK_CHECK_INTERVAL: usize = 2048;

pub struct Search {
    limits: Limits,
    tracer: Tracer,
    deadline: Instant,
    stopped: bool,
}

impl Search {
    pub fn new(limits: Limits) -> Self {
        Self {
            deadline: Instant::now() + limits.max_time,
            limits,
            tracer: Tracer::new(),
            stopped: false,
        }
    }

    /// Search the position and return the best move found together with the debug text (empty
    /// unless `limits.debug` is set). Returns `None` when the side to move has no legal moves.
    pub fn run(&mut self, root: &Chess) -> Option<(Move, String)> {
        init_globals();

        let moves = root.legal_moves();
        let mut best = moves.first()?.clone();
        let mut debug_text = String::new();

        self.tracer.commence_search();
        self.deadline = Instant::now() + self.limits.max_time;
        self.stopped = false;

        for depth in 1..=max(1, self.limits.max_depth) {
            let (mov, score) = match self.root_search(root, depth, &best) {
                Some(result) => result,
                None => break,
            };
            best = mov;

            let line = self
                .tracer
                .report(depth, score, &best.to_uci(CastlingMode::Standard).to_string());
            debug!("{}", line);
            if self.limits.debug {
                debug_text.push_str(&line);
                debug_text.push('\n');
            }

            // A forced mate was found; deeper iterations cannot improve on it.
            if score.abs() >= MATE - i32::from(self.limits.max_depth) {
                break;
            }
        }

        Some((best, debug_text))
    }

    /// Search every root move to `depth`. Returns `None` if the clock ran out before the
    /// iteration completed.
    fn root_search(&mut self, root: &Chess, depth: u8, pv: &Move) -> Option<(Move, i32)> {
        let mut moves = root.legal_moves();
        order_moves(&mut moves, Some(pv));

        let mut alpha = -INFINITY;
        let mut best: Option<Move> = None;

        for mov in moves.iter() {
            let mut child = root.clone();
            child.play_unchecked(mov);
            let score = -self.negamax(&child, depth - 1, -INFINITY, -alpha, 1);

            if self.stopped {
                return None;
            }

            if best.is_none() || score > alpha {
                alpha = score;
                best = Some(mov.clone());
            }
        }

        best.map(|mov| (mov, alpha))
    }

    fn negamax(&mut self, pos: &Chess, depth: u8, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        self.tracer.visit_node();
        if self.tracer.nodes() % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
            self.stopped = true;
        }
        if self.stopped {
            return 0;
        }

        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return if pos.is_check() { -MATE + ply } else { 0 };
        }

        if depth == 0 {
            return evaluate(pos);
        }

        order_moves(&mut moves, None);
        for mov in moves.iter() {
            let mut child = pos.clone();
            child.play_unchecked(mov);
            let score = -self.negamax(&child, depth - 1, -beta, -alpha, ply + 1);

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// Find the best move for the side to move in `pos` within `limits`.
pub fn find_best_move(pos: &Chess, limits: &Limits) -> Option<(Move, String)> {
    Search::new(limits.clone()).run(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::endpoints;
    use crate::Game;

    use shakmaty::Square;
    use std::time::Duration;

    fn limits(depth: u8) -> Limits {
        Limits::new(depth, Duration::from_secs(30))
    }

    #[test]
    fn finds_mate_in_one() {
        // Back rank mate: Re8#.
        let game = Game::from_fen("6k1/5ppp/8/8/8/8/8/4R1K1 w - - 0 1").unwrap();
        let (mov, _) = find_best_move(game.position(), &limits(3)).unwrap();
        assert_eq!(endpoints(&mov), Some((Square::E1, Square::E8)));
    }

    #[test]
    fn takes_a_hanging_queen() {
        let game = Game::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let (mov, _) = find_best_move(game.position(), &limits(2)).unwrap();
        assert_eq!(endpoints(&mov), Some((Square::E4, Square::D5)));
    }

    #[test]
    fn no_move_when_mated() {
        let game =
            Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(find_best_move(game.position(), &limits(2)).is_none());
    }

    #[test]
    fn debug_text_has_one_line_per_depth() {
        let game = Game::new();
        let (_, text) = find_best_move(game.position(), &limits(2).with_debug(true)).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("depth 1 "));
    }

    #[test]
    fn zero_time_still_returns_a_legal_move() {
        let game = Game::new();
        let (mov, _) =
            find_best_move(game.position(), &Limits::new(6, Duration::from_millis(0))).unwrap();
        assert!(game.legal_moves().contains(&mov));
    }
}
