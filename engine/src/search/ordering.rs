use crate::eval::value;

use shakmaty::{Move, MoveList};

/// Priority of a move for the search: the previous iteration's best move first, then captures
/// by most valuable victim and least valuable attacker, then promotions, then quiet moves.
fn score_move(mov: &Move, pv: Option<&Move>) -> i32 {
    if pv == Some(mov) {
        return 1_000_000;
    }

    match mov.capture() {
        Some(victim) => 100_000 + value(victim) * 10 - value(mov.role()),
        None if mov.is_promotion() => 50_000,
        None => 0,
    }
}

/// Sort a move list in place, highest priority first.
pub fn order_moves(moves: &mut MoveList, pv: Option<&Move>) {
    moves.sort_by_cached_key(|mov| -score_move(mov, pv));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Game;

    #[test]
    fn captures_come_first() {
        // White pawn on e4 can take a queen on d5 or a pawn on f5.
        let game = Game::from_fen("4k3/8/8/3q1p2/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut moves = game.legal_moves();
        order_moves(&mut moves, None);

        assert_eq!(moves[0].capture(), Some(shakmaty::Role::Queen));
        assert_eq!(moves[1].capture(), Some(shakmaty::Role::Pawn));
    }

    #[test]
    fn pv_move_comes_first() {
        let game = Game::new();
        let mut moves = game.legal_moves();
        let pv = moves[moves.len() - 1].clone();
        order_moves(&mut moves, Some(&pv));
        assert_eq!(moves[0], pv);
    }
}
