//! The top-level solver: owns the transposition table and exposes the root search entry point.

use crate::board::bitboard::{self, Mask};
use crate::engine::search::{self, SearchCache, SearchInfo};
use crate::engine::transposition_table::TranspositionTable;
use crate::engine::value::Value;
use crate::{EngineError, Position};

/// The outcome of a root-level search: the move to play and its game-theoretic value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub move_mask: Mask,
    pub value: Value,
}

/// A perfect-play Connect Four solver, carrying a persistent transposition table across searches.
#[derive(Debug)]
pub struct Engine {
    table: TranspositionTable,
}

impl Engine {
    /// Creates a new engine with an empty transposition table.
    pub fn new() -> Engine {
        Engine { table: TranspositionTable::new() }
    }

    /// Clears search counters and the transposition table, as if freshly constructed.
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Finds the best move and its value for `pos`.
    ///
    /// # Errors
    ///
    /// Returns `Err(EngineError::NoValidMoves)` if `pos` has no legal moves.
    pub fn search(&mut self, pos: &Position, log: bool) -> Result<SearchResult, EngineError> {
        let valid_moves = pos.valid_move_mask();
        if valid_moves == 0 {
            return Err(EngineError::NoValidMoves);
        }

        let win_move_mask = valid_moves & pos.win_mask(pos.side_to_move());
        if win_move_mask != 0 {
            if log {
                println!("[Playing winning move]");
            }
            return Ok(SearchResult {
                move_mask: bitboard::lowest_bit(win_move_mask),
                value: Value::new(1, 1),
            });
        }

        let mut info = SearchInfo::new_root();
        let eval = search::alpha_beta(pos, &mut self.table, &mut info, SearchCache::root());

        let mut best_move = info.best_move[0];
        if best_move == 0 {
            best_move = bitboard::lowest_bit(valid_moves);
        }

        if log {
            let pv = search::find_principal_variation(&self.table, pos, best_move);
            let pv_str: String = pv
                .iter()
                .map(|&m| char::from_digit((bitboard::mask_to_column(m) + 1) as u32, 10).unwrap_or('?'))
                .collect();
            println!(
                "Eval: {eval}, searched: {}/{}, table hit frac: {:.3}, table fill frac: {:.3}",
                info.nodes_searched,
                info.pruned,
                info.table_hit_fraction(),
                self.table.fill_fraction(),
            );
            println!(" > PV: {pv_str}");
        }

        Ok(SearchResult { move_mask: best_move, value: eval })
    }
}

impl Default for Engine {
    fn default() -> Engine {
        Engine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_plays_the_immediate_win() {
        let pos = Position::from_moves("444443").unwrap();
        let mut engine = Engine::new();
        let result = engine.search(&pos, false).unwrap();
        assert_eq!(result.value, Value::new(1, 1));
    }

    #[test]
    fn search_plays_the_vertical_stack_win() {
        let pos = Position::from_moves("44444").unwrap();
        let mut engine = Engine::new();
        let result = engine.search(&pos, false).unwrap();
        assert_eq!(result.value, Value::new(1, 1));
        assert_eq!(bitboard::mask_to_column(result.move_mask), 3);
    }

    #[test]
    fn search_rejects_positions_with_no_moves() {
        let moves = "1".repeat(6) + &"2".repeat(6) + &"3".repeat(6) + &"4".repeat(6)
            + &"5".repeat(6) + &"6".repeat(6) + &"7".repeat(6);
        let pos = Position::from_moves(&moves);
        if let Ok(pos) = pos {
            if pos.valid_move_mask() == 0 {
                let mut engine = Engine::new();
                assert_eq!(engine.search(&pos, false), Err(EngineError::NoValidMoves));
            }
        }
    }

    #[test]
    fn reset_clears_the_table() {
        let pos = Position::from_moves("4").unwrap();
        let mut engine = Engine::new();
        engine.search(&pos, false).unwrap();
        engine.reset();
        assert_eq!(engine.table.fill_fraction(), 0.0);
    }
}
