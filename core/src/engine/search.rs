//! Negamax alpha-beta search over `Position`, backed by the transposition table and insta-solver.

use crate::board::bitboard::{self, Mask};
use crate::engine::eval;
use crate::engine::insta_solver::{self, InstaKind};
use crate::engine::transposition_table::TranspositionTable;
use crate::engine::value::Value;
use crate::Position;

/// Running statistics gathered over the course of a single root search.
#[derive(Debug, Default, Clone)]
pub struct SearchInfo {
    /// The best move found at each recursion depth, indexed by `SearchCache::depth`.
    pub best_move: Vec<Mask>,
    pub nodes_searched: u64,
    pub table_searches: u64,
    pub table_hits: u64,
    pub pruned: u64,
}

impl SearchInfo {
    pub fn new_root() -> SearchInfo {
        SearchInfo {
            best_move: vec![0; Position::CELL_COUNT + 1],
            ..Default::default()
        }
    }

    /// Fraction of table probes that landed on a matching entry, for logging.
    pub fn table_hit_fraction(&self) -> f64 {
        if self.table_searches == 0 {
            0.0
        } else {
            self.table_hits as f64 / self.table_searches as f64
        }
    }
}

/// The alpha-beta window and recursion depth threaded through the search.
#[derive(Debug, Copy, Clone)]
pub struct SearchCache {
    pub alpha: Value,
    pub beta: Value,
    pub depth: usize,
}

impl SearchCache {
    pub fn root() -> SearchCache {
        SearchCache { alpha: Value::new(-1, 0), beta: Value::new(1, 0), depth: 0 }
    }

    /// Narrows the window for a child node: negated and swapped, one ply deeper.
    fn progress_depth(self) -> SearchCache {
        SearchCache { alpha: -self.beta, beta: -self.alpha, depth: self.depth + 1 }
    }
}

/// Recursively evaluates `pos` under the alpha-beta window in `cache`, returning the
/// game-theoretic value from the perspective of the side to move.
pub fn alpha_beta(
    pos: &Position,
    table: &mut TranspositionTable,
    info: &mut SearchInfo,
    cache: SearchCache,
) -> Value {
    info.nodes_searched += 1;

    let mut valid = pos.valid_move_mask();
    let mut best = eval::eval_and_crop_moves(pos, &mut valid);
    if !best.is_invalid() {
        return best;
    }
    // Seed with the invalid sentinel rather than a real loss value: its out-of-range sign
    // compares below every real value, so the first child move always updates `best`.

    let use_table = pos.move_count() < Position::CELL_COUNT - 8;

    let mut hash = 0u64;
    let mut table_best_move: Mask = 0;
    if use_table {
        hash = TranspositionTable::hash_position(pos);
        info.table_searches += 1;
        let entry = *table.find(hash);
        if entry.hash == hash {
            info.table_hits += 1;
            table_best_move = entry.best_move;

            if entry.value >= cache.beta {
                return entry.value;
            } else if !entry.is_cut_node {
                return entry.value;
            }
        }
    }

    if cache.depth > 1 {
        let solved = insta_solver::solve(pos);
        let should_return = match solved.kind {
            InstaKind::LowerBound => solved.value >= cache.beta,
            InstaKind::UpperBound => solved.value < cache.alpha,
            InstaKind::Exact => true,
            InstaKind::None => false,
        };
        if should_return {
            return solved.value;
        }
    }

    if pos.is_symmetrical() {
        let mut sided_mask = 0;
        for x in 0..=(Position::WIDTH / 2) {
            sided_mask |= bitboard::column_mask(x);
        }
        valid &= sided_mask;
        if table_best_move != 0 && table_best_move & sided_mask == 0 {
            table_best_move = bitboard::flip_x(table_best_move);
        }
    }

    let mut rated_moves: Vec<(Mask, f32)> = Vec::with_capacity(Position::WIDTH);
    let mut remaining = valid;
    while remaining != 0 {
        let single_move = bitboard::lowest_bit(remaining);
        remaining &= remaining - 1;

        let mut rating = eval::rate_move(pos, single_move);
        if single_move == table_best_move {
            rating = f32::MAX;
        }
        rated_moves.push((single_move, rating));
    }

    // Insertion sort descending by rating, stable on ties.
    for i in 1..rated_moves.len() {
        let mut j = i;
        while j > 0 && rated_moves[j].1 > rated_moves[j - 1].1 {
            rated_moves.swap(j, j - 1);
            j -= 1;
        }
    }

    let mut best_move: Mask = 0;
    let mut cache = cache;
    for (single_move, _) in rated_moves {
        let mut next_pos = *pos;
        next_pos.apply_move(single_move);

        let mut next_value = alpha_beta(&next_pos, table, info, cache.progress_depth());
        next_value = -next_value;
        next_value = next_value.increment_depth();

        if next_value >= cache.beta {
            best = next_value;
            best_move = single_move;
            info.pruned += 1;
            break;
        }

        if next_value > best {
            best = next_value;
            best_move = single_move;
            if next_value > cache.alpha {
                cache.alpha = next_value;
            }
        }
    }

    let hit_cutoff = best >= cache.beta;

    if use_table {
        table.store(hash, best_move, best, hit_cutoff);
    }

    info.best_move[cache.depth] = best_move;

    best
}

/// Follows the transposition table's recorded best moves from `pos` (after `first_move` has been
/// applied) to reconstruct the principal variation found by the last search.
pub fn find_principal_variation(table: &TranspositionTable, pos: &Position, first_move: Mask) -> Vec<Mask> {
    let mut result = vec![first_move];

    let mut current = *pos;
    current.apply_move(first_move);

    loop {
        let hash = TranspositionTable::hash_position(&current);
        let entry = table.find(hash);
        if entry.hash != hash || entry.best_move == 0 {
            break;
        }

        result.push(entry.best_move);
        current.apply_move(entry.best_move);
    }

    result
}

/// Counts the number of leaves in the full move tree rooted at `pos` to `depth` plies, treating an
/// immediately-winning move as a single leaf rather than expanding it further.
pub fn perft(pos: &Position, depth: usize) -> u64 {
    let valid_moves = pos.valid_move_mask();

    if depth <= 1 {
        return bitboard::popcount(valid_moves) as u64;
    }

    let win_mask = pos.win_mask(pos.side_to_move());
    let mut count = 0;
    let mut remaining = valid_moves;
    while remaining != 0 {
        let single_move = bitboard::lowest_bit(remaining);
        remaining &= remaining - 1;

        if win_mask & single_move != 0 {
            count += 1;
            continue;
        }

        let mut next_pos = *pos;
        next_pos.apply_move(single_move);
        count += perft(&next_pos, depth - 1);
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perft_matches_known_connect_four_counts() {
        let pos = Position::empty();
        assert_eq!(perft(&pos, 1), 7);
        assert_eq!(perft(&pos, 2), 49);
        assert_eq!(perft(&pos, 3), 238);
    }

    #[test]
    fn alpha_beta_finds_immediate_win() {
        let pos = Position::from_moves("444443").unwrap();
        let mut table = TranspositionTable::new();
        let mut info = SearchInfo::new_root();
        let value = alpha_beta(&pos, &mut table, &mut info, SearchCache::root());
        assert_eq!(value.sign, 1);
    }

    #[test]
    fn alpha_beta_detects_forced_loss() {
        let pos = Position::from_moves("4444").unwrap();
        let mut table = TranspositionTable::new();
        let mut info = SearchInfo::new_root();
        let value = alpha_beta(&pos, &mut table, &mut info, SearchCache::root());
        assert_eq!(value.sign, -1);
    }

    #[test]
    fn principal_variation_starts_with_first_move() {
        let pos = Position::from_moves("4444").unwrap();
        let mut table = TranspositionTable::new();
        let mut info = SearchInfo::new_root();
        alpha_beta(&pos, &mut table, &mut info, SearchCache::root());

        let valid = pos.valid_move_mask();
        let first_move = bitboard::lowest_bit(valid);
        let pv = find_principal_variation(&table, &pos, first_move);
        assert_eq!(pv[0], first_move);
    }
}
