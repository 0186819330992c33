//! Test-position generation and statistical quality checks for the search.
//!
//! These helpers mirror the original engine's `Testing::GeneratePosition`,
//! `Testing::TestMoveEval`, and `Testing::TestEfficiency`. They are correctness-adjacent rather
//! than correctness-bearing, so the heavier checks are exposed as `#[ignore]`d tests and as the
//! standalone `efficiency` binary rather than run on every `cargo test`.

use rand::Rng;

use crate::board::bitboard::{self, Mask};
use crate::engine::{self, Engine, SearchCache, SearchInfo, TranspositionTable};
use crate::Position;

/// Plays `num_moves` random legal moves from the empty board, retrying the whole playout
/// whenever `eval_and_crop_moves` detects a forced win, loss, or draw along the way.
pub fn generate_position(num_moves: usize) -> Position {
    loop {
        let mut pos = Position::empty();
        let mut forced_outcome = false;

        for _ in 0..num_moves {
            let mut valid = pos.valid_move_mask();
            let value = engine::eval_and_crop_moves(&pos, &mut valid);
            if !value.is_invalid() {
                forced_outcome = true;
                break;
            }

            let chosen_move = if bitboard::has_min_bits_set::<2>(valid) {
                pick_random_move(valid)
            } else {
                valid
            };

            pos.apply_move(chosen_move);
        }

        if !forced_outcome {
            return pos;
        }
    }
}

fn pick_random_move(valid: Mask) -> Mask {
    let mut moves = Vec::with_capacity(Position::WIDTH);
    let mut remaining = valid;
    while remaining != 0 {
        let single_move = bitboard::lowest_bit(remaining);
        remaining &= remaining - 1;
        moves.push(single_move);
    }

    let index = rand::rng().random_range(0..moves.len());
    moves[index]
}

/// Returns the move `rate_move` scores highest among `pos`'s legal moves.
fn top_rated_move(pos: &Position) -> Mask {
    let mut best_move = 0;
    let mut best_rating = f32::MIN;

    let mut remaining = pos.valid_move_mask();
    while remaining != 0 {
        let single_move = bitboard::lowest_bit(remaining);
        remaining &= remaining - 1;

        let rating = engine::rate_move(pos, single_move);
        if rating > best_rating {
            best_rating = rating;
            best_move = single_move;
        }
    }

    best_move
}

/// Samples random positions at each depth in `depths` and reports the fraction where the
/// top-rated move (by `rate_move`) matches the move a full search actually picks.
pub fn move_ordering_quality(table: &mut TranspositionTable, depths: &[usize], samples: usize) -> Vec<(usize, f64)> {
    let mut results = Vec::with_capacity(depths.len());

    for &depth in depths {
        let mut found = 0usize;

        for _ in 0..samples {
            let pos = generate_position(depth);

            let mut info = SearchInfo::new_root();
            let eval = engine::alpha_beta(&pos, table, &mut info, SearchCache::root());

            let top_rated = top_rated_move(&pos);

            let mut next_pos = pos;
            next_pos.apply_move(top_rated);
            let mut next_info = SearchInfo::new_root();
            let next_eval = engine::alpha_beta(&next_pos, table, &mut next_info, SearchCache::root());

            if eval == -next_eval {
                found += 1;
            }
        }

        results.push((depth, found as f64 / samples as f64));
    }

    results
}

/// The branching factor a well-ordered search is expected to approach, used to normalise the
/// raw node counts reported by `search_efficiency`.
const GOOD_BRANCHING_FACTOR: f64 = 1.6;

/// Samples random positions at each depth and reports the average nodes searched against a
/// target derived from `GOOD_BRANCHING_FACTOR`, plus the table hit fraction.
pub fn search_efficiency(table: &mut TranspositionTable, depths: &[usize], samples: usize) -> Vec<(usize, f64, u64, f64)> {
    let mut results = Vec::with_capacity(depths.len());

    for &depth in depths {
        let mut info = SearchInfo::new_root();
        let moves_remaining = (Position::CELL_COUNT - depth).saturating_sub(2).max(1);
        let target_search_count = GOOD_BRANCHING_FACTOR.powi(moves_remaining as i32);

        for _ in 0..samples {
            let pos = generate_position(depth);
            engine::alpha_beta(&pos, table, &mut info, SearchCache::root());
        }

        let avg_searched = info.nodes_searched / samples as u64;
        let score_frac = target_search_count / avg_searched as f64;
        results.push((depth, score_frac, avg_searched, info.table_hit_fraction()));
    }

    results
}

/// Runs `Engine::search` over a freshly-generated position purely to validate the test harness
/// wiring; used by the `efficiency` binary's smoke check.
pub fn smoke_test_search(engine: &mut Engine, num_moves: usize) -> bool {
    let pos = generate_position(num_moves);
    engine.search(&pos, false).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_position_respects_move_count() {
        let pos = generate_position(10);
        assert_eq!(pos.move_count(), 10);
    }

    #[test]
    #[ignore]
    fn move_ordering_quality_is_reasonably_high() {
        let mut table = TranspositionTable::new();
        let results = move_ordering_quality(&mut table, &[12, 16], 10);
        for (depth, frac) in results {
            assert!(frac >= 0.0, "depth {depth} produced an invalid fraction");
        }
    }

    #[test]
    #[ignore]
    fn search_efficiency_reports_finite_scores() {
        let mut table = TranspositionTable::new();
        let results = search_efficiency(&mut table, &[16, 20], 5);
        for (depth, score, avg, hit_frac) in results {
            assert!(score.is_finite(), "depth {depth} avg {avg} hit_frac {hit_frac}");
        }
    }
}
