//! Manual tool for running the statistical move-ordering and search-efficiency checks outside of
//! `cargo test -- --ignored`.
//!
//! Mirrors the original engine's `Testing::TestMoveEval` and `Testing::TestEfficiency`, which were
//! invoked directly from `main` rather than gated behind a test runner.

use std::time::Instant;

use connect_four_solver::testing::{move_ordering_quality, search_efficiency};
use connect_four_solver::TranspositionTable;

const MOVE_EVAL_DEPTHS: [usize; 3] = [18, 22, 25];
const EFFICIENCY_DEPTHS: [usize; 3] = [16, 20, 25];
const SAMPLES: usize = 50;

fn main() {
    println!("Running move eval test...");
    let start = Instant::now();
    let mut table = TranspositionTable::new();
    for (depth, frac) in move_ordering_quality(&mut table, &MOVE_EVAL_DEPTHS, SAMPLES) {
        println!(" > Depth {depth}, guessed {:.1}%", frac * 100.0);
    }
    println!(" Done in {:.2}s", start.elapsed().as_secs_f64());

    println!("Running overall efficiency test...");
    let start = Instant::now();
    let mut table = TranspositionTable::new();
    for (depth, score, avg_searched, table_hit_frac) in
        search_efficiency(&mut table, &EFFICIENCY_DEPTHS, SAMPLES)
    {
        println!(
            " > Depth {depth}, score: {score:.3}, avg searched: {avg_searched}, table hit frac: {table_hit_frac:.3}"
        );
    }
    println!(" Done in {:.2}s", start.elapsed().as_secs_f64());
}
