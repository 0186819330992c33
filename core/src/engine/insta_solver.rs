//! O(1) detectors for structurally trivial Connect Four subpositions.
//!
//! Ported from the original engine's `InstaSolver`, which short-circuits two classes of
//! position that would otherwise need a full search: `ClaimEven`, a positional theorem that
//! lets the second player force at least a draw, and isolated columns, where the remaining open
//! columns are spaced far enough apart that no cross-column alignment is possible.

use crate::board::bitboard::{self, Mask};
use crate::engine::value::Value;
use crate::Position;

/// The kind of bound an `InstaResult` represents.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InstaKind {
    /// No solution was found.
    None,
    /// The turn player can guarantee at least this outcome.
    LowerBound,
    /// The opponent can guarantee at least this outcome.
    UpperBound,
    /// The guaranteed outcome of the position, assuming perfect play.
    Exact,
}

/// The result of probing the insta-solver against a position.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InstaResult {
    pub kind: InstaKind,
    pub value: Value,
}

impl InstaResult {
    const NONE: InstaResult = InstaResult { kind: InstaKind::None, value: Value::INVALID };
}

/// Runs each detector in order, returning the first one that fires.
pub fn solve(pos: &Position) -> InstaResult {
    let result = check_claim_even(pos);
    if result.kind != InstaKind::None {
        return result;
    }

    check_isolated_columns(pos)
}

/// Returns the lowest set bit of a byte-sized column mask, as a byte mask.
fn lowest_bit_u8(val: u8) -> u8 {
    val & val.wrapping_neg()
}

/// Detects a ClaimEven position: every column has even occupancy and it's the first player's
/// turn. The second player can then "claim" every even-parity empty square, guaranteeing at
/// least a draw (and sometimes forcing a win).
fn check_claim_even(pos: &Position) -> InstaResult {
    if pos.side_to_move() != 0 {
        return InstaResult::NONE;
    }

    let combined = pos.combined_mask();
    for x in 0..Position::WIDTH {
        if bitboard::popcount(bitboard::column(combined, x) as Mask) % 2 != 0 {
            return InstaResult::NONE;
        }
    }

    let playables = [
        (pos.team_mask(0) | bitboard::EVEN_ROW_MASK) & !pos.team_mask(1),
        (pos.team_mask(1) | bitboard::ODD_ROW_MASK) & !pos.team_mask(0),
    ];

    let self_win = playables[0] & bitboard::win_mask(playables[0]);
    let opp_win = playables[1] & bitboard::win_mask(playables[1]);

    for x in 0..Position::WIDTH {
        let self_win_column = bitboard::column(self_win, x);
        let opp_win_column = bitboard::column(opp_win, x);

        if self_win_column != 0 {
            if opp_win_column == 0 {
                // We could win in this column first: ClaimEven does not apply.
                return InstaResult::NONE;
            }
            if lowest_bit_u8(self_win_column) <= lowest_bit_u8(opp_win_column) {
                // We'd reach our winning square before the opponent reaches theirs.
                return InstaResult::NONE;
            }
        }
    }

    let empty_squares = bitboard::popcount(bitboard::BOARD_MASK & !combined);
    if opp_win != 0 {
        InstaResult {
            kind: InstaKind::Exact,
            value: Value::new(-1, empty_squares as u8),
        }
    } else {
        InstaResult { kind: InstaKind::UpperBound, value: Value::new(0, 0) }
    }
}

struct IsolatedColumn {
    team_threats: [u8; 2],
}

/// Detects positions where the remaining open columns are spaced far enough apart (at least 4
/// columns, the connect length) that no cross-column alignment is possible, allowing each open
/// column to be solved independently.
fn check_isolated_columns(pos: &Position) -> InstaResult {
    const MAX_OPEN_COLUMNS: usize = Position::WIDTH / 4 + 1;
    const MIN_SPACING: i32 = 4;

    let combined = pos.combined_mask();
    let valid_moves = pos.valid_move_mask();

    let open_columns = bitboard::popcount(valid_moves) as usize;
    if open_columns == 0 || open_columns > MAX_OPEN_COLUMNS {
        return InstaResult::NONE;
    }

    let mut columns: Vec<IsolatedColumn> = Vec::with_capacity(MAX_OPEN_COLUMNS);
    let mut last_open_x: i32 = -MIN_SPACING;

    for x in 0..Position::WIDTH {
        let column_combined = bitboard::column(combined, x);
        let open_space = !column_combined & (bitboard::column(bitboard::BOARD_MASK, x));
        if open_space == 0 {
            continue;
        }

        if (x as i32) - last_open_x < MIN_SPACING {
            return InstaResult::NONE;
        }

        let height = bitboard::popcount(open_space as Mask);
        let start_height = Position::HEIGHT as u32 - height;
        let team_threats = [
            bitboard::column(pos.win_mask(0), x) >> start_height,
            bitboard::column(pos.win_mask(1), x) >> start_height,
        ];

        columns.push(IsolatedColumn { team_threats });
        last_open_x = x as i32;
    }

    let any_threats = columns.iter().any(|c| c.team_threats[0] != 0 || c.team_threats[1] != 0);
    if !any_threats {
        return InstaResult { kind: InstaKind::Exact, value: Value::new(0, 0) };
    }

    if columns.len() == 1 {
        let column = &columns[0];
        let first_threats = column.team_threats[0];
        let second_threats = column.team_threats[1];

        let winner = match (first_threats != 0, second_threats != 0) {
            (false, false) => return InstaResult { kind: InstaKind::Exact, value: Value::new(0, 0) },
            (true, false) => Some(0),
            (false, true) => Some(1),
            (true, true) => {
                if lowest_bit_u8(first_threats) <= lowest_bit_u8(second_threats) {
                    Some(0)
                } else {
                    Some(1)
                }
            }
        };

        if let Some(winning_team) = winner {
            let sign = if winning_team == pos.side_to_move() { 1 } else { -1 };
            return InstaResult { kind: InstaKind::Exact, value: Value::new(sign, 0) };
        }
    }

    InstaResult::NONE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_is_not_solved_by_claim_even_since_no_threats() {
        let pos = Position::empty();
        let result = check_claim_even(&pos);
        // Every column has even (zero) occupancy and it's player 0's turn, so the detector
        // applies; with no stones anywhere, neither side has any threat yet so it reports an
        // upper-bound draw rather than an exact win/loss.
        assert_eq!(result.kind, InstaKind::UpperBound);
    }

    #[test]
    fn claim_even_does_not_apply_on_odd_occupancy() {
        let pos = Position::from_moves("4").unwrap();
        assert_eq!(check_claim_even(&pos).kind, InstaKind::None);
    }

    #[test]
    fn solve_tries_claim_even_before_isolated_columns() {
        let pos = Position::empty();
        let result = solve(&pos);
        assert_eq!(result.kind, InstaKind::UpperBound);
    }
}
