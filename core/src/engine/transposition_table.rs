//! A transposition table implementation for caching exact and bounded search results.

use crate::board::bitboard::Mask;
use crate::engine::value::Value;
use crate::Position;

#[cfg(feature = "debug_collision_check")]
use crate::EngineError;

/// A single entry in the transposition table.
#[derive(Debug, Default, Copy, Clone)]
pub struct TTEntry {
    /// The full 64-bit hash used to verify the entry. Zero marks an empty slot.
    pub hash: u64,
    /// The best move found for this position, or 0 if none was recorded.
    pub best_move: Mask,
    /// The value stored for this position.
    pub value: Value,
    /// If true, `value` is a lower bound (search exited on a beta cutoff); if false, `value` is
    /// the exact game-theoretic value.
    pub is_cut_node: bool,
}

/// A transposition table that caches results from previous searches to avoid re-exploring the
/// same position twice.
///
/// Fixed-size, direct-mapped, with single-slot replacement: every store overwrites whatever
/// previously occupied its slot.
#[derive(Debug)]
pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    #[cfg(feature = "debug_collision_check")]
    debug_positions: Vec<Option<Position>>,
}

impl TranspositionTable {
    /// The number of slots in the table. A power of two for fast modular indexing.
    pub const SIZE: usize = 1 << 23;

    /// Creates a new, empty transposition table, allocating space for all entries.
    pub fn new() -> TranspositionTable {
        Self::default()
    }

    /// Computes the table slot for a given hash.
    #[inline(always)]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) % Self::SIZE
    }

    /// Computes a position's lookup hash.
    ///
    /// Combines both team masks through a MurmurHash3-style finalizer with distinct constants
    /// per team, additionally folding in each team's horizontally-flipped mask so that a position
    /// and its mirror image hash identically.
    pub fn hash_position(pos: &Position) -> u64 {
        use crate::board::bitboard::flip_x;

        let h0 = fast_hash(pos.team_mask(0), false);
        let h1 = fast_hash(pos.team_mask(1), true);
        let h0_flipped = fast_hash(flip_x(pos.team_mask(0)), false);
        let h1_flipped = fast_hash(flip_x(pos.team_mask(1)), true);

        (h0 ^ h1) ^ (h0_flipped ^ h1_flipped)
    }

    /// Returns the slot a given hash maps to, regardless of whether it currently matches.
    ///
    /// Callers must check `entry.hash == hash` before trusting the contents as a hit.
    pub fn find(&self, hash: u64) -> &TTEntry {
        &self.entries[self.index(hash)]
    }

    /// Stores an entry at the slot for `hash`, overwriting whatever was there.
    pub fn store(&mut self, hash: u64, best_move: Mask, value: Value, is_cut_node: bool) {
        let index = self.index(hash);
        self.entries[index] = TTEntry { hash, best_move, value, is_cut_node };
    }

    /// Stores an entry, additionally recording the full position when `debug_collision_check` is
    /// enabled so a later probe can detect a genuine hash collision.
    #[cfg(feature = "debug_collision_check")]
    pub fn store_checked(&mut self, hash: u64, best_move: Mask, value: Value, is_cut_node: bool, pos: &Position) {
        let index = self.index(hash);
        self.store(hash, best_move, value, is_cut_node);
        self.debug_positions[index] = Some(*pos);
    }

    /// Probes the table, returning `Err(EngineError::HashCollisionDetected)` if the slot holds a
    /// different position than the one being probed for. Only available with the
    /// `debug_collision_check` feature, since it requires storing the full position in every
    /// slot.
    #[cfg(feature = "debug_collision_check")]
    pub fn probe_checked(&self, hash: u64, pos: &Position) -> Result<&TTEntry, EngineError> {
        let entry = self.find(hash);
        if entry.hash == hash {
            if let Some(stored) = self.debug_positions[self.index(hash)] {
                if stored != *pos {
                    return Err(EngineError::HashCollisionDetected { hash });
                }
            }
        }
        Ok(entry)
    }

    /// Clears every slot in the table.
    pub fn reset(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = TTEntry::default());
        #[cfg(feature = "debug_collision_check")]
        self.debug_positions.iter_mut().for_each(|p| *p = None);
    }

    /// Returns the fraction of slots that currently hold an entry, for telemetry.
    pub fn fill_fraction(&self) -> f64 {
        let filled = self.entries.iter().filter(|e| e.hash != 0).count();
        filled as f64 / Self::SIZE as f64
    }
}

/// Default constructor for the `TranspositionTable` struct.
impl Default for TranspositionTable {
    fn default() -> TranspositionTable {
        TranspositionTable {
            entries: vec![TTEntry::default(); Self::SIZE],
            #[cfg(feature = "debug_collision_check")]
            debug_positions: vec![None; Self::SIZE],
        }
    }
}

/// MurmurHash3-style 64-bit finalizer, ported from the original engine's `FastHash`.
fn fast_hash(mut val: u64, alt: bool) -> u64 {
    const CONST_1: u64 = 0xff51afd7ed558ccd;
    const CONST_2: u64 = 0xc4ceb9fe1a85ec53;

    val ^= val >> 33;
    val = val.wrapping_mul(if alt { CONST_2 } else { CONST_1 });
    val ^= val >> 33;
    val = val.wrapping_mul(if alt { CONST_1 } else { CONST_2 });
    val ^= val >> 33;
    val
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_probe_finds_the_same_entry() {
        let mut table = TranspositionTable::new();
        let pos = Position::from_moves("4455").unwrap();
        let hash = TranspositionTable::hash_position(&pos);
        table.store(hash, 0b1000, Value::new(1, 3), false);

        let entry = table.find(hash);
        assert_eq!(entry.hash, hash);
        assert_eq!(entry.best_move, 0b1000);
        assert_eq!(entry.value, Value::new(1, 3));
        assert!(!entry.is_cut_node);
    }

    #[test]
    fn mirrored_positions_hash_identically() {
        let pos = Position::from_moves("4").unwrap();
        let mirrored = pos.flip_x();
        assert_eq!(
            TranspositionTable::hash_position(&pos),
            TranspositionTable::hash_position(&mirrored)
        );
    }

    #[test]
    fn reset_clears_every_slot() {
        let mut table = TranspositionTable::new();
        let pos = Position::from_moves("1").unwrap();
        let hash = TranspositionTable::hash_position(&pos);
        table.store(hash, 1, Value::new(0, 0), false);
        assert_ne!(table.fill_fraction(), 0.0);
        table.reset();
        assert_eq!(table.fill_fraction(), 0.0);
    }
}
