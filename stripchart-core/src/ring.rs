//! Circular Index Arithmetic for the Chart Ring
//!
//! The ring buffer is driven by a small family of wrapping indices:
//!
//! ```text
//! ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//! │  0  │  1  │  2  │  3  │  4  │  5  │  6  │  7  │
//! └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!          ↑     ↑     ↑                 ↑     ↑
//!        look  extr. look              prev  insertion
//!        behind      ahead             insertion
//! ```
//!
//! The producer owns `insertion`/`prev_insertion`; the consumer owns
//! `extraction` and its two look pointers. `look_ahead` and `look_behind`
//! are derived, not independent: after every index-changing operation they
//! equal `extraction ± 1 (mod N)`. Keeping them materialized (rather than
//! recomputing at each flag probe) mirrors how the consumer uses them: the
//! forward probe reads `look_ahead` on every poll.
//!
//! This module is pure index arithmetic. Flag mutation and sample movement
//! belong to the buffer that owns the storage.

/// The wrapping index set over a fixed-capacity ring.
#[derive(Debug, Clone)]
pub struct IndexSet {
    capacity: usize,
    insertion: usize,
    prev_insertion: usize,
    extraction: usize,
    look_ahead: usize,
    look_behind: usize,
}

impl IndexSet {
    /// Create an index set for a ring of `capacity` records.
    ///
    /// Capacity must be at least 2 (enforced upstream by the buffer
    /// configuration, which clamps rather than rejects).
    pub fn new(capacity: usize) -> Self {
        let mut set = Self {
            capacity,
            insertion: 0,
            prev_insertion: 0,
            extraction: 0,
            look_ahead: 0,
            look_behind: 0,
        };
        set.reset();
        set
    }

    /// Return all pointers to their power-on positions.
    pub fn reset(&mut self) {
        self.insertion = 0;
        self.prev_insertion = self.capacity - 1;
        self.extraction = 0;
        self.recompute_looks();
    }

    fn wrap_inc(&self, i: usize) -> usize {
        (i + 1) % self.capacity
    }

    fn wrap_dec(&self, i: usize) -> usize {
        (i + self.capacity - 1) % self.capacity
    }

    fn recompute_looks(&mut self) {
        self.look_ahead = self.wrap_inc(self.extraction);
        self.look_behind = self.wrap_dec(self.extraction);
    }

    /// Ring capacity in records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index currently receiving peak-hold updates.
    pub fn insertion(&self) -> usize {
        self.insertion
    }

    /// Index committed by the most recent insertion advance.
    pub fn prev_insertion(&self) -> usize {
        self.prev_insertion
    }

    /// Index last delivered to the consumer as "current".
    pub fn extraction(&self) -> usize {
        self.extraction
    }

    /// One slot ahead of the extraction point.
    pub fn look_ahead(&self) -> usize {
        self.look_ahead
    }

    /// One slot behind the extraction point.
    pub fn look_behind(&self) -> usize {
        self.look_behind
    }

    /// Step the insertion point forward one slot.
    pub fn advance_insertion(&mut self) {
        self.prev_insertion = self.insertion;
        self.insertion = self.wrap_inc(self.insertion);
    }

    /// Step the insertion point back one slot, the inverse of
    /// [`advance_insertion`](Self::advance_insertion).
    pub fn retract_insertion(&mut self) {
        self.insertion = self.wrap_dec(self.insertion);
        self.prev_insertion = self.wrap_dec(self.insertion);
    }

    /// Step the extraction point forward one slot.
    pub fn advance_extraction(&mut self) {
        self.extraction = self.look_ahead;
        self.recompute_looks();
    }

    /// Step the extraction point back one slot.
    pub fn retract_extraction(&mut self) {
        self.extraction = self.look_behind;
        self.recompute_looks();
    }
}
