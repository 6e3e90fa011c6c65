//! Peak-Hold Ring Buffer Shared by One Producer and One Consumer
//!
//! ## Overview
//!
//! This is the data engine under every scrolling chart: a fixed-capacity ring
//! of records written by the acquisition thread and drained by the rendering
//! thread.
//!
//! ```text
//! Acquisition (producer)                    Rendering (consumer)
//!        ↓                                        ↓
//!   store / advance / erase ──→ ring ←── poll get_new_data
//!        ↓                                        ↓
//!   peak-hold capture                    Forward / Reverse steps
//! ```
//!
//! The producer parks on one record (the insertion point) and hammers it with
//! peak-hold stores (many candidate samples per physical position, only the
//! most extreme kept), then advances once per position. The consumer walks
//! behind it one record at a time, and walks *backwards* when the producer
//! rolls positions back, so the on-screen trace can be un-drawn.
//!
//! ## Synchronization
//!
//! One mutex per buffer serializes every mutating operation (both roles);
//! critical sections are O(1) or O(record width), so contention is rare and
//! short. Sample and flag storage are per-slot atomics, which buys two
//! things:
//!
//! - mutating methods take `&self`, so one buffer can sit behind an `Arc`
//!   under the producer and consumer handles;
//! - the read-only scans ([`find_min_value`](ChartBuffer::find_min_value),
//!   the repaint traversal) read *without* the mutex. They may observe a
//!   record mid-advance; recency is traded for throughput, and the trade is
//!   intentional. Every load is still a whole-word atomic, never a torn read.
//!
//! Producers publish a record's samples with a Release store of its flag
//! word; readers load the flag word with Acquire before touching samples.
//! The one ordering contract that matters to the screen: pending erasures
//! are always delivered before newer forward commits.

use core::sync::atomic::{AtomicI32, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::config::{BufferConfig, SEGMENT_DEBOUNCE};
use crate::flags::FlagWord;
use crate::record::{DataStep, Datum, PeakDirection, RecordShape, SampleVec};
use crate::ring::IndexSet;

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Running operation counters for one buffer.
///
/// Tracked with relaxed atomics so reading them never perturbs the data
/// path. Counters are cumulative across [`reset_all`](ChartBuffer::reset_all).
#[derive(Debug, Default)]
pub struct BufferStats {
    /// Store calls accepted (first store or peak update).
    pub stores: AtomicU32,
    /// Stores that overwrote an in-process record with a more extreme value.
    pub peak_updates: AtomicU32,
    /// Insertion-point advances.
    pub advances: AtomicU32,
    /// Producer-side rollbacks.
    pub erasures: AtomicU32,
    /// Forward steps delivered to the consumer.
    pub forward_steps: AtomicU32,
    /// Reverse steps delivered to the consumer.
    pub reverse_steps: AtomicU32,
}

impl BufferStats {
    const fn new() -> Self {
        Self {
            stores: AtomicU32::new(0),
            peak_updates: AtomicU32::new(0),
            advances: AtomicU32::new(0),
            erasures: AtomicU32::new(0),
            forward_steps: AtomicU32::new(0),
            reverse_steps: AtomicU32::new(0),
        }
    }

    /// Copy the counters into a plain value.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            stores: self.stores.load(Ordering::Relaxed),
            peak_updates: self.peak_updates.load(Ordering::Relaxed),
            advances: self.advances.load(Ordering::Relaxed),
            erasures: self.erasures.load(Ordering::Relaxed),
            forward_steps: self.forward_steps.load(Ordering::Relaxed),
            reverse_steps: self.reverse_steps.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BufferStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatsSnapshot {
    /// Store calls accepted.
    pub stores: u32,
    /// Peak-hold overwrites.
    pub peak_updates: u32,
    /// Insertion-point advances.
    pub advances: u32,
    /// Producer-side rollbacks.
    pub erasures: u32,
    /// Forward steps delivered.
    pub forward_steps: u32,
    /// Reverse steps delivered.
    pub reverse_steps: u32,
}

/// Index state and segment bookkeeping guarded by the buffer mutex.
struct BufferState {
    idx: IndexSet,
    /// Insertion advances since the last start marker; drives the debounce.
    advances_since_start: usize,
    /// Net consumer steps inside the current segment.
    consumer_segment_len: usize,
    segment_start: Option<usize>,
    segment_end: Option<usize>,
}

/// The shared ring. Not exposed directly: producer and consumer API surfaces
/// live on the [`Recorder`](crate::handles::Recorder) and
/// [`Painter`](crate::handles::Painter) handles.
pub(crate) struct ChartBuffer {
    shape: RecordShape,
    direction: PeakDirection,
    capacity: usize,
    width: usize,
    /// Record-major sample storage: record `i` occupies
    /// `samples[i*width .. (i+1)*width]`.
    samples: Box<[AtomicI32]>,
    /// One packed flag word per record.
    flags: Box<[AtomicU32]>,
    /// Repaint cursor. Consumer-private, deliberately outside the mutex so
    /// repaint never contends with acquisition.
    repaint: AtomicUsize,
    state: Mutex<BufferState>,
    stats: BufferStats,
}

impl ChartBuffer {
    pub(crate) fn new(config: BufferConfig) -> Self {
        let capacity = config.capacity();
        let width = config.width();

        let samples: Box<[AtomicI32]> = (0..capacity * width)
            .map(|_| AtomicI32::new(0))
            .collect();
        let flags: Box<[AtomicU32]> = (0..capacity).map(|_| AtomicU32::new(0)).collect();

        let buf = Self {
            shape: config.shape(),
            direction: config.direction(),
            capacity,
            width,
            samples,
            flags,
            repaint: AtomicUsize::new(0),
            state: Mutex::new(BufferState {
                idx: IndexSet::new(capacity),
                advances_since_start: 0,
                consumer_segment_len: 0,
                segment_start: None,
                segment_end: None,
            }),
            stats: BufferStats::new(),
        };
        buf.seed_origin();
        buf
    }

    fn state(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().expect("chart buffer state poisoned")
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn shape(&self) -> RecordShape {
        self.shape
    }

    pub(crate) fn direction(&self) -> PeakDirection {
        self.direction
    }

    pub(crate) fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Seed position 0 with the least severe value this direction can hold,
    /// so reads before the first commit are defined and non-alarming.
    fn seed_origin(&self) {
        let seed = self.direction.least_severe();
        for slot in 0..self.width {
            self.samples[slot].store(seed, Ordering::Relaxed);
        }
    }

    /// Zero every pointer and flag and re-seed position 0. The storage
    /// itself is reused; the buffer is never resized after construction.
    pub(crate) fn reset_all(&self) {
        let mut st = self.state();
        st.idx.reset();
        st.advances_since_start = 0;
        st.consumer_segment_len = 0;
        st.segment_start = None;
        st.segment_end = None;

        for word in self.flags.iter() {
            word.store(0, Ordering::Release);
        }
        for slot in self.samples.iter() {
            slot.store(0, Ordering::Relaxed);
        }
        self.repaint.store(0, Ordering::Relaxed);
        self.seed_origin();
    }

    // ---- flag/sample access helpers -------------------------------------

    fn flag_at(&self, index: usize) -> FlagWord {
        FlagWord::from_bits(self.flags[index].load(Ordering::Acquire))
    }

    /// Read-modify-write a flag word. Only called with the state mutex held,
    /// so the load/store pair cannot race another mutator; the Release store
    /// publishes any sample writes made just before it.
    fn update_flag_at(&self, index: usize, f: impl FnOnce(&mut FlagWord)) {
        let mut word = FlagWord::from_bits(self.flags[index].load(Ordering::Relaxed));
        f(&mut word);
        self.flags[index].store(word.bits(), Ordering::Release);
    }

    fn sample_at(&self, index: usize, slot: usize) -> i32 {
        self.samples[index * self.width + slot].load(Ordering::Relaxed)
    }

    fn set_sample_at(&self, index: usize, slot: usize, value: i32) {
        self.samples[index * self.width + slot].store(value, Ordering::Relaxed);
    }

    fn fill_datum_side(&self, index: usize, samples: &mut SampleVec, flags: &mut FlagWord) {
        samples.clear();
        *flags = self.flag_at(index);
        for slot in 0..self.width {
            samples.push(self.sample_at(index, slot)).ok();
        }
    }

    // ---- producer side ---------------------------------------------------

    /// Peak-hold store at the insertion point.
    ///
    /// The first store after an advance always lands unconditionally and
    /// marks the record in-process; later stores overwrite per component
    /// only when strictly more extreme. Returns whether anything changed, so
    /// the acquisition layer can update bookkeeping like "last sub-channel
    /// that produced a peak".
    pub(crate) fn store_at_insertion(&self, values: &[i32]) -> bool {
        if values.is_empty() {
            return false;
        }
        let st = self.state();
        let at = st.idx.insertion();
        let word = FlagWord::from_bits(self.flags[at].load(Ordering::Relaxed));
        let count = values.len().min(self.width);

        if !word.is_in_process() {
            for (slot, &v) in values.iter().take(count).enumerate() {
                self.set_sample_at(at, slot, v);
            }
            self.update_flag_at(at, |w| w.set(FlagWord::IN_PROCESS));
            self.stats.stores.fetch_add(1, Ordering::Relaxed);
            return true;
        }

        let mut changed = false;
        for (slot, &v) in values.iter().take(count).enumerate() {
            if self.direction.is_more_extreme(v, self.sample_at(at, slot)) {
                self.set_sample_at(at, slot, v);
                changed = true;
            }
        }
        if changed {
            // Re-store the unchanged word to publish the sample writes.
            self.flags[at].store(word.bits(), Ordering::Release);
            self.stats.stores.fetch_add(1, Ordering::Relaxed);
            self.stats.peak_updates.fetch_add(1, Ordering::Relaxed);
        }
        changed
    }

    /// Commit the current record and move to the next slot.
    ///
    /// The committed sample values are carried into the new slot: advancing
    /// several times with no intervening store must show repeated valid
    /// data downstream, never stale garbage. Every flag except the erased
    /// carryover is cleared on the new record, which also clears
    /// `IN_PROCESS` so the next store lands unconditionally.
    pub(crate) fn advance_insertion(&self) {
        let mut st = self.state();
        let from = st.idx.insertion();
        // Exactly one record is in process at any time: the bit moves with
        // the insertion point.
        self.update_flag_at(from, |w| {
            w.clear(FlagWord::IN_PROCESS);
            w.set(FlagWord::DATA_VALID);
        });

        st.idx.advance_insertion();
        let to = st.idx.insertion();
        self.update_flag_at(to, |w| *w = w.erased_carryover());
        for slot in 0..self.width {
            self.set_sample_at(to, slot, self.sample_at(from, slot));
        }

        if st.segment_start.is_some() {
            st.advances_since_start += 1;
        }
        self.stats.advances.fetch_add(1, Ordering::Relaxed);
    }

    /// Roll back the record the producer just started.
    ///
    /// The never-committed record at the insertion point loses all flags,
    /// the insertion point steps back, and the record it lands on (the one
    /// committed by the previous advance) is marked erased with everything
    /// else cleared, which is what the consumer reacts to.
    pub(crate) fn erase_at_insertion(&self) {
        let mut st = self.state();
        let abandoned = st.idx.insertion();
        self.flags[abandoned].store(0, Ordering::Release);

        st.idx.retract_insertion();
        let erased = st.idx.insertion();
        self.flags[erased].store(FlagWord::DATA_ERASED, Ordering::Release);

        if st.segment_start.is_some() {
            st.advances_since_start = st.advances_since_start.saturating_sub(1);
        }
        self.stats.erasures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn store_clock_at_insertion(&self, clock: u16) {
        let st = self.state();
        self.update_flag_at(st.idx.insertion(), |w| w.store_clock(clock));
    }

    pub(crate) fn store_threshold_at_insertion(&self, id: u8) {
        let st = self.state();
        self.update_flag_at(st.idx.insertion(), |w| w.store_threshold(id));
    }

    pub(crate) fn store_manual_flag_at_insertion(&self) {
        let st = self.state();
        self.update_flag_at(st.idx.insertion(), |w| w.store_manual_flag());
    }

    pub(crate) fn place_end_mask_marker(&self) {
        let st = self.state();
        self.update_flag_at(st.idx.insertion(), |w| w.set(FlagWord::END_MASK_MARK));
    }

    pub(crate) fn mark_segment_start(&self) {
        let mut st = self.state();
        let at = st.idx.insertion();
        self.update_flag_at(at, |w| w.set(FlagWord::SEGMENT_START));
        st.segment_start = Some(at);
        st.segment_end = None;
        st.advances_since_start = 0;
        st.consumer_segment_len = 0;
        log_debug!("segment start marked at ring index {}", at);
    }

    pub(crate) fn mark_segment_end(&self) {
        let mut st = self.state();
        let at = st.idx.insertion();
        self.update_flag_at(at, |w| w.set(FlagWord::SEGMENT_END));
        st.segment_end = Some(at);
        log_debug!("segment end marked at ring index {}", at);
    }

    // ---- consumer side ---------------------------------------------------

    /// Non-blocking poll: is there a pending erasure or a fresh commit?
    pub(crate) fn new_data_is_ready(&self) -> bool {
        let st = self.state();
        self.flag_at(st.idx.extraction()).is_erased()
            || self.flag_at(st.idx.look_ahead()).is_valid()
    }

    /// One consumer step through the ring.
    ///
    /// Erasure handling takes precedence over forward motion: when erasures
    /// and fresh commits are both pending, every erasure is replayed (and
    /// the picture rolled back) before newer data is shown. That ordering is
    /// what keeps the on-screen undo correct.
    pub(crate) fn get_new_data(&self, datum: &mut Datum) -> DataStep {
        let mut st = self.state();

        let at = st.idx.extraction();
        if self.flag_at(at).is_erased() {
            self.update_flag_at(at, |w| w.clear(FlagWord::DATA_ERASED));
            self.fill_datum_side(at, &mut datum.prev_samples, &mut datum.prev_flags);

            st.idx.retract_extraction();
            let now = st.idx.extraction();
            self.fill_datum_side(now, &mut datum.new_samples, &mut datum.new_flags);

            st.consumer_segment_len = st.consumer_segment_len.saturating_sub(1);
            self.stats.reverse_steps.fetch_add(1, Ordering::Relaxed);
            return DataStep::Reverse;
        }

        let ahead = st.idx.look_ahead();
        if self.flag_at(ahead).is_valid() {
            self.fill_datum_side(at, &mut datum.prev_samples, &mut datum.prev_flags);

            st.idx.advance_extraction();
            let now = st.idx.extraction();
            self.fill_datum_side(now, &mut datum.new_samples, &mut datum.new_flags);

            st.consumer_segment_len += 1;
            self.stats.forward_steps.fetch_add(1, Ordering::Relaxed);
            return DataStep::Forward;
        }

        DataStep::NoNewData
    }

    /// True once the insertion point has advanced [`SEGMENT_DEBOUNCE`]
    /// positions past the last start marker. Debounces spurious markers at
    /// piece edges.
    pub(crate) fn segment_started(&self) -> bool {
        let st = self.state();
        st.segment_start.is_some() && st.advances_since_start >= SEGMENT_DEBOUNCE
    }

    /// Net consumer steps inside the current segment.
    pub(crate) fn segment_length(&self) -> usize {
        self.state().consumer_segment_len
    }

    /// Marked `[start, end)` ring indices of the last segment, if both
    /// markers were placed.
    pub(crate) fn segment_bounds(&self) -> Option<(usize, usize)> {
        let st = self.state();
        match (st.segment_start, st.segment_end) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    pub(crate) fn set_segment_bounds(&self, start: usize, end: usize) {
        let mut st = self.state();
        st.segment_start = Some(start % self.capacity);
        st.segment_end = Some(end % self.capacity);
    }

    /// Stamp `DATA_VALID` over a loaded range. The codec never re-derives
    /// validity on load; callers force it where the saved format means
    /// "treat this data as already committed".
    pub(crate) fn force_valid_range(&self, start: usize, len: usize) {
        for i in 0..len.min(self.capacity) {
            let at = (start + i) % self.capacity;
            self.flags[at].fetch_or(FlagWord::DATA_VALID, Ordering::AcqRel);
        }
    }

    // ---- repaint traversal (no mutex) ------------------------------------

    /// Park the repaint cursor, clamped into the ring.
    pub(crate) fn prepare_for_repaint(&self, start: usize) {
        self.repaint
            .store(start.min(self.capacity - 1), Ordering::Relaxed);
    }

    /// Replay one committed record at the repaint cursor.
    ///
    /// Forward-only: repaint re-reads history that is already committed, so
    /// there is no erase handling here. Ends (returns `NoNewData`) at the
    /// first record without `DATA_VALID`: the in-process record, or
    /// untouched tail of the ring.
    pub(crate) fn get_data_at_repaint(&self, datum: &mut Datum) -> DataStep {
        let at = self.repaint.load(Ordering::Relaxed);
        if !self.flag_at(at).is_valid() {
            return DataStep::NoNewData;
        }

        let before = (at + self.capacity - 1) % self.capacity;
        self.fill_datum_side(before, &mut datum.prev_samples, &mut datum.prev_flags);
        self.fill_datum_side(at, &mut datum.new_samples, &mut datum.new_flags);

        self.repaint
            .store((at + 1) % self.capacity, Ordering::Relaxed);
        DataStep::Forward
    }

    // ---- min/max scans (no mutex) ----------------------------------------

    /// Smallest sample over the records in `[start, end)`, with the range
    /// clamped into the ring. Returns the value and the record index holding
    /// it; with `mark` set, the record is tagged `MIN_MAX_FLAGGED`.
    ///
    /// Runs without the buffer mutex and may observe a record that is
    /// concurrently being advanced.
    pub(crate) fn find_min_value(&self, start: usize, end: usize, mark: bool) -> (i32, usize) {
        self.scan(start, end, mark, |candidate, best| candidate < best)
    }

    /// Largest sample over the records in `[start, end)`; see
    /// [`find_min_value`](Self::find_min_value).
    pub(crate) fn find_max_value(&self, start: usize, end: usize, mark: bool) -> (i32, usize) {
        self.scan(start, end, mark, |candidate, best| candidate > best)
    }

    fn scan(
        &self,
        start: usize,
        end: usize,
        mark: bool,
        better: impl Fn(i32, i32) -> bool,
    ) -> (i32, usize) {
        let start = start.min(self.capacity - 1);
        let end = end.clamp(start + 1, self.capacity);

        let mut best = self.sample_at(start, 0);
        let mut best_index = start;
        for index in start..end {
            for slot in 0..self.width {
                let v = self.sample_at(index, slot);
                if better(v, best) {
                    best = v;
                    best_index = index;
                }
            }
        }

        if mark {
            self.flags[best_index].fetch_or(FlagWord::MIN_MAX_FLAGGED, Ordering::AcqRel);
        }
        (best, best_index)
    }

    // ---- codec access ----------------------------------------------------

    pub(crate) fn sample(&self, index: usize, slot: usize) -> i32 {
        self.sample_at(index, slot)
    }

    pub(crate) fn set_sample(&self, index: usize, slot: usize, value: i32) {
        self.set_sample_at(index, slot, value);
    }

    pub(crate) fn flag_word(&self, index: usize) -> u32 {
        self.flags[index].load(Ordering::Acquire)
    }

    pub(crate) fn set_flag_word(&self, index: usize, bits: u32) {
        self.flags[index].store(bits, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;
    use crate::record::{PeakDirection, RecordShape};
    use proptest::prelude::*;

    fn scalar_max(capacity: usize) -> ChartBuffer {
        ChartBuffer::new(BufferConfig::new(
            capacity,
            RecordShape::Scalar,
            PeakDirection::Max,
        ))
    }

    #[test]
    fn first_store_lands_unconditionally() {
        let buf = scalar_max(8);
        // Least-severe seed would win any comparison; the first store must
        // ignore the comparison entirely.
        assert!(buf.store_at_insertion(&[-100]));
        assert_eq!(buf.sample(0, 0), -100);
        assert!(buf.flag_at(0).is_in_process());
    }

    #[test]
    fn peak_hold_keeps_the_extreme() {
        let buf = scalar_max(8);
        buf.store_at_insertion(&[5]);
        buf.advance_insertion();

        assert!(buf.store_at_insertion(&[3]));
        assert!(buf.store_at_insertion(&[9]));
        assert!(!buf.store_at_insertion(&[2]));
        buf.advance_insertion();

        assert_eq!(buf.sample(0, 0), 5);
        assert_eq!(buf.sample(1, 0), 9);
        assert!(buf.flag_at(0).is_valid());
        assert!(buf.flag_at(1).is_valid());
    }

    #[test]
    fn min_direction_inverts_the_comparison() {
        let buf = ChartBuffer::new(BufferConfig::new(
            8,
            RecordShape::Scalar,
            PeakDirection::Min,
        ));
        buf.store_at_insertion(&[40]);
        assert!(buf.store_at_insertion(&[12]));
        assert!(!buf.store_at_insertion(&[30]));
        assert_eq!(buf.sample(0, 0), 12);
    }

    #[test]
    fn vector_components_compared_independently() {
        let buf = ChartBuffer::new(BufferConfig::new(
            8,
            RecordShape::Vector(3),
            PeakDirection::Max,
        ));
        buf.store_at_insertion(&[5, 50, 500]);
        // Middle component loses, outer two win.
        assert!(buf.store_at_insertion(&[7, 10, 700]));
        assert_eq!(buf.sample(0, 0), 7);
        assert_eq!(buf.sample(0, 1), 50);
        assert_eq!(buf.sample(0, 2), 700);
    }

    #[test]
    fn advance_carries_samples_forward() {
        let buf = scalar_max(8);
        buf.store_at_insertion(&[42]);
        buf.advance_insertion();
        buf.advance_insertion();
        buf.advance_insertion();

        // No stores after the first: downstream still sees defined data.
        assert_eq!(buf.sample(1, 0), 42);
        assert_eq!(buf.sample(2, 0), 42);
        assert!(buf.flag_at(1).is_valid());
        assert!(buf.flag_at(2).is_valid());
        assert!(!buf.flag_at(3).is_valid());
    }

    #[test]
    fn advance_clears_all_but_erased() {
        let buf = scalar_max(4);
        // Wrap around onto an erased slot.
        buf.flags[1].store(
            FlagWord::DATA_ERASED | FlagWord::SEGMENT_START | 77,
            Ordering::Release,
        );
        buf.store_at_insertion(&[1]);
        buf.advance_insertion();

        let word = buf.flag_at(1);
        assert!(word.is_erased());
        assert!(!word.contains(FlagWord::SEGMENT_START));
        assert_eq!(word.clock(), 0);
    }

    #[test]
    fn first_forward_delivery_spans_from_the_seed() {
        let buf = scalar_max(8);
        let mut datum = Datum::new();

        // Position 0 is the implicit "current" record for both roles at
        // reset, so one commit alone is not yet a deliverable step.
        buf.store_at_insertion(&[10]);
        buf.advance_insertion();
        assert_eq!(buf.get_new_data(&mut datum), DataStep::NoNewData);

        buf.store_at_insertion(&[20]);
        buf.advance_insertion();
        assert_eq!(buf.get_new_data(&mut datum), DataStep::Forward);
        assert_eq!(datum.new_value(), Some(20));
        assert_eq!(datum.prev_samples.first().copied(), Some(10));
    }

    #[test]
    fn erase_then_forward_precedence() {
        let buf = scalar_max(8);
        let mut datum = Datum::new();

        buf.store_at_insertion(&[10]);
        buf.advance_insertion();
        buf.store_at_insertion(&[20]);
        buf.advance_insertion();
        assert_eq!(buf.get_new_data(&mut datum), DataStep::Forward);
        assert_eq!(datum.new_value(), Some(20));

        // Producer rolls back the committed record, then commits fresh data
        // on the same slot before the consumer polls again.
        buf.erase_at_insertion();
        buf.store_at_insertion(&[30]);
        buf.advance_insertion();

        // The erasure must be replayed first …
        assert_eq!(buf.get_new_data(&mut datum), DataStep::Reverse);
        assert_eq!(datum.new_value(), Some(10));
        // … and only then the fresh commit on the same position.
        assert_eq!(buf.get_new_data(&mut datum), DataStep::Forward);
        assert_eq!(datum.new_value(), Some(30));
        assert_eq!(buf.get_new_data(&mut datum), DataStep::NoNewData);
    }

    #[test]
    fn erased_flag_survives_slot_reuse() {
        let buf = scalar_max(8);
        buf.store_at_insertion(&[10]);
        buf.advance_insertion();
        buf.erase_at_insertion();
        // Producer immediately reuses the slot.
        buf.store_at_insertion(&[11]);

        assert!(buf.flag_at(0).is_erased());
        let mut datum = Datum::new();
        assert_eq!(buf.get_new_data(&mut datum), DataStep::Reverse);
    }

    #[test]
    fn poll_is_quiet_when_nothing_pending() {
        let buf = scalar_max(8);
        assert!(!buf.new_data_is_ready());
        let mut datum = Datum::new();
        assert_eq!(buf.get_new_data(&mut datum), DataStep::NoNewData);

        buf.store_at_insertion(&[1]);
        assert!(!buf.new_data_is_ready()); // in process, not committed
        buf.advance_insertion();
        assert!(!buf.new_data_is_ready()); // position 0 is already "current"
        buf.store_at_insertion(&[2]);
        buf.advance_insertion();
        assert!(buf.new_data_is_ready());
    }

    #[test]
    fn segment_debounce() {
        let buf = scalar_max(64);
        buf.store_at_insertion(&[1]);
        buf.advance_insertion();
        buf.advance_insertion();
        buf.mark_segment_start();
        assert!(!buf.segment_started());

        for _ in 0..SEGMENT_DEBOUNCE - 1 {
            buf.advance_insertion();
        }
        assert!(!buf.segment_started());
        buf.advance_insertion();
        assert!(buf.segment_started());

        buf.reset_all();
        assert!(!buf.segment_started());
    }

    #[test]
    fn erase_backs_the_debounce_off() {
        let buf = scalar_max(64);
        buf.mark_segment_start();
        for _ in 0..SEGMENT_DEBOUNCE {
            buf.advance_insertion();
        }
        assert!(buf.segment_started());
        buf.erase_at_insertion();
        assert!(!buf.segment_started());
    }

    #[test]
    fn repaint_walks_committed_history_only() {
        let buf = scalar_max(8);
        for v in [3, 6, 9] {
            buf.store_at_insertion(&[v]);
            buf.advance_insertion();
        }

        let mut datum = Datum::new();
        buf.prepare_for_repaint(1);
        assert_eq!(buf.get_data_at_repaint(&mut datum), DataStep::Forward);
        assert_eq!(datum.new_value(), Some(6));
        assert_eq!(datum.prev_samples.first().copied(), Some(3));

        assert_eq!(buf.get_data_at_repaint(&mut datum), DataStep::Forward);
        assert_eq!(datum.new_value(), Some(9));

        // Record 3 is in process, not committed: traversal ends.
        assert_eq!(buf.get_data_at_repaint(&mut datum), DataStep::NoNewData);
    }

    #[test]
    fn scans_clamp_and_mark() {
        let buf = scalar_max(8);
        for v in [5, 1, 7, 2] {
            buf.store_at_insertion(&[v]);
            buf.advance_insertion();
        }

        let (min, at) = buf.find_min_value(0, 4, true);
        assert_eq!((min, at), (1, 1));
        assert!(buf.flag_at(1).contains(FlagWord::MIN_MAX_FLAGGED));

        // End far past the ring clamps to capacity; start past the ring
        // clamps to the last record.
        let (max, _) = buf.find_max_value(0, 10_000, false);
        assert_eq!(max, 7);
        let (v, at) = buf.find_min_value(10_000, 10_001, false);
        assert_eq!(at, 7);
        assert_eq!(v, buf.sample(7, 0));
    }

    #[test]
    fn reset_reseeds_origin() {
        let buf = scalar_max(8);
        buf.store_at_insertion(&[123]);
        buf.advance_insertion();
        buf.reset_all();

        assert_eq!(buf.sample(0, 0), i32::MIN);
        assert!(!buf.flag_at(0).is_valid());
        assert!(!buf.new_data_is_ready());
    }

    proptest! {
        /// For any store sequence at one position, the final value is the
        /// running extreme of the whole sequence (the first store counts
        /// unconditionally but also participates in the extreme).
        #[test]
        fn peak_hold_equals_sequence_extreme(values in proptest::collection::vec(any::<i32>(), 1..64)) {
            let buf = scalar_max(4);
            for &v in &values {
                buf.store_at_insertion(&[v]);
            }
            let expected = values.iter().copied().max().unwrap();
            prop_assert_eq!(buf.sample(0, 0), expected);
        }

        /// Interleaved producer traffic never breaks the look-pointer
        /// invariant observable through the consumer protocol.
        #[test]
        fn consumer_steps_preserve_look_invariant(
            ops in proptest::collection::vec(0u8..3, 1..128),
        ) {
            let buf = scalar_max(16);
            let mut datum = Datum::new();
            for op in ops {
                match op {
                    0 => {
                        buf.store_at_insertion(&[7]);
                        buf.advance_insertion();
                    }
                    1 => {
                        let _ = buf.get_new_data(&mut datum);
                    }
                    _ => {
                        buf.store_at_insertion(&[7]);
                        buf.advance_insertion();
                        buf.erase_at_insertion();
                    }
                }
                let st = buf.state();
                prop_assert_eq!(st.idx.look_ahead(), (st.idx.extraction() + 1) % 16);
                prop_assert_eq!(st.idx.look_behind(), (st.idx.extraction() + 16 - 1) % 16);
            }
        }
    }
}
