//! Packed Flag Word for Per-Record Metadata
//!
//! ## Overview
//!
//! Every record in the chart ring buffer carries one 32-bit flag word holding
//! all of its metadata: the rotary clock position the sample was taken at, the
//! id of the most severe threshold it violated, segment separator markers, and
//! the producer/consumer handshake state (`DATA_VALID`, `DATA_ERASED`,
//! `IN_PROCESS`).
//!
//! The packing is load-bearing: the persisted segment format writes flag words
//! verbatim as decimal integers, so the layout cannot change without breaking
//! every saved inspection job.
//!
//! ## Layout
//!
//! ```text
//! bit 31 .. 23 │ 22 │ 21 │ 20 │ 19 │ 18 │ 17 │ 16 │ 15 ...... 9 │ 8 ....... 0
//!   (unused)   │ IP │ DE │ DV │ EM │ SE │ SS │ MM │  threshold  │    clock
//!
//! IP = IN_PROCESS      DE = DATA_ERASED     DV = DATA_VALID
//! EM = END_MASK_MARK   SE = SEGMENT_END     SS = SEGMENT_START
//! MM = MIN_MAX_FLAGGED
//! ```
//!
//! ## Threshold Encoding
//!
//! The 7-bit threshold field stores a code, not a raw index:
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | no violation |
//! | 1    | manual user flag |
//! | n+2  | threshold index n |
//!
//! Out-of-range clock values are silently truncated to 9 bits, and a setup
//! with more than 125 thresholds silently wraps the code field. Both are
//! deliberate leniencies: persisted jobs already rely on the wraparound.
//!
//! ## Synchronization
//!
//! `FlagWord` itself is a plain value type. Reading any field of a record's
//! flag word never requires more synchronization than reading the single
//! 32-bit word it is packed into; the buffer stores the words in atomics and
//! applies these accessors to loaded copies.

/// Packed per-record flag word.
///
/// A thin newtype over the raw `u32` so call sites go through named accessors
/// instead of scattering mask arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagWord(u32);

impl FlagWord {
    /// 9-bit rotary clock position, bits 0-8.
    pub const CLOCK_MASK: u32 = 0x1FF;

    /// 7-bit threshold code, bits 9-15.
    pub const THRESHOLD_SHIFT: u32 = 9;
    /// Mask of the threshold field in place.
    pub const THRESHOLD_MASK: u32 = 0x7F << Self::THRESHOLD_SHIFT;

    /// A peak marker was placed at this record by a min/max scan.
    pub const MIN_MAX_FLAGGED: u32 = 1 << 16;
    /// First record of a logical inspection segment.
    pub const SEGMENT_START: u32 = 1 << 17;
    /// Last record of a logical inspection segment.
    pub const SEGMENT_END: u32 = 1 << 18;
    /// Record lies in a masked leading/trailing zone: decorated when drawn,
    /// never threshold-checked.
    pub const END_MASK_MARK: u32 = 1 << 19;
    /// Record has been committed by the producer and is safe to consume.
    pub const DATA_VALID: u32 = 1 << 20;
    /// Record was rolled back by the producer after being committed.
    pub const DATA_ERASED: u32 = 1 << 21;
    /// Record is actively receiving peak-hold updates.
    pub const IN_PROCESS: u32 = 1 << 22;

    /// Threshold code reserved for a manual user flag.
    pub const MANUAL_FLAG_CODE: u8 = 1;

    /// Construct from a raw word (e.g. one loaded from a saved segment).
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw packed word, as persisted by the segment codec.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// OR the given mask into the word.
    ///
    /// Callers must use disjoint masks for independent fields; the multi-bit
    /// clock and threshold fields have dedicated store methods instead.
    pub fn set(&mut self, mask: u32) {
        self.0 |= mask;
    }

    /// Clear the given mask from the word.
    pub fn clear(&mut self, mask: u32) {
        self.0 &= !mask;
    }

    /// True if every bit of `mask` is set.
    pub const fn contains(self, mask: u32) -> bool {
        (self.0 & mask) == mask
    }

    /// Store a rotary clock position, truncating to 9 bits.
    pub fn store_clock(&mut self, clock: u16) {
        self.0 = (self.0 & !Self::CLOCK_MASK) | (clock as u32 & Self::CLOCK_MASK);
    }

    /// The stored clock position.
    pub const fn clock(self) -> u16 {
        (self.0 & Self::CLOCK_MASK) as u16
    }

    /// Store the id of a violated threshold.
    ///
    /// The stored code is `(id + 2) & 0x7F`; the +2 offset reserves 0 for "no
    /// violation" and 1 for the manual flag. Ids past 125 wrap silently.
    pub fn store_threshold(&mut self, id: u8) {
        let code = (id.wrapping_add(2) & 0x7F) as u32;
        self.0 = (self.0 & !Self::THRESHOLD_MASK) | (code << Self::THRESHOLD_SHIFT);
    }

    /// Store the manual user flag in the threshold field.
    pub fn store_manual_flag(&mut self) {
        self.0 = (self.0 & !Self::THRESHOLD_MASK)
            | ((Self::MANUAL_FLAG_CODE as u32) << Self::THRESHOLD_SHIFT);
    }

    /// Clear the threshold field back to "no violation".
    pub fn clear_threshold(&mut self) {
        self.0 &= !Self::THRESHOLD_MASK;
    }

    /// The raw 7-bit threshold code (0 = none, 1 = manual).
    pub const fn threshold_code(self) -> u8 {
        ((self.0 & Self::THRESHOLD_MASK) >> Self::THRESHOLD_SHIFT) as u8
    }

    /// The violated threshold index, if the code names one.
    pub const fn threshold_index(self) -> Option<u8> {
        let code = self.threshold_code();
        if code >= 2 {
            Some(code - 2)
        } else {
            None
        }
    }

    /// Record committed and readable by the consumer.
    pub const fn is_valid(self) -> bool {
        self.contains(Self::DATA_VALID)
    }

    /// Record rolled back after commit.
    pub const fn is_erased(self) -> bool {
        self.contains(Self::DATA_ERASED)
    }

    /// Record currently receiving peak-hold updates.
    pub const fn is_in_process(self) -> bool {
        self.contains(Self::IN_PROCESS)
    }

    /// Everything except `DATA_ERASED`, cleared when the insertion point
    /// advances onto a record. The erased bit carries over so a lagging
    /// consumer cannot miss an erasure when the producer reuses the slot.
    pub const fn erased_carryover(self) -> Self {
        Self(self.0 & Self::DATA_ERASED)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for FlagWord {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "FlagWord({=u32:#x})", self.0);
    }
}
