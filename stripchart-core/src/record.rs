//! Record Shapes, Peak Direction, and the Consumer Datum
//!
//! A chart buffer records one of three record shapes, chosen at
//! configuration time:
//!
//! - `Scalar`: one value per position (point-to-point / stick traces)
//! - `Span`: a low/high pair per position (span-style traces)
//! - `Vector(w)`: `w` sub-channel values per position (2D/3D maps)
//!
//! The insertion/extraction/erasure control flow is identical for all three;
//! only the per-record comparison and copy width differ, so the shape is a
//! tagged variant parameterizing one generic buffer rather than a type
//! hierarchy.

use crate::flags::FlagWord;

/// Upper bound on sub-channels per record.
///
/// Bounds the stack footprint of a [`Datum`]; a map configured wider than
/// this is clamped (the same leniency policy as the capacity clamp).
pub const MAX_RECORD_WIDTH: usize = 64;

/// Sample slots of one record, widest shape first.
pub type SampleVec = heapless::Vec<i32, MAX_RECORD_WIDTH>;

/// The shape of every record in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordShape {
    /// One scalar sample per position.
    Scalar,
    /// A low/high pair per position.
    Span,
    /// A fixed-width vector per position (width = sub-channel count).
    Vector(u16),
}

impl RecordShape {
    /// Sample slots per record, before clamping.
    pub const fn width(self) -> usize {
        match self {
            RecordShape::Scalar => 1,
            RecordShape::Span => 2,
            RecordShape::Vector(w) => w as usize,
        }
    }
}

/// Which direction "more extreme" points for peak-hold capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PeakDirection {
    /// Keep the largest value seen at each position.
    Max,
    /// Keep the smallest value seen at each position (e.g. minimum wall
    /// thickness).
    Min,
}

impl PeakDirection {
    /// True if `candidate` should replace `held` under this direction.
    ///
    /// Strict comparison: an equal value is not an update.
    pub fn is_more_extreme(self, candidate: i32, held: i32) -> bool {
        match self {
            PeakDirection::Max => candidate > held,
            PeakDirection::Min => candidate < held,
        }
    }

    /// The least severe value this direction can hold.
    ///
    /// Used to seed position 0 at reset so initial reads are defined and
    /// non-alarming.
    pub const fn least_severe(self) -> i32 {
        match self {
            PeakDirection::Max => i32::MIN,
            PeakDirection::Min => i32::MAX,
        }
    }
}

/// Outcome of one consumer step through the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStep {
    /// A newly committed record was delivered; the trace grows.
    Forward,
    /// An erasure was replayed; the trace rolls back one position.
    Reverse,
    /// Nothing pending.
    NoNewData,
}

/// One consumer-visible step: the record now at the extraction point and the
/// record that was there before the step.
///
/// The renderer draws the line segment between `prev` and `new` on a
/// `Forward` step, and un-draws it on a `Reverse` step. The struct is
/// designed to be allocated once and repopulated on every poll.
#[derive(Debug, Clone, Default)]
pub struct Datum {
    /// Samples of the record now at the extraction point.
    pub new_samples: SampleVec,
    /// Flag word of the record now at the extraction point.
    pub new_flags: FlagWord,
    /// Samples of the record previously at the extraction point.
    pub prev_samples: SampleVec,
    /// Flag word of the record previously at the extraction point.
    pub prev_flags: FlagWord,
}

impl Datum {
    /// An empty datum ready to be populated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any populated contents.
    pub fn clear(&mut self) {
        self.new_samples.clear();
        self.prev_samples.clear();
        self.new_flags = FlagWord::default();
        self.prev_flags = FlagWord::default();
    }

    /// First sample slot of the new record, if populated.
    ///
    /// Convenience for scalar traces, where it is the only slot.
    pub fn new_value(&self) -> Option<i32> {
        self.new_samples.first().copied()
    }
}
