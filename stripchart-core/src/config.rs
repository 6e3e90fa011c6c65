//! Buffer Configuration
//!
//! A buffer is configured once, at inspection-job setup, and never resized.
//! Configuration errors are handled by clamping, not rejection: a capacity of
//! zero, a capacity past [`MAX_CAPACITY`], or a map wider than
//! [`MAX_RECORD_WIDTH`](crate::record::MAX_RECORD_WIDTH) is silently pulled
//! into range. This is a deliberate leniency policy: a mis-edited setup file
//! should degrade the chart, not abort the inspection.

use crate::record::{PeakDirection, RecordShape, MAX_RECORD_WIDTH};

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Largest allowed ring capacity, bounding memory per chart.
pub const MAX_CAPACITY: usize = 100_000;

/// Smallest usable ring: one record in process, one committed.
pub const MIN_CAPACITY: usize = 2;

/// Insertion-point advances required past a segment start marker before the
/// segment counts as started. Debounces marker noise at piece edges.
pub const SEGMENT_DEBOUNCE: usize = 10;

/// Configuration for one chart buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferConfig {
    capacity: usize,
    shape: RecordShape,
    direction: PeakDirection,
}

impl BufferConfig {
    /// Build a configuration, clamping out-of-range inputs into the legal
    /// window rather than failing.
    pub fn new(capacity: usize, shape: RecordShape, direction: PeakDirection) -> Self {
        let clamped = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        if clamped != capacity {
            log_warn!(
                "buffer capacity {} clamped to {} records",
                capacity,
                clamped
            );
        }

        let shape = match shape {
            RecordShape::Vector(w) if (w as usize) > MAX_RECORD_WIDTH => {
                log_warn!("map width {} clamped to {} sub-channels", w, MAX_RECORD_WIDTH);
                RecordShape::Vector(MAX_RECORD_WIDTH as u16)
            }
            RecordShape::Vector(0) => RecordShape::Vector(1),
            other => other,
        };

        Self {
            capacity: clamped,
            shape,
            direction,
        }
    }

    /// Scalar trace with MAX peak-hold, the most common chart style.
    pub fn scalar(capacity: usize) -> Self {
        Self::new(capacity, RecordShape::Scalar, PeakDirection::Max)
    }

    /// Ring capacity in records, already clamped.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record shape, already clamped.
    pub fn shape(&self) -> RecordShape {
        self.shape
    }

    /// Peak-hold direction.
    pub fn direction(&self) -> PeakDirection {
        self.direction
    }

    /// Sample slots per record.
    pub fn width(&self) -> usize {
        self.shape.width()
    }
}
