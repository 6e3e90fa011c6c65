//! Error Types for Segment Persistence
//!
//! Nothing in the buffer subsystem is fatal to the process: configuration
//! problems clamp, producer misuse is absorbed by the `IN_PROCESS` handshake,
//! and scan ranges clamp silently. The one place errors surface is the
//! segment codec, where a corrupt saved job must be reported to the caller;
//! a partially-loaded job is never treated as complete.
//!
//! Errors carry the offending series name and line index so an operator can
//! find the bad line in a saved file by eye.

use core::fmt;

use thiserror_no_std::Error;

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Which block of the segment format an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    /// A `[Data Set k]` block (1-based, one per sample slot).
    DataSet(u8),
    /// The `[Flags]` block.
    Flags,
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Series::DataSet(k) => write!(f, "Data Set {}", k),
            Series::Flags => write!(f, "Flags"),
        }
    }
}

/// Errors raised while saving or loading a segment.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A line inside a block did not parse as a decimal integer.
    #[error("corrupt segment: [{series}] line {line} is not a decimal integer")]
    CorruptSegment {
        /// Block the bad line was read in.
        series: Series,
        /// 1-based line index within the input.
        line: usize,
    },

    /// A block holds more records than the destination buffer.
    #[error("corrupt segment: [{series}] overflows the {capacity}-record buffer")]
    Overflow {
        /// Block that overflowed.
        series: Series,
        /// Destination ring capacity.
        capacity: usize,
    },

    /// Input ended before the expected tag line was found.
    #[error("unexpected end of input while reading [{series}]")]
    UnexpectedEof {
        /// Block being sought or read.
        series: Series,
    },

    /// A line exceeded the fixed line buffer.
    #[error("line {line} exceeds the line buffer")]
    LineTooLong {
        /// 1-based line index within the input.
        line: usize,
    },

    /// Underlying I/O failure.
    #[cfg(feature = "std")]
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "defmt")]
impl defmt::Format for CodecError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::CorruptSegment { line, .. } => {
                defmt::write!(fmt, "corrupt segment at line {}", line)
            }
            Self::Overflow { capacity, .. } => {
                defmt::write!(fmt, "segment overflows {} records", capacity)
            }
            Self::UnexpectedEof { .. } => defmt::write!(fmt, "unexpected end of input"),
            Self::LineTooLong { line } => defmt::write!(fmt, "line {} too long", line),
            #[cfg(feature = "std")]
            Self::Io(_) => defmt::write!(fmt, "transport error"),
        }
    }
}
