//! Real-time data engine for stripchart
//!
//! Strip chart recording for industrial ultrasonic inspection: probe
//! hardware feeds numeric samples, and scrolling charts, 2D maps, and 3D
//! maps paint them in real time from another thread. This crate is the
//! engine under every one of those displays: the peak-hold circular buffer
//! and the producer/consumer protocol over it.
//!
//! Key constraints:
//! - Acquisition must never stall behind rendering
//! - The renderer must never observe a half-written record
//! - Rollbacks (un-erasing the trace) replay before newer data shows
//!
//! ```
//! use stripchart_core::{split, BufferConfig, DataStep, Datum};
//!
//! let (recorder, painter) = split(BufferConfig::scalar(4096));
//!
//! // Acquisition thread: peak-hold capture, one advance per position.
//! recorder.store_value(312);
//! recorder.store_value(478); // more extreme, kept
//! recorder.store_value(121); // less extreme, dropped
//! recorder.advance();
//!
//! // Rendering thread: poll on the redraw timer.
//! let mut datum = Datum::new();
//! match painter.get_new_data(&mut datum) {
//!     DataStep::Forward => { /* extend the trace */ }
//!     DataStep::Reverse => { /* roll the trace back */ }
//!     DataStep::NoNewData => {}
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod context;
pub mod errors;
pub mod flags;
pub mod record;
pub mod ring;

#[cfg(feature = "std")]
mod buffer;
#[cfg(feature = "std")]
pub mod codec;
#[cfg(feature = "std")]
pub mod handles;
#[cfg(feature = "std")]
pub mod stream;

// Public API
pub use config::{BufferConfig, MAX_CAPACITY, SEGMENT_DEBOUNCE};
pub use context::ChartContext;
pub use errors::{CodecError, CodecResult, Series};
pub use flags::FlagWord;
pub use record::{DataStep, Datum, PeakDirection, RecordShape, SampleVec};

#[cfg(feature = "std")]
pub use buffer::StatsSnapshot;
#[cfg(feature = "std")]
pub use handles::{split, Painter, Recorder};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
