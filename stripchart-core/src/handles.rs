//! Producer and Consumer Handles Over One Shared Buffer
//!
//! Exactly two roles ever touch a chart buffer: the acquisition thread
//! (producer) and the rendering thread (consumer). Rather than one object
//! with a mixed method set and a comment saying who may call what, the two
//! API surfaces are split onto two owned handles:
//!
//! - [`Recorder`]: the producer surface (store, advance, erase, markers)
//! - [`Painter`]: the consumer surface (poll, repaint, scans, persistence)
//!
//! [`split`] builds the buffer and returns one of each. Neither handle is
//! `Clone`, so a third role cannot appear by accident; each handle is `Send`,
//! so the pair can be moved onto their threads.
//!
//! ```
//! use stripchart_core::{split, BufferConfig, DataStep, Datum};
//!
//! let (recorder, painter) = split(BufferConfig::scalar(1024));
//!
//! // Acquisition side: many candidate samples, one advance per position.
//! recorder.store_value(310);
//! recorder.store_value(480);
//! recorder.advance();
//! recorder.store_value(295);
//! recorder.advance();
//!
//! // Rendering side: poll on the redraw cadence.
//! let mut datum = Datum::new();
//! while painter.new_data_is_ready() {
//!     match painter.get_new_data(&mut datum) {
//!         DataStep::Forward => { /* draw prev -> new */ }
//!         DataStep::Reverse => { /* un-draw new -> prev */ }
//!         DataStep::NoNewData => break,
//!     }
//! }
//! ```

use std::io::{Read, Write};
use std::sync::Arc;

use crate::buffer::{ChartBuffer, StatsSnapshot};
use crate::codec;
use crate::config::BufferConfig;
use crate::context::ChartContext;
use crate::errors::CodecResult;
use crate::record::{DataStep, Datum, PeakDirection, RecordShape};

/// Build a chart buffer and split it into its two role handles.
pub fn split(config: BufferConfig) -> (Recorder, Painter) {
    let buf = Arc::new(ChartBuffer::new(config));
    (Recorder { buf: Arc::clone(&buf) }, Painter { buf })
}

/// The producer handle: owned by the acquisition thread for the lifetime of
/// the inspection job.
pub struct Recorder {
    buf: Arc<ChartBuffer>,
}

impl Recorder {
    /// Peak-hold store of a scalar sample at the insertion point.
    ///
    /// Returns whether the stored record changed. See
    /// [`store_vector`](Self::store_vector) for the exact rules.
    pub fn store_value(&self, value: i32) -> bool {
        self.buf.store_at_insertion(&[value])
    }

    /// Peak-hold store of one sample per sub-channel.
    ///
    /// The first store after an advance always lands and marks the record
    /// in-process; afterwards each component is overwritten independently,
    /// and only by a strictly more extreme value. Slices longer than the
    /// record width are truncated; shorter slices leave the tail components
    /// untouched.
    pub fn store_vector(&self, values: &[i32]) -> bool {
        self.buf.store_at_insertion(values)
    }

    /// Commit the current position and move to the next ring slot.
    pub fn advance(&self) {
        self.buf.advance_insertion();
    }

    /// Roll back the position the producer just started, e.g. on a scan
    /// direction reversal. The previously committed record is re-flagged
    /// erased for the consumer to replay.
    pub fn erase(&self) {
        self.buf.erase_at_insertion();
    }

    /// Record the rotary clock position at the insertion point (truncated
    /// to 9 bits).
    pub fn store_clock(&self, clock: u16) {
        self.buf.store_clock_at_insertion(clock);
    }

    /// Record the most severe violated threshold at the insertion point.
    pub fn store_threshold(&self, id: u8) {
        self.buf.store_threshold_at_insertion(id);
    }

    /// Place a manual user flag at the insertion point.
    pub fn store_manual_flag(&self) {
        self.buf.store_manual_flag_at_insertion();
    }

    /// Mark the insertion point as lying in a masked end zone.
    pub fn place_end_mask_marker(&self) {
        self.buf.place_end_mask_marker();
    }

    /// Mark the start of an inspection segment at the insertion point.
    pub fn mark_segment_start(&self) {
        self.buf.mark_segment_start();
    }

    /// Mark the end of an inspection segment at the insertion point.
    pub fn mark_segment_end(&self) {
        self.buf.mark_segment_end();
    }

    /// Zero all pointers and flags for a new inspection job and re-seed the
    /// origin record.
    pub fn reset_all(&self) {
        self.buf.reset_all();
    }

    /// Ring capacity in records.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

/// The consumer handle: owned by the rendering thread. Also the entry point
/// for segment persistence, which runs on the consumer side.
pub struct Painter {
    buf: Arc<ChartBuffer>,
}

impl Painter {
    /// Non-blocking poll for pending work; call on the redraw cadence.
    pub fn new_data_is_ready(&self) -> bool {
        self.buf.new_data_is_ready()
    }

    /// Take one step through the ring, populating `datum` with the record
    /// now current and the record that was current before the step.
    ///
    /// Pending erasures are always delivered (as [`DataStep::Reverse`])
    /// before newer forward commits.
    pub fn get_new_data(&self, datum: &mut Datum) -> DataStep {
        self.buf.get_new_data(datum)
    }

    /// [`get_new_data`](Self::get_new_data), folding the step into the
    /// chart's shared scroll context.
    pub fn get_new_data_with(&self, datum: &mut Datum, ctx: &mut ChartContext) -> DataStep {
        let step = self.buf.get_new_data(datum);
        ctx.apply(step);
        step
    }

    /// Park the repaint cursor at a ring index (clamped into the ring).
    pub fn prepare_for_repaint(&self, start: usize) {
        self.buf.prepare_for_repaint(start);
    }

    /// Replay one committed record at the repaint cursor; `NoNewData` once
    /// the cursor reaches uncommitted territory. Independent of the
    /// extraction state and safe during live acquisition.
    pub fn get_data_at_repaint(&self, datum: &mut Datum) -> DataStep {
        self.buf.get_data_at_repaint(datum)
    }

    /// Smallest sample over `[start, end)` (clamped), e.g. minimum wall
    /// thickness over an inspected length. With `mark` set the extreme
    /// record is tagged `MIN_MAX_FLAGGED`.
    pub fn find_min_value(&self, start: usize, end: usize, mark: bool) -> (i32, usize) {
        self.buf.find_min_value(start, end, mark)
    }

    /// Largest sample over `[start, end)` (clamped); see
    /// [`find_min_value`](Self::find_min_value).
    pub fn find_max_value(&self, start: usize, end: usize, mark: bool) -> (i32, usize) {
        self.buf.find_max_value(start, end, mark)
    }

    /// True once the last marked segment has debounced (ten insertion
    /// advances past the start marker).
    pub fn segment_started(&self) -> bool {
        self.buf.segment_started()
    }

    /// Net consumer steps inside the current segment.
    pub fn segment_length(&self) -> usize {
        self.buf.segment_length()
    }

    /// `[start, end)` ring indices of the last marked segment, if both
    /// markers were placed.
    pub fn segment_bounds(&self) -> Option<(usize, usize)> {
        self.buf.segment_bounds()
    }

    /// Stamp `DATA_VALID` over `len` records starting at `start`.
    ///
    /// Loading a segment never re-derives validity; call this where the
    /// saved format means "treat loaded data as already committed".
    pub fn force_valid(&self, start: usize, len: usize) {
        self.buf.force_valid_range(start, len);
    }

    /// Serialize the last marked segment in the line-oriented text format.
    ///
    /// A buffer with no marked segment writes an explanatory placeholder
    /// line instead of data; that is a recoverable condition, not an error.
    pub fn write_segment<W: Write>(&self, out: &mut W) -> CodecResult<()> {
        codec::write_segment(&self.buf, out)
    }

    /// Load a segment saved by [`write_segment`](Self::write_segment) into
    /// this buffer, placing its first record at ring index `start`. Returns
    /// the number of records loaded.
    pub fn read_segment<R: Read>(&self, input: R, start: usize) -> CodecResult<usize> {
        codec::read_segment(&self.buf, input, start)
    }

    /// Point-in-time operation counters for diagnostics.
    pub fn stats(&self) -> StatsSnapshot {
        self.buf.stats().snapshot()
    }

    /// Ring capacity in records.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Record shape configured for this buffer.
    pub fn shape(&self) -> RecordShape {
        self.buf.shape()
    }

    /// Peak-hold direction configured for this buffer.
    pub fn direction(&self) -> PeakDirection {
        self.buf.direction()
    }
}
