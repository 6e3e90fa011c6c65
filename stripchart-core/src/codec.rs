//! Line-Oriented Segment Persistence
//!
//! Saved inspection jobs store each chart segment as plain text, one decimal
//! integer per line, grouped into bracketed blocks:
//!
//! ```text
//! [Data Set 1]
//! 310
//! 480
//! [End of Set]
//! [Data Set 2]        ; span traces and maps: one block per sample slot
//! ...
//! [End of Set]
//! [Flags]
//! 1048576
//! ...
//! [End of Set]
//! ```
//!
//! The format is bit-exact legacy: flag words are written verbatim, so the
//! packing in [`FlagWord`](crate::flags::FlagWord) cannot change without
//! orphaning existing saved jobs. A buffer whose segment markers were never
//! placed is represented by a single explanatory line and a blank line, with
//! none of the blocks present; readers treat that as "nothing recorded",
//! not as corruption.
//!
//! Loading is deliberately dumb: seek the expected tag line, read integers
//! until the closing tag, fail loudly (naming the series and line) on
//! anything else. Validity flags are restored exactly as saved and never
//! re-derived.

use std::io::{Read, Write};

use crate::buffer::ChartBuffer;
use crate::errors::{CodecError, CodecResult, Series};

/// Closing tag of every block.
pub const END_OF_SET_TAG: &str = "[End of Set]";

/// Tag of the flag-word block.
pub const FLAGS_TAG: &str = "[Flags]";

/// Placeholder written when no segment was ever marked.
pub const MISSING_SEGMENT_NOTE: &str = "No inspection segment has been recorded";

fn data_set_tag(series: usize) -> String {
    format!("[Data Set {}]", series)
}

/// Number of records in the circular run `[start, end)`.
fn run_length(start: usize, end: usize, capacity: usize) -> usize {
    (end + capacity - start) % capacity
}

/// Serialize the buffer's last marked segment.
pub(crate) fn write_segment<W: Write>(buf: &ChartBuffer, out: &mut W) -> CodecResult<()> {
    let Some((start, end)) = buf.segment_bounds() else {
        // Recoverable: the job was saved before any piece was marked.
        writeln!(out, "{}", MISSING_SEGMENT_NOTE)?;
        writeln!(out)?;
        return Ok(());
    };

    let capacity = buf.capacity();
    let len = run_length(start, end, capacity);

    for slot in 0..buf.width() {
        writeln!(out, "{}", data_set_tag(slot + 1))?;
        for i in 0..len {
            writeln!(out, "{}", buf.sample((start + i) % capacity, slot))?;
        }
        writeln!(out, "{}", END_OF_SET_TAG)?;
    }

    writeln!(out, "{}", FLAGS_TAG)?;
    for i in 0..len {
        writeln!(out, "{}", buf.flag_word((start + i) % capacity))?;
    }
    writeln!(out, "{}", END_OF_SET_TAG)?;

    Ok(())
}

/// Load a segment into `buf`, its first record landing at ring index
/// `start`. Returns the number of records loaded and records the segment
/// bounds on the buffer, so a subsequent save round-trips.
///
/// `DATA_VALID` is restored only as far as the saved flag words carry it;
/// see [`Painter::force_valid`](crate::handles::Painter::force_valid).
pub(crate) fn read_segment<R: Read>(
    buf: &ChartBuffer,
    input: R,
    start: usize,
) -> CodecResult<usize> {
    let capacity = buf.capacity();
    let start = start % capacity;
    let mut lines = LineReader::new(input);
    let mut loaded = 0usize;

    for slot in 0..buf.width() {
        let series = Series::DataSet(slot as u8 + 1);
        seek_tag(&mut lines, &data_set_tag(slot + 1), series)?;
        let count = read_block(&mut lines, series, capacity, |i, value: i32| {
            buf.set_sample((start + i) % capacity, slot, value);
        })?;
        loaded = loaded.max(count);
    }

    seek_tag(&mut lines, FLAGS_TAG, Series::Flags)?;
    let count = read_block(&mut lines, Series::Flags, capacity, |i, value: u32| {
        buf.set_flag_word((start + i) % capacity, value);
    })?;
    loaded = loaded.max(count);

    buf.set_segment_bounds(start, (start + loaded) % capacity);
    Ok(loaded)
}

/// Skip lines (placeholder notes, blank separators) until `tag` is found.
fn seek_tag<R: Read>(lines: &mut LineReader<R>, tag: &str, series: Series) -> CodecResult<()> {
    loop {
        match lines.next_line()? {
            None => return Err(CodecError::UnexpectedEof { series }),
            Some(line) if line.as_str() == tag => return Ok(()),
            Some(_) => continue,
        }
    }
}

/// Read integer lines until the closing tag, handing each to `store`.
///
/// The integer type is the block's destination type, so an out-of-range
/// value is reported as corruption rather than silently wrapped.
fn read_block<R: Read, T: core::str::FromStr>(
    lines: &mut LineReader<R>,
    series: Series,
    capacity: usize,
    mut store: impl FnMut(usize, T),
) -> CodecResult<usize> {
    let mut count = 0usize;
    loop {
        let Some(line) = lines.next_line()? else {
            return Err(CodecError::UnexpectedEof { series });
        };
        if line.as_str() == END_OF_SET_TAG {
            return Ok(count);
        }

        let value: T = line
            .trim()
            .parse()
            .map_err(|_| CodecError::CorruptSegment {
                series,
                line: lines.line_index(),
            })?;
        if count >= capacity {
            return Err(CodecError::Overflow { series, capacity });
        }
        store(count, value);
        count += 1;
    }
}

/// Buffered line reader over any byte source.
///
/// Reads in fixed chunks and assembles lines into a bounded buffer; the
/// format has no business producing long lines, so a line past the buffer is
/// reported as corruption rather than grown. Carriage returns are dropped so
/// files moved across platforms load identically.
struct LineReader<R: Read> {
    inner: R,
    buffer: [u8; 1024],
    pos: usize,
    len: usize,
    line: heapless::String<128>,
    eof: bool,
    line_index: usize,
}

impl<R: Read> LineReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: [0; 1024],
            pos: 0,
            len: 0,
            line: heapless::String::new(),
            eof: false,
            line_index: 0,
        }
    }

    /// 1-based index of the line most recently returned.
    fn line_index(&self) -> usize {
        self.line_index
    }

    fn refill(&mut self) -> CodecResult<bool> {
        if self.eof {
            return Ok(false);
        }
        let read = self.inner.read(&mut self.buffer)?;
        if read == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.pos = 0;
        self.len = read;
        Ok(true)
    }

    /// Next line, without its terminator. `None` at end of input.
    fn next_line(&mut self) -> CodecResult<Option<heapless::String<128>>> {
        self.line.clear();
        loop {
            while self.pos < self.len {
                let byte = self.buffer[self.pos];
                self.pos += 1;

                if byte == b'\n' {
                    self.line_index += 1;
                    return Ok(Some(self.line.clone()));
                }
                if byte != b'\r' && self.line.push(byte as char).is_err() {
                    return Err(CodecError::LineTooLong {
                        line: self.line_index + 1,
                    });
                }
            }

            if !self.refill()? {
                if self.line.is_empty() {
                    return Ok(None);
                }
                // Final line without a trailing newline.
                self.line_index += 1;
                return Ok(Some(self.line.clone()));
            }
        }
    }
}
