//! Pull-Based Stream Adapter for the Consumer Side
//!
//! The rendering layer drives consumption on its own redraw cadence; nothing
//! in the buffer blocks or wakes it. That is exactly the `nb` non-blocking
//! model: poll, and get `WouldBlock` when there is nothing to do yet.
//!
//! [`DatumStream`] wraps a [`Painter`] so consumer code can be written
//! against a stream instead of the raw poll/step pair:
//!
//! ```
//! use stripchart_core::{split, BufferConfig};
//! use stripchart_core::stream::{DatumStream, Stream};
//!
//! let (recorder, painter) = split(BufferConfig::scalar(256));
//! recorder.store_value(17);
//! recorder.advance();
//! recorder.store_value(23);
//! recorder.advance();
//!
//! let mut stream = DatumStream::new(painter);
//! loop {
//!     match stream.poll_next() {
//!         Ok(step) => { /* draw step.datum per step.step */ }
//!         Err(nb::Error::WouldBlock) => break, // caught up, redraw later
//!         Err(nb::Error::Other(e)) => match e {},
//!     }
//! }
//! ```

use core::convert::Infallible;

use crate::context::ChartContext;
use crate::handles::Painter;
use crate::record::{DataStep, Datum};

/// Pull-based source of items, in the `nb` non-blocking idiom.
pub trait Stream {
    /// Item delivered per poll.
    type Item;
    /// Terminal error; `nb::Error::WouldBlock` is not an error, just "later".
    type Error;

    /// Poll for the next item without blocking.
    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error>;
}

/// One delivered consumer step with its direction.
#[derive(Debug, Clone)]
pub struct ChartStep {
    /// Forward growth or rollback replay.
    pub step: DataStep,
    /// The record pair the step exposed.
    pub datum: Datum,
}

/// Adapts a [`Painter`] into a [`Stream`] of [`ChartStep`]s.
///
/// The internal datum is reused across polls; each delivered item is a copy,
/// so the steady-state cost per poll is two fixed-size record copies.
pub struct DatumStream {
    painter: Painter,
    datum: Datum,
    context: Option<ChartContext>,
}

impl DatumStream {
    /// Wrap a painter handle.
    pub fn new(painter: Painter) -> Self {
        Self {
            painter,
            datum: Datum::new(),
            context: None,
        }
    }

    /// Track scroll state in a chart context while streaming.
    pub fn with_context(mut self, context: ChartContext) -> Self {
        self.context = Some(context);
        self
    }

    /// The tracked context, if one was attached.
    pub fn context(&self) -> Option<&ChartContext> {
        self.context.as_ref()
    }

    /// Give the painter back, e.g. to run a repaint or save a segment.
    pub fn into_inner(self) -> Painter {
        self.painter
    }
}

impl Stream for DatumStream {
    type Item = ChartStep;
    type Error = Infallible;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        match self.painter.get_new_data(&mut self.datum) {
            DataStep::NoNewData => Err(nb::Error::WouldBlock),
            step => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.apply(step);
                }
                Ok(ChartStep {
                    step,
                    datum: self.datum.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BufferConfig;
    use crate::handles::split;

    #[test]
    fn stream_delivers_then_would_block() {
        let (recorder, painter) = split(BufferConfig::scalar(32));
        let mut stream = DatumStream::new(painter);

        assert!(matches!(stream.poll_next(), Err(nb::Error::WouldBlock)));

        recorder.store_value(4);
        recorder.advance();
        recorder.store_value(9);
        recorder.advance();

        let step = stream.poll_next().expect("one step pending");
        assert_eq!(step.step, DataStep::Forward);
        assert_eq!(step.datum.new_value(), Some(9));
        assert!(matches!(stream.poll_next(), Err(nb::Error::WouldBlock)));
    }

    #[test]
    fn attached_context_follows_the_stream() {
        let (recorder, painter) = split(BufferConfig::scalar(32));
        let mut stream = DatumStream::new(painter).with_context(ChartContext::new());

        for v in [1, 2, 3, 4] {
            recorder.store_value(v);
            recorder.advance();
        }
        while stream.poll_next().is_ok() {}

        assert_eq!(stream.context().map(ChartContext::scroll), Some(3));
    }
}
