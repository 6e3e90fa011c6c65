//! Shared Per-Chart Scroll State
//!
//! Several traces can share one chart: a dual-trace strip chart runs two
//! buffers, a map chart one per sub-row. The chart's scroll position (how
//! far the virtual paper has moved) is common to all of them and must stay
//! consistent as each trace steps forward and rolls back.
//!
//! The context is an explicitly passed value, not ambient state: every call
//! site that moves the paper takes `&mut ChartContext`, so ownership and
//! update order are visible where they happen.

use crate::record::DataStep;

/// Scroll and offset counters shared by every trace on one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartContext {
    scroll: i64,
    reversals: u64,
    window_origin: usize,
}

impl ChartContext {
    /// Fresh context with the paper at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one consumer step into the scroll position.
    pub fn apply(&mut self, step: DataStep) {
        match step {
            DataStep::Forward => self.scroll += 1,
            DataStep::Reverse => {
                self.scroll -= 1;
                self.reversals += 1;
            }
            DataStep::NoNewData => {}
        }
    }

    /// Net forward steps delivered across the chart since reset.
    pub fn scroll(&self) -> i64 {
        self.scroll
    }

    /// Total rollback steps replayed, regardless of later forward motion.
    pub fn reversals(&self) -> u64 {
        self.reversals
    }

    /// Ring index where the visible window starts, set by the repaint path.
    pub fn window_origin(&self) -> usize {
        self.window_origin
    }

    /// Move the visible window origin (window resize or scroll-back).
    pub fn set_window_origin(&mut self, origin: usize) {
        self.window_origin = origin;
    }

    /// Zero everything at the start of a new inspection job.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_reverse_net_out() {
        let mut ctx = ChartContext::new();
        ctx.apply(DataStep::Forward);
        ctx.apply(DataStep::Forward);
        ctx.apply(DataStep::Reverse);
        ctx.apply(DataStep::NoNewData);

        assert_eq!(ctx.scroll(), 1);
        assert_eq!(ctx.reversals(), 1);
    }

    #[test]
    fn reset_clears_counters() {
        let mut ctx = ChartContext::new();
        ctx.apply(DataStep::Forward);
        ctx.set_window_origin(42);
        ctx.reset();
        assert_eq!(ctx, ChartContext::new());
    }
}
