//! Threaded capture example
//!
//! The intended deployment shape: acquisition owns the `Recorder` on its own
//! thread while the main thread polls the `Painter` on a redraw cadence,
//! handling rollbacks as the scan head reverses.
//!
//! Run with: cargo run --example 02_threaded_capture

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use stripchart_core::{split, BufferConfig, ChartContext, DataStep, Datum};

fn main() {
    let (recorder, painter) = split(BufferConfig::scalar(4096));
    let done = Arc::new(AtomicBool::new(false));
    let done_flag = Arc::clone(&done);

    let acquisition = thread::spawn(move || {
        for position in 0..500i32 {
            // A few peak-hold candidates per position.
            for jitter in [0, 7, 3] {
                recorder.store_value(300 + (position % 40) + jitter);
            }
            recorder.store_clock((position % 360) as u16);
            recorder.advance();

            // Occasional direction reversal: un-record the position.
            if position % 97 == 0 && position > 0 {
                recorder.erase();
                recorder.store_value(300 + (position % 40));
                recorder.advance();
            }
        }
        done_flag.store(true, Ordering::Release);
    });

    let mut datum = Datum::new();
    let mut ctx = ChartContext::new();
    loop {
        match painter.get_new_data_with(&mut datum, &mut ctx) {
            DataStep::Forward | DataStep::Reverse => {}
            DataStep::NoNewData => {
                if done.load(Ordering::Acquire) && !painter.new_data_is_ready() {
                    break;
                }
                // Stand in for the GUI redraw timer.
                thread::sleep(Duration::from_millis(1));
            }
        }
    }
    acquisition.join().expect("acquisition thread panicked");

    let stats = painter.stats();
    println!(
        "scrolled {} positions ({} rollbacks replayed)",
        ctx.scroll(),
        ctx.reversals(),
    );
    println!(
        "stats: {} stores, {} peak updates, {} advances, {} erasures",
        stats.stores, stats.peak_updates, stats.advances, stats.erasures,
    );
}
