//! Basic recording example
//!
//! Demonstrates the producer/consumer handle pair on a single thread:
//! peak-hold capture, committing positions, and walking the chart data
//! forward the way a repaint timer would.
//!
//! Run with: cargo run --example 01_basic_recording

use stripchart_core::{split, BufferConfig, DataStep, Datum};

fn main() {
    let (recorder, painter) = split(BufferConfig::scalar(256));

    // Each physical position sees several candidate samples before the
    // scanner moves on; only the most extreme survives.
    let sweeps: [&[i32]; 4] = [&[310, 340, 325], &[355], &[298, 301], &[362, 360]];
    for sweep in sweeps {
        for &sample in sweep {
            recorder.store_value(sample);
        }
        recorder.advance();
    }

    // The rendering side polls; each forward step is one new line segment.
    let mut datum = Datum::new();
    while painter.new_data_is_ready() {
        match painter.get_new_data(&mut datum) {
            DataStep::Forward => {
                println!(
                    "draw {:>4} -> {:>4}",
                    datum.prev_samples.first().copied().unwrap_or(0),
                    datum.new_value().unwrap_or(0),
                );
            }
            DataStep::Reverse => println!("roll back one position"),
            DataStep::NoNewData => break,
        }
    }

    let (peak, at) = painter.find_max_value(0, 4, true);
    println!("peak over the sweep: {} at position {}", peak, at);
}
