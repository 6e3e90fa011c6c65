//! Integration tests for the producer/consumer protocol
//!
//! Exercises the public handle pair the way the real recorder does:
//! acquisition on one thread, rendering polls on another, including
//! rollbacks interleaved with fresh commits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use stripchart_core::{split, BufferConfig, DataStep, Datum, PeakDirection, RecordShape};

#[test]
fn peak_hold_capture_scenario() {
    // Size 8, MAX direction: store 5 then advance; store 3, 9, 2 then
    // advance. Positions 0 and 1 must hold 5 and 9, both committed.
    let (recorder, painter) = split(BufferConfig::new(
        8,
        RecordShape::Scalar,
        PeakDirection::Max,
    ));

    recorder.store_value(5);
    recorder.advance();
    recorder.store_value(3);
    recorder.store_value(9);
    recorder.store_value(2);
    recorder.advance();

    let mut datum = Datum::new();
    assert_eq!(painter.get_new_data(&mut datum), DataStep::Forward);
    assert_eq!(datum.new_value(), Some(9));
    assert_eq!(datum.prev_samples.first().copied(), Some(5));
    assert!(datum.new_flags.is_valid());
    assert!(datum.prev_flags.is_valid());
}

#[test]
fn segment_starts_after_debounce_and_dies_on_reset() {
    let (recorder, painter) = split(BufferConfig::scalar(64));

    // Reach ring index 2, mark the start there, then advance 15 times.
    recorder.store_value(1);
    recorder.advance();
    recorder.advance();
    recorder.mark_segment_start();
    assert!(!painter.segment_started());

    for _ in 0..15 {
        recorder.advance();
    }
    assert!(painter.segment_started());

    recorder.reset_all();
    assert!(!painter.segment_started());
}

#[test]
fn threaded_capture_with_rollbacks() {
    let (recorder, painter) = split(BufferConfig::scalar(1024));
    let done = Arc::new(AtomicBool::new(false));
    let done_flag = Arc::clone(&done);

    let producer = thread::spawn(move || {
        for i in 0..200i32 {
            recorder.store_value(i);
            recorder.advance();
            // Every tenth position: direction reversal, roll back and
            // re-record the position with a corrected value.
            if i % 10 == 0 {
                recorder.erase();
                recorder.store_value(i + 1000);
                recorder.advance();
            }
        }
        done_flag.store(true, Ordering::Release);
    });

    let mut datum = Datum::new();
    let mut forwards = 0u32;
    let mut reverses = 0u32;
    loop {
        match painter.get_new_data(&mut datum) {
            DataStep::Forward => forwards += 1,
            DataStep::Reverse => reverses += 1,
            DataStep::NoNewData => {
                if done.load(Ordering::Acquire) && !painter.new_data_is_ready() {
                    break;
                }
                thread::yield_now();
            }
        }
    }
    producer.join().expect("producer thread panicked");

    // One reverse per rollback, no matter how the polling interleaved, and
    // the net walk matches the committed positions.
    assert_eq!(reverses, 20);
    assert_eq!(forwards - reverses, 199);

    let stats = painter.stats();
    assert_eq!(stats.erasures, 20);
    assert_eq!(stats.advances, 220);

    // Replay the whole committed history and check every position holds the
    // corrected value where a rollback happened.
    painter.prepare_for_repaint(0);
    let mut values = Vec::new();
    while painter.get_data_at_repaint(&mut datum) == DataStep::Forward {
        values.push(datum.new_value().expect("repaint datum populated"));
    }
    assert_eq!(values.len(), 200);
    for (i, value) in values.iter().enumerate() {
        let expected = if i % 10 == 0 { i as i32 + 1000 } else { i as i32 };
        assert_eq!(*value, expected, "position {}", i);
    }
}

#[test]
fn minimum_wall_thickness_scan() {
    let (recorder, painter) = split(BufferConfig::new(
        8,
        RecordShape::Scalar,
        PeakDirection::Min,
    ));

    // Simulated wall thickness in mils; the thin spot is at position 5.
    for thickness in [312, 308, 310, 305, 309, 288, 307, 311] {
        recorder.store_value(thickness);
        recorder.advance();
    }

    let (min, at) = painter.find_min_value(0, 8, true);
    assert_eq!((min, at), (288, 5));

    // Scan bounds clamp instead of failing.
    let (min_clamped, _) = painter.find_min_value(0, 50_000, false);
    assert_eq!(min_clamped, 288);
}

#[test]
fn repaint_is_independent_of_live_extraction() {
    let (recorder, painter) = split(BufferConfig::scalar(16));
    for v in 0..6 {
        recorder.store_value(v);
        recorder.advance();
    }

    // Drain part of the live walk.
    let mut datum = Datum::new();
    assert_eq!(painter.get_new_data(&mut datum), DataStep::Forward);

    // A full repaint from position 1 does not disturb the extraction state.
    painter.prepare_for_repaint(1);
    let mut repainted = 0;
    while painter.get_data_at_repaint(&mut datum) == DataStep::Forward {
        repainted += 1;
    }
    assert_eq!(repainted, 5); // records 1..=5

    // The live walk resumes exactly where it left off.
    assert_eq!(painter.get_new_data(&mut datum), DataStep::Forward);
    assert_eq!(datum.new_value(), Some(2));
}
