//! Integration tests for shutdown and run deadlines

mod common;

use common::{run_with_timeout, test_timeout, SAMPLE_BATCH};
use std::thread;
use std::time::Duration;
use sumpipe_rs::pipeline::{channel, StreamEvent};
use sumpipe_rs::{Pipeline, PipelineConfig, PipelineError, ShutdownSignal};

/// Long enough that a run is still going when a test stops it.
fn long_even_batch() -> Vec<i64> {
    vec![2; 2_000_000]
}

#[test]
fn test_shutdown_before_run_cancels_everything() {
    let signal = ShutdownSignal::new();
    signal.trigger();

    let err = Pipeline::default()
        .run_persistent_until(&SAMPLE_BATCH, &signal)
        .unwrap_err();
    match err {
        PipelineError::Cancelled { partial_total } => assert_eq!(partial_total, 0),
        other => panic!("expected cancellation, got {other}"),
    }
}

#[test]
fn test_shutdown_during_run_keeps_partial_total() {
    // Build the batch first so the run starts as soon as the trigger is armed.
    let batch = long_even_batch();
    let full_total = 4 * batch.len() as i64;

    let signal = ShutdownSignal::new();
    let trigger = signal.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        trigger.trigger();
    });

    let run_signal = signal.clone();
    let result = run_with_timeout(test_timeout(), move || {
        Pipeline::default().run_persistent_until(&batch, &run_signal)
    });

    match result {
        Err(PipelineError::Cancelled { partial_total }) => {
            assert!(partial_total > 0, "nothing accumulated before the stop");
            assert!(partial_total < full_total);
            assert_eq!(partial_total % 4, 0);
        }
        Ok(stats) => panic!("run finished before shutdown: {:?}", stats),
        Err(other) => panic!("unexpected error: {other}"),
    }
    assert!(signal.is_triggered());
}

#[test]
fn test_run_deadline_times_out() {
    let config = PipelineConfig::default().with_run_timeout(Duration::from_millis(1));
    let batch = long_even_batch();

    let result = run_with_timeout(test_timeout(), move || {
        Pipeline::new(config).run_persistent(&batch)
    });
    assert!(matches!(result, Err(PipelineError::Timeout { .. })));
}

#[test]
fn test_signal_survives_a_timed_out_run() {
    let config = PipelineConfig::default().with_run_timeout(Duration::from_millis(1));
    let batch = long_even_batch();
    let signal = ShutdownSignal::new();

    let run_signal = signal.clone();
    let result = run_with_timeout(test_timeout(), move || {
        Pipeline::new(config).run_persistent_until(&batch, &run_signal)
    });
    assert!(matches!(result, Err(PipelineError::Timeout { .. })));
    assert!(!signal.is_triggered());

    let stats = Pipeline::default()
        .run_persistent_until(&[2, 4], &signal)
        .unwrap();
    assert_eq!(stats.total, 20);
}

#[test]
fn test_closed_channel_reports_closed_not_a_value() {
    let signal = ShutdownSignal::new();
    let (tx, rx) = channel::<i64>(0);
    tx.close();
    assert_eq!(rx.recv(&signal), StreamEvent::Closed);
}
