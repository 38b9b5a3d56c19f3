//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

use crossbeam_channel::bounded;
use std::thread;
use std::time::Duration;

/// The batch the optimized driver feeds through the pipeline.
pub const SAMPLE_BATCH: [i64; 14] = [1, 2, 3, 4, 5, 6, 7, 7, 7, 10, 100, 1000, 2000, 3000];

/// Total expected for [`SAMPLE_BATCH`]: 4 + 16 + 36 + 100 + 10000.
pub const SAMPLE_TOTAL: i64 = 10_156;

/// Upper bound for any single pipeline run in these tests.
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Sequential reference for the pipeline's rules.
pub fn expected_total(batch: &[i64], threshold: i64) -> i64 {
    batch
        .iter()
        .filter(|v| *v % 2 == 0)
        .map(|&v| i128::from(v) * i128::from(v))
        .filter(|&sq| sq < i128::from(threshold))
        .map(|sq| sq as i64)
        .sum()
}

/// Run `f` on its own thread and fail the test if it does not finish in time.
///
/// A hung pipeline leaves its thread behind; the test still fails promptly.
pub fn run_with_timeout<T, F>(timeout: Duration, f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(timeout)
        .unwrap_or_else(|_| panic!("pipeline did not finish within {:?}", timeout))
}
