//! Stage-to-stage channels with an explicit end-of-stream event.
//!
//! Each channel has exactly one [`StageSender`]. Closing is done by
//! consuming it with [`StageSender::close`] (or dropping it), so a channel
//! can never be closed twice or written after close.
//!
//! Capacity `0` gives a rendezvous channel: every send blocks until a
//! receiver takes the value. Capacity `N` buffers up to `N` values.

use crate::pipeline::shutdown::ShutdownSignal;
use crossbeam_channel::{bounded, select, Receiver, Sender};

/// What a receive observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent<T> {
    /// A value produced upstream.
    Value(T),
    /// The sender closed and every buffered value has been drained.
    Closed,
    /// The shutdown signal fired while waiting.
    Interrupted,
}

/// Result of a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The receiving side is gone; the value was dropped.
    Disconnected,
    /// The shutdown signal fired before a receiver took the value.
    Interrupted,
}

/// Create a channel holding at most `capacity` in-flight values.
pub fn channel<T>(capacity: usize) -> (StageSender<T>, StageReceiver<T>) {
    let (tx, rx) = bounded(capacity);
    (StageSender { tx }, StageReceiver { rx })
}

/// Producing half. Owned by exactly one stage.
pub struct StageSender<T> {
    tx: Sender<T>,
}

impl<T> StageSender<T> {
    /// Block until the value is taken, the receiver is gone, or `shutdown` fires.
    pub fn send(&self, value: T, shutdown: &ShutdownSignal) -> Delivery {
        if shutdown.is_triggered() {
            return Delivery::Interrupted;
        }
        let stop = shutdown.receiver();
        select! {
            send(self.tx, value) -> res => match res {
                Ok(()) => Delivery::Sent,
                Err(_) => Delivery::Disconnected,
            },
            recv(stop) -> _ => Delivery::Interrupted,
        }
    }

    /// Send with a bound on how long to wait for room.
    #[cfg(test)]
    pub(crate) fn send_timeout(
        &self,
        value: T,
        timeout: std::time::Duration,
    ) -> Result<(), crossbeam_channel::SendTimeoutError<T>> {
        self.tx.send_timeout(value, timeout)
    }

    /// Signal that no more values will be produced.
    pub fn close(self) {}
}

/// Consuming half.
pub struct StageReceiver<T> {
    rx: Receiver<T>,
}

impl<T> StageReceiver<T> {
    /// Block until a value arrives, the channel is closed and drained, or
    /// `shutdown` fires.
    pub fn recv(&self, shutdown: &ShutdownSignal) -> StreamEvent<T> {
        if shutdown.is_triggered() {
            return StreamEvent::Interrupted;
        }
        let stop = shutdown.receiver();
        select! {
            recv(self.rx) -> msg => match msg {
                Ok(v) => StreamEvent::Value(v),
                Err(_) => StreamEvent::Closed,
            },
            recv(stop) -> _ => StreamEvent::Interrupted,
        }
    }

    /// Like [`recv`](Self::recv) without a shutdown token, but gives up at
    /// `deadline`. Returns `None` on expiry.
    #[cfg(test)]
    pub(crate) fn recv_deadline(&self, deadline: std::time::Instant) -> Option<StreamEvent<T>> {
        use crossbeam_channel::RecvTimeoutError;
        match self.rx.recv_deadline(deadline) {
            Ok(v) => Some(StreamEvent::Value(v)),
            Err(RecvTimeoutError::Disconnected) => Some(StreamEvent::Closed),
            Err(RecvTimeoutError::Timeout) => None,
        }
    }

    /// Collect every remaining value until the channel closes.
    #[cfg(test)]
    pub(crate) fn drain(&self) -> Vec<T> {
        self.rx.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::SendTimeoutError;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_fifo_then_closed() {
        let signal = ShutdownSignal::new();
        let (tx, rx) = channel(3);

        assert_eq!(tx.send(1, &signal), Delivery::Sent);
        assert_eq!(tx.send(2, &signal), Delivery::Sent);
        assert_eq!(tx.send(3, &signal), Delivery::Sent);
        tx.close();

        assert_eq!(rx.recv(&signal), StreamEvent::Value(1));
        assert_eq!(rx.recv(&signal), StreamEvent::Value(2));
        assert_eq!(rx.recv(&signal), StreamEvent::Value(3));
        assert_eq!(rx.recv(&signal), StreamEvent::Closed);
        // Closed is sticky
        assert_eq!(rx.recv(&signal), StreamEvent::Closed);
    }

    #[test]
    fn test_rendezvous_send_needs_a_reader() {
        let (tx, rx) = channel::<i64>(0);

        // Nobody is receiving: the send can only time out.
        let err = tx.send_timeout(7, Duration::from_millis(20)).unwrap_err();
        assert!(matches!(err, SendTimeoutError::Timeout(7)));

        let reader = thread::spawn(move || rx.recv(&ShutdownSignal::new()));
        assert_eq!(tx.send(7, &ShutdownSignal::new()), Delivery::Sent);
        assert_eq!(reader.join().unwrap(), StreamEvent::Value(7));
    }

    #[test]
    fn test_send_beyond_capacity_without_reader_blocks() {
        let (tx, _rx) = channel::<&str>(2);
        tx.send_timeout("hello", Duration::from_millis(10)).unwrap();
        tx.send_timeout("hello world", Duration::from_millis(10))
            .unwrap();

        let third = tx.send_timeout("hello my compatriot", Duration::from_millis(50));
        assert!(matches!(third, Err(SendTimeoutError::Timeout(_))));
    }

    #[test]
    fn test_send_to_dropped_receiver_is_disconnected() {
        let (tx, rx) = channel::<i64>(1);
        drop(rx);
        assert_eq!(tx.send(1, &ShutdownSignal::new()), Delivery::Disconnected);
    }

    #[test]
    fn test_shutdown_interrupts_blocked_recv() {
        let signal = ShutdownSignal::new();
        let (tx, rx) = channel::<i64>(0);
        let waiter = signal.clone();
        let handle = thread::spawn(move || rx.recv(&waiter));

        thread::sleep(Duration::from_millis(20));
        signal.trigger();

        assert_eq!(handle.join().unwrap(), StreamEvent::Interrupted);
        drop(tx);
    }

    #[test]
    fn test_triggered_signal_wins_over_ready_value() {
        let signal = ShutdownSignal::new();
        let (tx, rx) = channel(1);
        assert_eq!(tx.send(5, &signal), Delivery::Sent);

        signal.trigger();
        assert_eq!(rx.recv(&signal), StreamEvent::Interrupted);
        assert_eq!(tx.send(6, &signal), Delivery::Interrupted);
    }

    #[test]
    fn test_recv_deadline() {
        let (tx, rx) = channel::<i64>(1);
        let soon = Instant::now() + Duration::from_millis(10);
        assert_eq!(rx.recv_deadline(soon), None);

        tx.close();
        let later = Instant::now() + Duration::from_millis(10);
        assert_eq!(rx.recv_deadline(later), Some(StreamEvent::Closed));
    }
}
