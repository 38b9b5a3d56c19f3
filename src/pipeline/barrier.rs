//! Join barrier over the threads of one pipeline run.
//!
//! Each spawned stage signals completion once, on a shared channel, when its
//! runner returns. The orchestrator can wait for those signals with an
//! optional deadline, then join the threads to collect reports and surface
//! panics.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::shutdown::ShutdownSignal;
use crate::pipeline::stage::{StageName, StageReport};
use crossbeam_channel::{at, never, select, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// How a wait on a [`StageGroup`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every stage signalled completion.
    Completed,
    /// The deadline passed first.
    DeadlineExpired,
    /// The observed shutdown signal fired first.
    Stopped,
}

/// The set of threads launched for one run.
pub struct StageGroup {
    handles: Vec<(StageName, JoinHandle<StageReport>)>,
    done_tx: Option<Sender<StageName>>,
    done_rx: Receiver<StageName>,
    signalled: usize,
}

impl StageGroup {
    pub fn new() -> Self {
        let (done_tx, done_rx) = unbounded();
        Self {
            handles: Vec::new(),
            done_tx: Some(done_tx),
            done_rx,
            signalled: 0,
        }
    }

    /// Launch `runner` on a named thread.
    pub fn spawn<F>(&mut self, stage: StageName, runner: F) -> PipelineResult<()>
    where
        F: FnOnce() -> StageReport + Send + 'static,
    {
        let done_tx = self.done_tx.clone();
        let handle = thread::Builder::new()
            .name(format!("sumpipe-{}", stage))
            .spawn(move || {
                let report = runner();
                if let Some(tx) = done_tx {
                    let _ = tx.send(stage);
                }
                report
            })
            .map_err(|source| PipelineError::ThreadSpawn { stage, source })?;

        self.handles.push((stage, handle));
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Block until every stage has signalled completion.
    ///
    /// Returns `false` if `deadline` passed first. A stage that panicked
    /// never signals; once every live signaller is gone this returns `true`
    /// and [`join`](Self::join) reports the panic.
    pub fn wait_until(&mut self, deadline: Option<Instant>) -> bool {
        let idle = never();
        self.wait(deadline, &idle) == WaitOutcome::Completed
    }

    /// Like [`wait_until`](Self::wait_until), but also gives up when `stop`
    /// fires. `stop` is only observed, never triggered.
    pub fn wait_or_stop(
        &mut self,
        deadline: Option<Instant>,
        stop: &ShutdownSignal,
    ) -> WaitOutcome {
        if stop.is_triggered() {
            self.done_tx.take();
            return WaitOutcome::Stopped;
        }
        self.wait(deadline, stop.receiver())
    }

    fn wait(&mut self, deadline: Option<Instant>, stop: &Receiver<()>) -> WaitOutcome {
        // Drop our own sender so a disconnect means "no stage left to signal".
        self.done_tx.take();
        let timer = deadline.map(at).unwrap_or_else(never);

        while self.signalled < self.handles.len() {
            select! {
                recv(self.done_rx) -> msg => match msg {
                    Ok(stage) => {
                        tracing::trace!("{} signalled completion", stage);
                        self.signalled += 1;
                    }
                    // Every remaining signaller is gone (a stage panicked).
                    Err(_) => return WaitOutcome::Completed,
                },
                recv(stop) -> _ => return WaitOutcome::Stopped,
                recv(timer) -> _ => return WaitOutcome::DeadlineExpired,
            }
        }
        WaitOutcome::Completed
    }

    /// Join every thread. Reports come back in spawn order.
    pub fn join(self) -> PipelineResult<Vec<StageReport>> {
        let mut reports = Vec::with_capacity(self.handles.len());
        let mut panicked = None;

        for (stage, handle) in self.handles {
            match handle.join() {
                Ok(report) => reports.push(report),
                Err(_) => {
                    tracing::error!("Stage {} panicked", stage);
                    panicked.get_or_insert(stage);
                }
            }
        }

        match panicked {
            Some(stage) => Err(PipelineError::StagePanicked { stage }),
            None => Ok(reports),
        }
    }
}

impl Default for StageGroup {
    fn default() -> Self {
        Self::new()
    }
}
