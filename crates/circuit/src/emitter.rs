//! Autonomous output drivers.
//!
//! Emitter gates change their outputs on their own. The graph never runs
//! them itself: it asks an [`EmitterDriver`] to start one when an emitter
//! gate is created and stops the returned [`EmitterHandle`] when the gate is
//! removed. Emissions have to be applied back through
//! [`CircuitGraph::emit`](crate::CircuitGraph::emit).

use std::{future::Future, time::Duration};

use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{catalog::Emitter, GateId};

/// New output values produced by an emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Emitting gate.
    pub gate: GateId,
    /// Values for every output of the gate.
    pub values: Vec<bool>,
}

/// Stop handle of a started emitter.
///
/// Dropping the handle stops the emitter as well.
#[derive(Debug)]
pub struct EmitterHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl EmitterHandle {
    /// Returns a handle with nothing running behind it.
    pub fn inert() -> Self {
        Self {
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Spawns the future built by `f` on `runtime`.
    pub fn spawn<F, Fut>(runtime: &Handle, f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let task = runtime.spawn(f(cancel.clone()));

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Returns `true` once the emitter was told to stop.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns a token cancelled when the emitter stops.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops the emitter.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for EmitterHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Starts emitters for newly created emitter gates.
pub trait EmitterDriver: Send {
    /// Starts the emitter of `gate`.
    fn start(&mut self, gate: GateId, emitter: Emitter) -> EmitterHandle;
}

/// Driver that never emits on its own.
///
/// Emitter gates are driven exclusively by explicit
/// [`CircuitGraph::emit`](crate::CircuitGraph::emit) calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualDriver;

impl EmitterDriver for ManualDriver {
    fn start(&mut self, _gate: GateId, _emitter: Emitter) -> EmitterHandle {
        EmitterHandle::inert()
    }
}

/// Drives a clock: one emission per `period`, alternating between on and
/// off and starting with on after the first period.
///
/// The clock keeps its own phase. Values forced onto the gate through
/// [`CircuitGraph::set_forced_output`](crate::CircuitGraph::set_forced_output)
/// do not shift it, so the next emission may repeat the current value and
/// cause no transition.
///
/// Returns when `cancel` fires or `sink` rejects an emission.
pub async fn run_clock<F>(gate: GateId, period: Duration, cancel: CancellationToken, mut sink: F)
where
    F: FnMut(Emission) -> bool,
{
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut value = false;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                value = !value;
                if !sink(Emission { gate, values: vec![value] }) {
                    break;
                }
            }
        }
    }

    trace!(%gate, "clock stopped");
}
