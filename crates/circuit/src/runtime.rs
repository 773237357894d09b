//! Event-driven simulation on top of a [`CircuitGraph`].
//!
//! The graph itself is single-threaded. A [`Simulation`] owns it together
//! with an event queue; clocks and other producers only ever send events,
//! and every event is applied to the graph in arrival order.

use std::time::Duration;

use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, warn};

use crate::{
    catalog::Emitter,
    emitter::{run_clock, Emission, EmitterDriver, EmitterHandle},
    CircuitConfig, CircuitError, CircuitGraph, GateCatalog, GateId,
};

/// An input to a running simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An emitter produced new output values.
    Emit(Emission),
    /// Sets the output of a toggle gate.
    SetInput {
        /// Target gate.
        gate: GateId,
        /// Output index.
        index: usize,
        /// New value.
        value: bool,
    },
    /// Flips a toggle gate.
    Toggle {
        /// Target gate.
        gate: GateId,
    },
    /// Stops the simulation.
    Shutdown,
}

/// Driver that runs emitters as tokio tasks feeding the event queue.
#[derive(Debug)]
struct QueueDriver {
    events: mpsc::UnboundedSender<Event>,
    period: Duration,
}

impl EmitterDriver for QueueDriver {
    fn start(&mut self, gate: GateId, emitter: Emitter) -> EmitterHandle {
        let Ok(runtime) = Handle::try_current() else {
            warn!(%gate, "no tokio runtime available, emitter is not started");
            return EmitterHandle::inert();
        };

        match emitter {
            Emitter::Clock => {
                let events = self.events.clone();
                let period = self.period;
                EmitterHandle::spawn(&runtime, move |cancel| {
                    run_clock(gate, period, cancel, move |emission| {
                        events.send(Event::Emit(emission)).is_ok()
                    })
                })
            }
        }
    }
}

/// Sending half of a simulation's event queue.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    events: mpsc::UnboundedSender<Event>,
}

impl SimulationHandle {
    /// Queues an event.
    pub fn send(&self, event: Event) -> Result<(), CircuitError> {
        self.events.send(event).map_err(|_| CircuitError::closed())
    }

    /// Queues setting an input gate's output.
    pub fn set_input(&self, gate: GateId, index: usize, value: bool) -> Result<(), CircuitError> {
        self.send(Event::SetInput { gate, index, value })
    }

    /// Queues toggling an input gate.
    pub fn toggle(&self, gate: GateId) -> Result<(), CircuitError> {
        self.send(Event::Toggle { gate })
    }

    /// Queues a shutdown.
    pub fn shutdown(&self) -> Result<(), CircuitError> {
        self.send(Event::Shutdown)
    }
}

/// A circuit graph driven by an event queue.
#[derive(Debug)]
pub struct Simulation {
    graph: CircuitGraph,
    events: mpsc::UnboundedReceiver<Event>,
    handle: SimulationHandle,
}

impl Simulation {
    /// Creates a simulation with the built-in catalog.
    pub fn new(config: CircuitConfig) -> Self {
        Self::with_catalog(config, GateCatalog::builtin())
    }

    /// Creates a simulation resolving kinds from `catalog`.
    pub fn with_catalog(config: CircuitConfig, catalog: GateCatalog) -> Self {
        let (sender, events) = mpsc::unbounded_channel();
        let driver = QueueDriver {
            events: sender.clone(),
            period: config.clock_period(),
        };
        let graph = CircuitGraph::new(config)
            .with_catalog(catalog)
            .with_driver(driver);

        Self {
            graph,
            events,
            handle: SimulationHandle { events: sender },
        }
    }

    /// Returns a handle for queueing events.
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    /// Returns the graph.
    pub fn graph(&self) -> &CircuitGraph {
        &self.graph
    }

    /// Returns the graph for editing.
    pub fn graph_mut(&mut self) -> &mut CircuitGraph {
        &mut self.graph
    }

    /// Consumes the simulation, returning the graph.
    ///
    /// Emitters keep their handles and stop when the graph is dropped, but
    /// their events are no longer delivered.
    pub fn into_graph(self) -> CircuitGraph {
        self.graph
    }

    /// Applies a single event to the graph.
    ///
    /// Returns `Ok(false)` for [`Event::Shutdown`].
    pub fn apply(&mut self, event: Event) -> Result<bool, CircuitError> {
        match event {
            Event::Emit(Emission { gate, values }) => self.graph.emit(gate, &values)?,
            Event::SetInput { gate, index, value } => self.graph.set_input(gate, index, value)?,
            Event::Toggle { gate } => {
                self.graph.toggle(gate)?;
            }
            Event::Shutdown => {
                debug!("simulation shutting down");
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn dispatch(&mut self, event: Event) -> bool {
        match self.apply(event) {
            Ok(running) => running,
            Err(err) => {
                warn!("dropping event: {err}");
                true
            }
        }
    }

    /// Applies every event already queued without waiting.
    ///
    /// Returns the number of events taken from the queue.
    pub fn process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            count += 1;
            if !self.dispatch(event) {
                break;
            }
        }
        count
    }

    /// Waits for the next event and applies it.
    ///
    /// Returns `false` once the simulation should stop.
    pub async fn step(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => self.dispatch(event),
            None => false,
        }
    }

    /// Applies events until a shutdown, then returns the graph.
    pub async fn run(mut self) -> CircuitGraph {
        while self.step().await {}
        self.graph
    }
}
