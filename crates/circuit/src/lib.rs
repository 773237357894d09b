//! Logic circuit graph with push-based power propagation.
//!
//! Gates are instantiated from a [`GateCatalog`], wired together inside a
//! [`CircuitGraph`] and re-evaluated as soon as one of their inputs changes.
//! Every graph operation settles the circuit before it returns and is atomic:
//! on error the graph is left exactly as it was.
//!
//! ```
//! use powerline_circuit::{CircuitGraph, Port};
//!
//! let mut graph = CircuitGraph::default();
//! let input = graph.create_gate("input", None).unwrap();
//! let not = graph.create_gate("not", None).unwrap();
//! graph.connect(Port::output(input, 0), Port::input(not, 0)).unwrap();
//!
//! assert!(graph.output_state(not, 0).unwrap());
//! graph.toggle(input).unwrap();
//! assert!(!graph.output_state(not, 0).unwrap());
//! ```

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod emitter;
mod error;
pub mod graph;
mod propagate;
pub mod runtime;
pub mod signal;
pub mod truth;

pub use catalog::{Drive, Emitter, GateCatalog, GateKind, Logic, Primitive};
pub use config::{CircuitConfig, CircuitConfigBuilder, CircuitConfigBuilderError, FeedbackPolicy};
pub use emitter::{Emission, EmitterDriver, EmitterHandle, ManualDriver};
pub use error::{CircuitError, ErrorKind};
pub use graph::{CircuitGraph, GateId, GateInstance, InputPort, OutputPort, Port, Wire, WireId};
pub use runtime::{Event, Simulation, SimulationHandle};
pub use signal::{PowerChange, Subscription};
pub use truth::{
    build_truth_table, check_solution, extra_gates, SolutionReport, TruthRow, TruthTable,
};
