//! Circuit graph: gate instances, their ports and the wires between them.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{Drive, GateCatalog, GateKind},
    config::{CircuitConfig, FeedbackPolicy},
    emitter::{EmitterDriver, EmitterHandle, ManualDriver},
    propagate::UndoLog,
    signal::{Listeners, PowerChange, Subscription},
    CircuitError,
};

/// Identifier of a gate instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GateId(u64);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gate#{}", self.0)
    }
}

/// Identifier of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WireId(u64);

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire#{}", self.0)
    }
}

/// One end of a prospective wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    /// An input port of a gate.
    Input {
        /// Owning gate.
        gate: GateId,
        /// Index of the port.
        index: usize,
    },
    /// An output port of a gate.
    Output {
        /// Owning gate.
        gate: GateId,
        /// Index of the port.
        index: usize,
    },
}

impl Port {
    /// Returns an input port reference.
    pub fn input(gate: GateId, index: usize) -> Self {
        Port::Input { gate, index }
    }

    /// Returns an output port reference.
    pub fn output(gate: GateId, index: usize) -> Self {
        Port::Output { gate, index }
    }

    /// Returns the owning gate.
    pub fn gate(&self) -> GateId {
        match *self {
            Port::Input { gate, .. } | Port::Output { gate, .. } => gate,
        }
    }

    /// Returns the port index.
    pub fn index(&self) -> usize {
        match *self {
            Port::Input { index, .. } | Port::Output { index, .. } => index,
        }
    }
}

/// Input port of a gate.
#[derive(Debug, Clone, Default)]
pub struct InputPort {
    pub(crate) wire: Option<WireId>,
    pub(crate) state: bool,
}

impl InputPort {
    /// Returns the incoming wire, if any.
    pub fn wire(&self) -> Option<WireId> {
        self.wire
    }

    /// Returns the current state, `false` when unconnected.
    pub fn state(&self) -> bool {
        self.state
    }
}

/// Output port of a gate.
#[derive(Debug, Clone, Default)]
pub struct OutputPort {
    pub(crate) wires: Vec<WireId>,
}

impl OutputPort {
    /// Returns the outgoing wires in connection order.
    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }
}

/// A gate placed in the circuit.
#[derive(Debug, Clone)]
pub struct GateInstance {
    id: GateId,
    kind: GateKind,
    name: String,
    pub(crate) inputs: Vec<InputPort>,
    pub(crate) outputs: Vec<OutputPort>,
    /// Cached output states.
    pub(crate) power: Vec<bool>,
    /// Forced output values, only read for driven kinds.
    pub(crate) forced: Vec<bool>,
}

impl GateInstance {
    fn new(id: GateId, kind: GateKind, name: Option<&str>) -> Self {
        Self {
            id,
            name: name.unwrap_or(kind.name()).to_string(),
            inputs: vec![InputPort::default(); kind.inputs()],
            outputs: vec![OutputPort::default(); kind.outputs()],
            power: vec![false; kind.outputs()],
            forced: vec![false; kind.outputs()],
            kind,
        }
    }

    /// Returns the gate id.
    pub fn id(&self) -> GateId {
        self.id
    }

    /// Returns the gate kind.
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input ports.
    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    /// Returns the output ports.
    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    /// Returns the cached output states.
    pub fn power(&self) -> &[bool] {
        &self.power
    }

    /// Returns the forced output values.
    pub fn forced(&self) -> &[bool] {
        &self.forced
    }

    /// Returns `true` if any output is on.
    pub fn is_powered(&self) -> bool {
        self.power.iter().any(|p| *p)
    }

    pub(crate) fn input_states(&self) -> Vec<bool> {
        self.inputs.iter().map(|port| port.state).collect()
    }

    /// Returns every wire touching this gate.
    pub(crate) fn wire_ids(&self) -> Vec<WireId> {
        self.inputs
            .iter()
            .filter_map(|port| port.wire)
            .chain(self.outputs.iter().flat_map(|port| port.wires.iter().copied()))
            .collect()
    }
}

/// A directed wire from an output port to an input port.
#[derive(Debug, Clone)]
pub struct Wire {
    id: WireId,
    pub(crate) source: (GateId, usize),
    pub(crate) target: (GateId, usize),
    pub(crate) state: bool,
}

impl Wire {
    /// Returns the wire id.
    pub fn id(&self) -> WireId {
        self.id
    }

    /// Returns the driving output port.
    pub fn source(&self) -> Port {
        Port::output(self.source.0, self.source.1)
    }

    /// Returns the driven input port.
    pub fn target(&self) -> Port {
        Port::input(self.target.0, self.target.1)
    }

    /// Returns the value carried by the wire.
    pub fn state(&self) -> bool {
        self.state
    }
}

/// A live circuit.
///
/// The graph owns all gates and wires and performs propagation
/// synchronously: every mutating method returns once the circuit has
/// settled. Failed operations leave the graph unchanged.
pub struct CircuitGraph {
    config: CircuitConfig,
    catalog: GateCatalog,
    pub(crate) gates: BTreeMap<GateId, GateInstance>,
    pub(crate) wires: BTreeMap<WireId, Wire>,
    pub(crate) next_gate: u64,
    pub(crate) next_wire: u64,
    pub(crate) listeners: Listeners,
    /// Transitions of the running transaction, delivered on commit.
    pub(crate) changes: Vec<PowerChange>,
    /// Transaction nesting depth.
    pub(crate) depth: usize,
    /// Gate evaluations of the running cascade.
    pub(crate) steps: usize,
    pub(crate) undo: UndoLog,
    driver: Box<dyn EmitterDriver>,
    emitters: HashMap<GateId, EmitterHandle>,
}

impl fmt::Debug for CircuitGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitGraph")
            .field("config", &self.config)
            .field("gates", &self.gates.len())
            .field("wires", &self.wires.len())
            .field("emitters", &self.emitters.len())
            .finish()
    }
}

impl Default for CircuitGraph {
    fn default() -> Self {
        Self::new(CircuitConfig::default())
    }
}

impl CircuitGraph {
    /// Creates an empty graph with the built-in catalog and a manual emitter
    /// driver.
    pub fn new(config: CircuitConfig) -> Self {
        Self {
            config,
            catalog: GateCatalog::builtin(),
            gates: BTreeMap::new(),
            wires: BTreeMap::new(),
            next_gate: 0,
            next_wire: 0,
            listeners: Listeners::default(),
            changes: Vec::new(),
            depth: 0,
            steps: 0,
            undo: UndoLog::default(),
            driver: Box::new(ManualDriver),
            emitters: HashMap::new(),
        }
    }

    /// Sets the catalog kinds are resolved from.
    pub fn with_catalog(mut self, catalog: GateCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Sets the driver used to start emitters.
    pub fn with_driver(mut self, driver: impl EmitterDriver + 'static) -> Self {
        self.driver = Box::new(driver);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    /// Returns a gate.
    pub fn gate(&self, id: GateId) -> Option<&GateInstance> {
        self.gates.get(&id)
    }

    /// Returns an iterator over all gates in creation order.
    pub fn gates(&self) -> impl Iterator<Item = &GateInstance> {
        self.gates.values()
    }

    /// Returns a wire.
    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    /// Returns an iterator over all wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    /// Returns the number of gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Returns the number of wires.
    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// Returns `true` if the gate has a running emitter handle.
    pub fn has_emitter(&self, id: GateId) -> bool {
        self.emitters.contains_key(&id)
    }

    /// Returns the state of an output port.
    pub fn output_state(&self, id: GateId, index: usize) -> Result<bool, CircuitError> {
        let gate = self.try_gate(id)?;
        gate.power.get(index).copied().ok_or_else(|| {
            CircuitError::invalid_port(format!("{id} has no output {index}"))
        })
    }

    /// Returns the state of an input port.
    pub fn input_state(&self, id: GateId, index: usize) -> Result<bool, CircuitError> {
        let gate = self.try_gate(id)?;
        gate.inputs
            .get(index)
            .map(|port| port.state)
            .ok_or_else(|| CircuitError::invalid_port(format!("{id} has no input {index}")))
    }

    pub(crate) fn try_gate(&self, id: GateId) -> Result<&GateInstance, CircuitError> {
        self.gates
            .get(&id)
            .ok_or_else(|| CircuitError::unknown_gate(id))
    }

    /// Creates a gate of the kind registered under `kind`.
    ///
    /// `name` overrides the kind's display name.
    pub fn create_gate(&mut self, kind: &str, name: Option<&str>) -> Result<GateId, CircuitError> {
        let kind = self.catalog.lookup(kind)?;
        self.insert_gate(kind, name)
    }

    /// Creates a gate of an already resolved kind.
    pub fn insert_gate(
        &mut self,
        kind: GateKind,
        name: Option<&str>,
    ) -> Result<GateId, CircuitError> {
        let id = self.transact(|graph| {
            let id = GateId(graph.next_gate);
            graph.next_gate += 1;
            graph.record_gate(id);
            graph
                .gates
                .insert(id, GateInstance::new(id, kind.clone(), name));
            graph.propagate_from(id)?;
            Ok(id)
        })?;

        if let Drive::Emitter(emitter) = kind.drive() {
            let handle = self.driver.start(id, emitter);
            self.emitters.insert(id, handle);
        }

        debug!(%id, kind = kind.id(), "created gate");

        Ok(id)
    }

    /// Removes a gate together with every wire touching it.
    ///
    /// Downstream gates see their inputs fall to `false` before the gate is
    /// discarded.
    pub fn remove_gate(&mut self, id: GateId) -> Result<(), CircuitError> {
        let wires = self.try_gate(id)?.wire_ids();

        self.transact(|graph| {
            for wire in wires {
                graph.detach(wire)?;
            }
            Ok(())
        })?;

        if let Some(handle) = self.emitters.remove(&id) {
            handle.stop();
        }
        self.listeners.remove_gate(id);
        self.gates.remove(&id);

        debug!(%id, "removed gate");

        Ok(())
    }

    /// Connects an output port to an input port.
    ///
    /// The ports may be given in either order. The input port immediately
    /// takes the source's state and the change is propagated.
    pub fn connect(&mut self, a: Port, b: Port) -> Result<WireId, CircuitError> {
        let (source, target) = match (a, b) {
            (Port::Output { gate, index }, Port::Input { gate: tg, index: ti })
            | (Port::Input { gate: tg, index: ti }, Port::Output { gate, index }) => {
                ((gate, index), (tg, ti))
            }
            (Port::Input { .. }, Port::Input { .. }) => {
                return Err(CircuitError::invalid_connection(
                    "cannot connect two input ports",
                ))
            }
            (Port::Output { .. }, Port::Output { .. }) => {
                return Err(CircuitError::invalid_connection(
                    "cannot connect two output ports",
                ))
            }
        };

        let source_gate = self.try_gate(source.0)?;
        if source.1 >= source_gate.outputs.len() {
            return Err(CircuitError::invalid_port(format!(
                "{} has no output {}",
                source.0, source.1
            )));
        }
        if source_gate.kind.is_sink() {
            return Err(CircuitError::invalid_connection(format!(
                "{} gates cannot drive wires",
                source_gate.kind.name()
            )));
        }
        let state = source_gate.power[source.1];

        let target_gate = self.try_gate(target.0)?;
        let Some(target_port) = target_gate.inputs.get(target.1) else {
            return Err(CircuitError::invalid_port(format!(
                "{} has no input {}",
                target.0, target.1
            )));
        };
        if let Some(wire) = target_port.wire {
            return Err(CircuitError::invalid_connection(format!(
                "input {} of {} is already driven by {wire}",
                target.1, target.0
            )));
        }

        if source.0 == target.0 {
            return Err(CircuitError::invalid_connection(format!(
                "{} cannot be wired to itself",
                source.0
            )));
        }
        if self.config.feedback() == FeedbackPolicy::Reject && self.reaches(target.0, source.0) {
            return Err(CircuitError::invalid_connection(format!(
                "wiring {} into {} would create a feedback loop",
                source.0, target.0
            )));
        }

        let id = self.transact(|graph| {
            let id = WireId(graph.next_wire);
            graph.next_wire += 1;
            graph.record_wire(id);
            graph.record_gate(source.0);
            graph.record_gate(target.0);
            graph.wires.insert(
                id,
                Wire {
                    id,
                    source,
                    target,
                    state,
                },
            );
            if let Some(gate) = graph.gates.get_mut(&source.0) {
                gate.outputs[source.1].wires.push(id);
            }
            if let Some(gate) = graph.gates.get_mut(&target.0) {
                let port = &mut gate.inputs[target.1];
                port.wire = Some(id);
                port.state = state;
            }
            graph.propagate_from(target.0)?;
            Ok(id)
        })?;

        debug!(%id, from = %source.0, to = %target.0, "connected wire");

        Ok(id)
    }

    /// Removes a wire. The driven input falls back to `false`.
    pub fn disconnect(&mut self, id: WireId) -> Result<(), CircuitError> {
        if !self.wires.contains_key(&id) {
            return Err(CircuitError::unknown_wire(id));
        }

        self.transact(|graph| graph.detach(id))?;

        debug!(%id, "disconnected wire");

        Ok(())
    }

    /// Removes every wire touching a gate, keeping the gate itself.
    pub fn disconnect_all(&mut self, id: GateId) -> Result<(), CircuitError> {
        let wires = self.try_gate(id)?.wire_ids();

        self.transact(|graph| {
            for wire in wires {
                graph.detach(wire)?;
            }
            Ok(())
        })
    }

    /// Sets the forced value of an output of a toggle or emitter gate.
    pub fn set_forced_output(
        &mut self,
        id: GateId,
        index: usize,
        value: bool,
    ) -> Result<(), CircuitError> {
        let gate = self.try_gate(id)?;
        if !gate.kind.is_driven() {
            return Err(CircuitError::not_drivable(format!(
                "{} gates cannot be driven directly",
                gate.kind.name()
            )));
        }

        let mut forced = gate.forced.clone();
        let Some(slot) = forced.get_mut(index) else {
            return Err(CircuitError::invalid_port(format!(
                "{id} has no output {index}"
            )));
        };
        *slot = value;

        self.force_outputs(id, forced)
    }

    /// Sets an input gate's output, the presentation layer's toggle action.
    pub fn set_input(&mut self, id: GateId, index: usize, value: bool) -> Result<(), CircuitError> {
        self.set_forced_output(id, index, value)
    }

    /// Flips a toggle gate: an unpowered gate turns every output on,
    /// a powered one turns them off. Returns the new value.
    pub fn toggle(&mut self, id: GateId) -> Result<bool, CircuitError> {
        let gate = self.try_gate(id)?;
        if !gate.kind.is_toggleable() {
            return Err(CircuitError::not_drivable(format!(
                "{} gates cannot be toggled",
                gate.kind.name()
            )));
        }

        let value = !gate.is_powered();
        let forced = vec![value; gate.forced.len()];
        self.force_outputs(id, forced)?;

        Ok(value)
    }

    /// Applies an emission to an emitter gate.
    pub fn emit(&mut self, id: GateId, values: &[bool]) -> Result<(), CircuitError> {
        let gate = self.try_gate(id)?;
        if !gate.kind.is_emitting() {
            return Err(CircuitError::not_drivable(format!(
                "{} gates do not emit",
                gate.kind.name()
            )));
        }
        if values.len() != gate.forced.len() {
            return Err(CircuitError::invalid_port(format!(
                "{id} has {} outputs, emission has {}",
                gate.forced.len(),
                values.len()
            )));
        }

        self.force_outputs(id, values.to_vec())
    }

    /// Subscribes to transitions of an output port.
    ///
    /// Callbacks fire synchronously in registration order after the
    /// operation causing the transition has settled.
    pub fn on_output_changed<F>(
        &mut self,
        id: GateId,
        index: usize,
        callback: F,
    ) -> Result<Subscription, CircuitError>
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.output_state(id, index)?;
        Ok(self.listeners.subscribe(id, index, Box::new(callback)))
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    pub(crate) fn force_outputs(&mut self, id: GateId, forced: Vec<bool>) -> Result<(), CircuitError> {
        self.transact(|graph| {
            graph.record_gate(id);
            if let Some(gate) = graph.gates.get_mut(&id) {
                gate.forced = forced;
            }
            graph.propagate_from(id)
        })
    }

    fn detach(&mut self, id: WireId) -> Result<(), CircuitError> {
        let Some(wire) = self.wires.get(&id) else {
            return Ok(());
        };
        let (source, (target, index)) = (wire.source, wire.target);

        self.record_wire(id);
        self.record_gate(source.0);
        self.record_gate(target);
        self.wires.remove(&id);

        if let Some(gate) = self.gates.get_mut(&source.0) {
            gate.outputs[source.1].wires.retain(|w| *w != id);
        }

        if let Some(gate) = self.gates.get_mut(&target) {
            let port = &mut gate.inputs[index];
            port.wire = None;
            port.state = false;
        }

        self.propagate_from(target)
    }

    /// Returns `true` if `to` is reachable from `from` along wires.
    fn reaches(&self, from: GateId, to: GateId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();

        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(gate) = self.gates.get(&id) {
                stack.extend(
                    gate.outputs
                        .iter()
                        .flat_map(|port| port.wires.iter())
                        .filter_map(|wire| self.wires.get(wire))
                        .map(|wire| wire.target.0),
                );
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rstest::{fixture, rstest};

    #[fixture]
    fn graph() -> CircuitGraph {
        CircuitGraph::default()
    }

    #[rstest]
    fn test_create_gate(mut graph: CircuitGraph) {
        let id = graph.create_gate("fulladder", None).unwrap();
        let gate = graph.gate(id).unwrap();

        assert_eq!(gate.name(), "Full Adder");
        assert_eq!(gate.inputs().len(), 3);
        assert_eq!(gate.outputs().len(), 2);
        assert_eq!(gate.power(), [false, false]);
    }

    #[rstest]
    fn test_create_gate_evaluates(mut graph: CircuitGraph) {
        let id = graph.create_gate("not", Some("inverter")).unwrap();

        assert_eq!(graph.gate(id).unwrap().name(), "inverter");
        assert!(graph.output_state(id, 0).unwrap());
    }

    #[rstest]
    fn test_create_unknown_kind(mut graph: CircuitGraph) {
        let err = graph.create_gate("mux", None).unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::UnknownKind);
        assert_eq!(graph.gate_count(), 0);
    }

    #[rstest]
    fn test_connect_propagates_immediately(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let output = graph.create_gate("output", None).unwrap();
        graph.set_input(input, 0, true).unwrap();

        graph
            .connect(Port::output(input, 0), Port::input(output, 0))
            .unwrap();

        assert!(graph.input_state(output, 0).unwrap());
        assert!(graph.output_state(output, 0).unwrap());
    }

    #[rstest]
    fn test_connect_either_order(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();

        let id = graph
            .connect(Port::input(not, 0), Port::output(input, 0))
            .unwrap();
        let wire = graph.wire(id).unwrap();

        assert_eq!(wire.source(), Port::output(input, 0));
        assert_eq!(wire.target(), Port::input(not, 0));
    }

    #[rstest]
    fn test_fan_out(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let a = graph.create_gate("not", None).unwrap();
        let b = graph.create_gate("not", None).unwrap();
        graph
            .connect(Port::output(input, 0), Port::input(a, 0))
            .unwrap();
        graph
            .connect(Port::output(input, 0), Port::input(b, 0))
            .unwrap();

        graph.toggle(input).unwrap();

        assert_eq!(graph.gate(input).unwrap().outputs()[0].wires().len(), 2);
        assert!(!graph.output_state(a, 0).unwrap());
        assert!(!graph.output_state(b, 0).unwrap());
    }

    #[rstest]
    fn test_disconnect_resets_and_propagates(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();
        let and = graph.create_gate("and", None).unwrap();

        graph.set_input(input, 0, true).unwrap();
        let wire = graph
            .connect(Port::output(input, 0), Port::input(and, 0))
            .unwrap();
        graph
            .connect(Port::output(input, 0), Port::input(and, 1))
            .unwrap();
        graph
            .connect(Port::output(and, 0), Port::input(not, 0))
            .unwrap();
        assert!(!graph.output_state(not, 0).unwrap());

        graph.disconnect(wire).unwrap();

        assert!(!graph.input_state(and, 0).unwrap());
        assert!(!graph.output_state(and, 0).unwrap());
        assert!(graph.output_state(not, 0).unwrap());
        assert!(graph.wire(wire).is_none());
        assert_eq!(graph.gate(input).unwrap().outputs()[0].wires().len(), 1);
    }

    #[rstest]
    fn test_disconnect_unknown(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();
        let wire = graph
            .connect(Port::output(input, 0), Port::input(not, 0))
            .unwrap();
        graph.disconnect(wire).unwrap();

        let err = graph.disconnect(wire).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownWire);
    }

    #[rstest]
    #[case::two_inputs(true)]
    #[case::two_outputs(false)]
    fn test_connect_same_polarity(mut graph: CircuitGraph, #[case] inputs: bool) {
        let x = graph.create_gate("and", None).unwrap();
        let y = graph.create_gate("and", None).unwrap();
        let (a, b) = if inputs {
            (Port::input(x, 0), Port::input(y, 0))
        } else {
            (Port::output(x, 0), Port::output(y, 0))
        };

        let err = graph.connect(a, b).unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::InvalidConnection);
        assert_eq!(graph.wire_count(), 0);
    }

    #[rstest]
    fn test_connect_occupied_input(mut graph: CircuitGraph) {
        let a = graph.create_gate("input", None).unwrap();
        let b = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();
        graph.set_input(b, 0, true).unwrap();
        graph.connect(Port::output(a, 0), Port::input(not, 0)).unwrap();

        let err = graph
            .connect(Port::output(b, 0), Port::input(not, 0))
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::InvalidConnection);
        assert_eq!(graph.wire_count(), 1);
        assert!(!graph.input_state(not, 0).unwrap());
        assert!(graph.gate(b).unwrap().outputs()[0].wires().is_empty());
    }

    #[rstest]
    fn test_connect_self_loop(mut graph: CircuitGraph) {
        let and = graph.create_gate("and", None).unwrap();

        let err = graph
            .connect(Port::output(and, 0), Port::input(and, 1))
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::InvalidConnection);
    }

    #[rstest]
    fn test_connect_feedback_loop_rejected(mut graph: CircuitGraph) {
        let a = graph.create_gate("not", None).unwrap();
        let b = graph.create_gate("not", None).unwrap();
        graph.connect(Port::output(a, 0), Port::input(b, 0)).unwrap();

        let err = graph
            .connect(Port::output(b, 0), Port::input(a, 0))
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::InvalidConnection);
        assert_eq!(graph.wire_count(), 1);
    }

    #[rstest]
    fn test_connect_from_sink(mut graph: CircuitGraph) {
        let output = graph.create_gate("output", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();

        let err = graph
            .connect(Port::output(output, 0), Port::input(not, 0))
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::InvalidConnection);
    }

    #[rstest]
    fn test_connect_invalid_port(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();

        let err = graph
            .connect(Port::output(input, 0), Port::input(not, 1))
            .unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::InvalidPort);
    }

    #[rstest]
    fn test_remove_gate_removes_wires(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();
        let a = graph.create_gate("output", None).unwrap();
        let b = graph.create_gate("output", None).unwrap();
        graph
            .connect(Port::output(input, 0), Port::input(not, 0))
            .unwrap();
        graph.connect(Port::output(not, 0), Port::input(a, 0)).unwrap();
        graph.connect(Port::output(not, 0), Port::input(b, 0)).unwrap();
        assert!(graph.input_state(a, 0).unwrap());

        graph.remove_gate(not).unwrap();

        assert_eq!(graph.wire_count(), 0);
        assert!(graph.gate(not).is_none());
        assert!(graph.gate(input).unwrap().outputs()[0].wires().is_empty());
        for id in [a, b] {
            let gate = graph.gate(id).unwrap();
            assert!(gate.inputs()[0].wire().is_none());
            assert!(!gate.inputs()[0].state());
            assert!(!gate.is_powered());
        }
    }

    #[rstest]
    fn test_disconnect_all(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();
        let output = graph.create_gate("output", None).unwrap();
        graph
            .connect(Port::output(input, 0), Port::input(not, 0))
            .unwrap();
        graph
            .connect(Port::output(not, 0), Port::input(output, 0))
            .unwrap();

        graph.disconnect_all(not).unwrap();

        assert_eq!(graph.wire_count(), 0);
        assert!(graph.gate(not).is_some());
        assert!(!graph.input_state(output, 0).unwrap());
    }

    #[rstest]
    fn test_set_forced_output_not_drivable(mut graph: CircuitGraph) {
        let and = graph.create_gate("and", None).unwrap();

        let err = graph.set_forced_output(and, 0, true).unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::NotDrivable);
        assert!(!graph.output_state(and, 0).unwrap());
    }

    #[rstest]
    fn test_toggle(mut graph: CircuitGraph) {
        let input = graph.create_gate("input", None).unwrap();

        assert!(graph.toggle(input).unwrap());
        assert!(graph.output_state(input, 0).unwrap());
        assert!(!graph.toggle(input).unwrap());
        assert!(!graph.output_state(input, 0).unwrap());
    }

    #[rstest]
    fn test_emit(mut graph: CircuitGraph) {
        let clock = graph.create_gate("clock", None).unwrap();
        let not = graph.create_gate("not", None).unwrap();
        graph
            .connect(Port::output(clock, 0), Port::input(not, 0))
            .unwrap();

        graph.emit(clock, &[true]).unwrap();
        assert!(!graph.output_state(not, 0).unwrap());

        let err = graph.emit(not, &[true]).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotDrivable);
        let err = graph.toggle(clock).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotDrivable);
    }
}
