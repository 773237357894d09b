//! Push-based propagation and transactional rollback.
//!
//! A gate whose inputs changed is re-evaluated immediately. Every output
//! whose cached state changed is pushed along its wires in connection order,
//! depth first. Wires already carrying the pushed value stop the cascade.
//!
//! Transactions keep an undo log holding the first recorded state of every
//! gate and wire they touch, so rolling back costs as much as the operation
//! did and committing costs nothing.

use std::{collections::BTreeMap, mem};

use tracing::{trace, warn};

use crate::{
    config::FeedbackPolicy,
    graph::{GateInstance, Wire},
    signal::PowerChange,
    CircuitError, CircuitGraph, GateId, WireId,
};

/// Pre-transaction state of everything a transaction touched. `None`
/// marks entries that did not exist.
#[derive(Debug, Default)]
pub(crate) struct UndoLog {
    pub(crate) gates: BTreeMap<GateId, Option<GateInstance>>,
    pub(crate) wires: BTreeMap<WireId, Option<Wire>>,
    next_gate: u64,
    next_wire: u64,
}

impl CircuitGraph {
    /// Runs `f` as one atomic operation.
    ///
    /// On error the graph is restored to its state before the outermost
    /// transaction and no notification is delivered. On success the queued
    /// transitions are delivered to subscribers. Nested calls join the
    /// enclosing transaction.
    pub(crate) fn transact<T, F>(&mut self, f: F) -> Result<T, CircuitError>
    where
        F: FnOnce(&mut Self) -> Result<T, CircuitError>,
    {
        if self.depth > 0 {
            return f(self);
        }

        self.undo = UndoLog {
            next_gate: self.next_gate,
            next_wire: self.next_wire,
            ..UndoLog::default()
        };
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        let undo = mem::take(&mut self.undo);

        match result {
            Ok(value) => {
                self.flush();
                Ok(value)
            }
            Err(err) => {
                self.rollback(undo);
                self.changes.clear();
                Err(err)
            }
        }
    }

    /// Records the current state of a gate before its first change in the
    /// running transaction.
    pub(crate) fn record_gate(&mut self, id: GateId) {
        if self.depth == 0 {
            return;
        }
        if !self.undo.gates.contains_key(&id) {
            let before = self.gates.get(&id).cloned();
            self.undo.gates.insert(id, before);
        }
    }

    /// Records the current state of a wire before its first change in the
    /// running transaction.
    pub(crate) fn record_wire(&mut self, id: WireId) {
        if self.depth == 0 {
            return;
        }
        if !self.undo.wires.contains_key(&id) {
            let before = self.wires.get(&id).cloned();
            self.undo.wires.insert(id, before);
        }
    }

    fn rollback(&mut self, undo: UndoLog) {
        for (id, before) in undo.gates {
            match before {
                Some(gate) => self.gates.insert(id, gate),
                None => self.gates.remove(&id),
            };
        }
        for (id, before) in undo.wires {
            match before {
                Some(wire) => self.wires.insert(id, wire),
                None => self.wires.remove(&id),
            };
        }
        self.next_gate = undo.next_gate;
        self.next_wire = undo.next_wire;
    }

    fn flush(&mut self) {
        for change in mem::take(&mut self.changes) {
            self.listeners.notify(&change);
        }
    }

    /// Returns the cached outputs of every gate.
    pub(crate) fn power_states(&self) -> Vec<(GateId, Vec<bool>)> {
        self.gates
            .iter()
            .map(|(id, gate)| (*id, gate.power.clone()))
            .collect()
    }

    /// Replaces the queued transitions with the net difference to `before`.
    pub(crate) fn settle_changes(&mut self, before: &[(GateId, Vec<bool>)]) {
        self.changes.clear();
        for (id, power) in before {
            let Some(gate) = self.gates.get(id) else {
                continue;
            };
            for (index, (old, new)) in power.iter().zip(&gate.power).enumerate() {
                if old != new {
                    self.changes.push(PowerChange {
                        gate: *id,
                        index,
                        value: *new,
                    });
                }
            }
        }
    }

    /// Starts a cascade at `id`.
    pub(crate) fn propagate_from(&mut self, id: GateId) -> Result<(), CircuitError> {
        self.steps = 0;
        self.evaluate_gate(id)
    }

    fn evaluate_gate(&mut self, id: GateId) -> Result<(), CircuitError> {
        // Without feedback loops every cascade terminates on its own.
        if self.config().feedback() == FeedbackPolicy::Allow {
            let limit = self.config().max_propagation_steps();
            self.steps += 1;
            if self.steps > limit {
                warn!(%id, limit, "propagation did not settle");
                return Err(CircuitError::unstable(format!(
                    "propagation did not settle within {limit} gate evaluations"
                )));
            }
        }

        let Some(gate) = self.gates.get(&id) else {
            return Ok(());
        };

        let inputs = gate.input_states();
        let forced = gate.kind().is_driven().then_some(gate.forced.as_slice());
        let next = gate.kind().evaluate(&inputs, forced);

        let changed: Vec<usize> = gate
            .power
            .iter()
            .zip(&next)
            .enumerate()
            .filter(|(_, (cached, value))| cached != value)
            .map(|(index, _)| index)
            .collect();

        if changed.is_empty() {
            return Ok(());
        }

        self.record_gate(id);
        if let Some(gate) = self.gates.get_mut(&id) {
            for &index in &changed {
                gate.power[index] = next[index];
            }
        }
        self.changes.extend(changed.iter().map(|&index| PowerChange {
            gate: id,
            index,
            value: next[index],
        }));

        trace!(%id, ?changed, "gate outputs changed");

        for index in changed {
            // Re-read: a feedback loop may have changed the port again.
            let Some(gate) = self.gates.get(&id) else {
                return Ok(());
            };
            let value = gate.power[index];
            let wires = gate.outputs[index].wires.clone();

            for wire in wires {
                self.drive_wire(wire, value)?;
            }
        }

        Ok(())
    }

    fn drive_wire(&mut self, id: WireId, value: bool) -> Result<(), CircuitError> {
        let Some(wire) = self.wires.get(&id) else {
            return Ok(());
        };
        if wire.state == value {
            return Ok(());
        }
        let (target, index) = wire.target;

        self.record_wire(id);
        self.record_gate(target);
        if let Some(wire) = self.wires.get_mut(&id) {
            wire.state = value;
        }
        if let Some(gate) = self.gates.get_mut(&target) {
            gate.inputs[index].state = value;
        }

        self.evaluate_gate(target)
    }
}
