//! Output change subscriptions.

use std::{collections::HashMap, fmt};

use crate::GateId;

/// A transition of an output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerChange {
    /// Gate owning the port.
    pub gate: GateId,
    /// Output index.
    pub index: usize,
    /// New state.
    pub value: bool,
}

/// Handle returned when subscribing to an output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    gate: GateId,
    index: usize,
}

impl Subscription {
    /// Returns the observed gate.
    pub fn gate(&self) -> GateId {
        self.gate
    }

    /// Returns the observed output index.
    pub fn index(&self) -> usize {
        self.index
    }
}

type Callback = Box<dyn FnMut(bool) + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    ports: HashMap<(GateId, usize), Vec<(u64, Callback)>>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, gate: GateId, index: usize, callback: Callback) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.ports
            .entry((gate, index))
            .or_default()
            .push((id, callback));

        Subscription { id, gate, index }
    }

    pub(crate) fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let key = (subscription.gate, subscription.index);
        let Some(callbacks) = self.ports.get_mut(&key) else {
            return false;
        };

        let len = callbacks.len();
        callbacks.retain(|(id, _)| *id != subscription.id);
        let removed = callbacks.len() != len;
        if callbacks.is_empty() {
            self.ports.remove(&key);
        }

        removed
    }

    /// Calls every subscriber of the changed port in registration order.
    pub(crate) fn notify(&mut self, change: &PowerChange) {
        if let Some(callbacks) = self.ports.get_mut(&(change.gate, change.index)) {
            for (_, callback) in callbacks.iter_mut() {
                callback(change.value);
            }
        }
    }

    pub(crate) fn remove_gate(&mut self, gate: GateId) {
        self.ports.retain(|(id, _), _| *id != gate);
    }

    pub(crate) fn len(&self) -> usize {
        self.ports.values().map(Vec::len).sum()
    }
}
