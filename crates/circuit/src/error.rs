use core::fmt;
use std::error::Error;

use crate::{GateId, WireId};

/// A circuit error.
#[derive(Debug, thiserror::Error)]
pub struct CircuitError {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl CircuitError {
    pub(crate) fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn unknown_kind(id: &str) -> Self {
        Self::new(ErrorKind::UnknownKind, format!("no gate kind named {id:?}"))
    }

    pub(crate) fn duplicate_kind(id: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateKind,
            format!("gate kind {id:?} is already registered"),
        )
    }

    pub(crate) fn unknown_gate(id: GateId) -> Self {
        Self::new(ErrorKind::UnknownGate, format!("gate {id} does not exist"))
    }

    pub(crate) fn unknown_wire(id: WireId) -> Self {
        Self::new(ErrorKind::UnknownWire, format!("wire {id} does not exist"))
    }

    pub(crate) fn invalid_port(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPort, msg.into())
    }

    pub(crate) fn invalid_connection(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConnection, msg.into())
    }

    pub(crate) fn not_drivable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotDrivable, msg.into())
    }

    pub(crate) fn invalid_table(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTable, msg.into())
    }

    pub(crate) fn unstable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unstable, msg.into())
    }

    pub(crate) fn closed() -> Self {
        Self {
            kind: ErrorKind::Closed,
            source: None,
        }
    }
}

/// Kinds of [`CircuitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The catalog has no kind with the requested identifier.
    UnknownKind,
    /// A kind with the same identifier is already registered.
    DuplicateKind,
    /// The referenced gate does not exist.
    UnknownGate,
    /// The referenced wire does not exist.
    UnknownWire,
    /// A port index is out of range for its gate.
    InvalidPort,
    /// A wire would violate the port polarity, occupancy or loop rules.
    InvalidConnection,
    /// The gate's output cannot be driven directly.
    NotDrivable,
    /// A truth table does not fit the circuit or is malformed.
    InvalidTable,
    /// Propagation did not settle within the configured bound.
    Unstable,
    /// The simulation event queue is closed.
    Closed,
}

impl fmt::Display for CircuitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::UnknownKind => write!(f, "unknown kind error")?,
            ErrorKind::DuplicateKind => write!(f, "duplicate kind error")?,
            ErrorKind::UnknownGate => write!(f, "unknown gate error")?,
            ErrorKind::UnknownWire => write!(f, "unknown wire error")?,
            ErrorKind::InvalidPort => write!(f, "invalid port error")?,
            ErrorKind::InvalidConnection => write!(f, "invalid connection error")?,
            ErrorKind::NotDrivable => write!(f, "not drivable error")?,
            ErrorKind::InvalidTable => write!(f, "invalid table error")?,
            ErrorKind::Unstable => write!(f, "unstable circuit error")?,
            ErrorKind::Closed => write!(f, "simulation closed error")?,
        }

        if let Some(ref source) = self.source {
            write!(f, " caused by: {}", source)?;
        }

        Ok(())
    }
}
