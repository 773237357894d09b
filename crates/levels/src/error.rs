use core::fmt;
use std::error::Error;

use powerline_circuit::CircuitError;

/// A level error.
#[derive(Debug, thiserror::Error)]
pub struct LevelError {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl LevelError {
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

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg.into())
    }

    pub(crate) fn not_permitted(kind: &str, level: &str) -> Self {
        Self::new(
            ErrorKind::NotPermitted,
            format!("{kind:?} gates cannot be used in {level:?}"),
        )
    }

    pub(crate) fn fixed_gate(name: &str) -> Self {
        Self::new(
            ErrorKind::FixedGate,
            format!("{name:?} belongs to the level and cannot be removed"),
        )
    }

    pub(crate) fn unknown_level(index: usize) -> Self {
        Self::new(ErrorKind::UnknownLevel, format!("no level {index}"))
    }
}

/// Kinds of [`LevelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The level pack could not be parsed or is inconsistent.
    Config,
    /// A circuit operation failed.
    Circuit,
    /// The gate kind is not permitted in the level.
    NotPermitted,
    /// The gate is one of the level's fixed inputs or outputs.
    FixedGate,
    /// The level does not exist.
    UnknownLevel,
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Config => write!(f, "config error")?,
            ErrorKind::Circuit => write!(f, "circuit error")?,
            ErrorKind::NotPermitted => write!(f, "not permitted error")?,
            ErrorKind::FixedGate => write!(f, "fixed gate error")?,
            ErrorKind::UnknownLevel => write!(f, "unknown level error")?,
        }

        if let Some(ref source) = self.source {
            write!(f, " caused by: {}", source)?;
        }

        Ok(())
    }
}

impl From<CircuitError> for LevelError {
    fn from(value: CircuitError) -> Self {
        Self::new(ErrorKind::Circuit, value)
    }
}

impl From<toml::de::Error> for LevelError {
    fn from(value: toml::de::Error) -> Self {
        Self::new(ErrorKind::Config, value)
    }
}
