//! Gate kinds and the catalog they are registered in.
//!
//! A [`GateKind`] is immutable metadata plus an evaluation rule. Built-in
//! kinds dispatch on [`Primitive`], kinds registered by callers carry a plain
//! function pointer. Both are pure: the same inputs always yield the same
//! outputs.

use std::{fmt, sync::Arc};

use crate::{truth::build_truth_table, CircuitError, TruthTable};

/// Built-in gate primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Primitive {
    Input,
    Output,
    And,
    And3,
    Or,
    Or3,
    Not,
    Xor,
    Xnor,
    Nor,
    Nand,
    Clock,
    HalfAdder,
    FullAdder,
}

impl Primitive {
    fn eval(self, i: &[bool]) -> Vec<bool> {
        match self {
            // Driven kinds never reach this path with a forced value.
            Primitive::Input | Primitive::Clock => vec![false],
            Primitive::Output => vec![i[0]],
            Primitive::And => vec![i[0] && i[1]],
            Primitive::And3 => vec![i[0] && i[1] && i[2]],
            Primitive::Or => vec![i[0] || i[1]],
            Primitive::Or3 => vec![i[0] || i[1] || i[2]],
            Primitive::Not => vec![!i[0]],
            Primitive::Xor => vec![i[0] ^ i[1]],
            Primitive::Xnor => vec![!(i[0] ^ i[1])],
            Primitive::Nor => vec![!(i[0] || i[1])],
            Primitive::Nand => vec![!(i[0] && i[1])],
            Primitive::HalfAdder => vec![i[0] ^ i[1], i[0] && i[1]],
            Primitive::FullAdder => {
                let (a, b, c) = (i[0], i[1], i[2]);
                vec![a ^ b ^ c, (a && b) || (c && (a ^ b))]
            }
        }
    }
}

/// Evaluation rule of a gate kind.
#[derive(Clone, Copy)]
pub enum Logic {
    /// A built-in primitive.
    Primitive(Primitive),
    /// A caller supplied pure function.
    Custom(fn(&[bool]) -> Vec<bool>),
}

impl fmt::Debug for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
            Logic::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Autonomous drivers an emitter kind can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitter {
    /// Toggles output 0 once per clock period, starting from `false`.
    Clock,
}

/// How the outputs of a kind are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drive {
    /// Outputs are computed from the inputs.
    Wired,
    /// Outputs are set by a direct user action.
    Toggle,
    /// Outputs are set by an external emitter.
    Emitter(Emitter),
}

#[derive(Debug)]
struct KindDef {
    id: String,
    name: String,
    description: String,
    inputs: usize,
    outputs: usize,
    logic: Logic,
    drive: Drive,
    sink: bool,
}

/// An immutable gate kind.
#[derive(Debug, Clone)]
pub struct GateKind(Arc<KindDef>);

impl GateKind {
    /// Creates a wired kind with a custom evaluation function.
    ///
    /// `evaluate` must be pure and return exactly `outputs` values for
    /// `inputs` values.
    pub fn custom(
        id: &str,
        name: &str,
        description: &str,
        inputs: usize,
        outputs: usize,
        evaluate: fn(&[bool]) -> Vec<bool>,
    ) -> Self {
        Self(Arc::new(KindDef {
            id: id.to_lowercase(),
            name: name.to_string(),
            description: description.to_string(),
            inputs,
            outputs,
            logic: Logic::Custom(evaluate),
            drive: Drive::Wired,
            sink: false,
        }))
    }

    fn builtin(
        id: &str,
        name: &str,
        description: &str,
        (inputs, outputs): (usize, usize),
        primitive: Primitive,
    ) -> Self {
        let drive = match primitive {
            Primitive::Input => Drive::Toggle,
            Primitive::Clock => Drive::Emitter(Emitter::Clock),
            _ => Drive::Wired,
        };

        Self(Arc::new(KindDef {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            inputs,
            outputs,
            logic: Logic::Primitive(primitive),
            drive,
            sink: primitive == Primitive::Output,
        }))
    }

    /// Returns the identifier.
    pub fn id(&self) -> &str {
        &self.0.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the description shown to players.
    pub fn description(&self) -> &str {
        &self.0.description
    }

    /// Returns the number of inputs.
    pub fn inputs(&self) -> usize {
        self.0.inputs
    }

    /// Returns the number of outputs.
    pub fn outputs(&self) -> usize {
        self.0.outputs
    }

    /// Returns the evaluation rule.
    pub fn logic(&self) -> Logic {
        self.0.logic
    }

    /// Returns the primitive if this is a built-in kind.
    pub fn primitive(&self) -> Option<Primitive> {
        match self.0.logic {
            Logic::Primitive(p) => Some(p),
            Logic::Custom(_) => None,
        }
    }

    /// Returns how the outputs are driven.
    pub fn drive(&self) -> Drive {
        self.0.drive
    }

    /// Returns `true` if the outputs are set by a user action.
    pub fn is_toggleable(&self) -> bool {
        matches!(self.0.drive, Drive::Toggle)
    }

    /// Returns `true` if the outputs are set by an emitter.
    pub fn is_emitting(&self) -> bool {
        matches!(self.0.drive, Drive::Emitter(_))
    }

    /// Returns `true` if the outputs are forced rather than computed.
    pub fn is_driven(&self) -> bool {
        !matches!(self.0.drive, Drive::Wired)
    }

    /// Returns `true` if the outputs of this kind cannot source a wire.
    pub fn is_sink(&self) -> bool {
        self.0.sink
    }

    /// Evaluates the kind.
    ///
    /// `forced` is consulted only for toggle and emitter kinds and is ignored
    /// for wired kinds. Driven kinds without a forced value evaluate to
    /// all-false.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` or `forced` do not match the kind's arity. The
    /// graph never evaluates with a mismatched arity.
    pub fn evaluate(&self, inputs: &[bool], forced: Option<&[bool]>) -> Vec<bool> {
        assert_eq!(
            inputs.len(),
            self.inputs(),
            "arity mismatch: kind {} takes {} inputs",
            self.id(),
            self.inputs()
        );

        let outputs = match (self.is_driven(), forced) {
            (true, Some(forced)) => {
                assert_eq!(
                    forced.len(),
                    self.outputs(),
                    "arity mismatch: kind {} drives {} outputs",
                    self.id(),
                    self.outputs()
                );
                forced.to_vec()
            }
            (true, None) => vec![false; self.outputs()],
            (false, _) => match self.0.logic {
                Logic::Primitive(p) => p.eval(inputs),
                Logic::Custom(f) => f(inputs),
            },
        };

        assert_eq!(
            outputs.len(),
            self.outputs(),
            "arity mismatch: kind {} produced {} outputs",
            self.id(),
            outputs.len()
        );

        outputs
    }

    /// Builds the truth table of this kind.
    pub fn truth_table(&self) -> TruthTable {
        build_truth_table(
            |inputs| self.evaluate(inputs, None),
            self.inputs(),
            self.outputs(),
        )
    }
}

impl PartialEq for GateKind {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for GateKind {}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Registry of gate kinds keyed by identifier.
#[derive(Debug, Clone)]
pub struct GateCatalog {
    kinds: Vec<GateKind>,
}

impl GateCatalog {
    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Creates a catalog with all built-in kinds.
    pub fn builtin() -> Self {
        let kinds = vec![
            GateKind::builtin(
                "input",
                "Input",
                "Click this gate to toggle its state.",
                (0, 1),
                Primitive::Input,
            ),
            GateKind::builtin(
                "output",
                "Output",
                "Connect wires to this gate in order to complete the level.",
                (1, 1),
                Primitive::Output,
            ),
            GateKind::builtin(
                "and",
                "AND",
                "This gate only turns on when both inputs are on.",
                (2, 1),
                Primitive::And,
            ),
            GateKind::builtin(
                "and3",
                "AND",
                "This gate only turns on when all inputs are on.",
                (3, 1),
                Primitive::And3,
            ),
            GateKind::builtin(
                "or",
                "OR",
                "This gate turns on when at least one input is on.",
                (2, 1),
                Primitive::Or,
            ),
            GateKind::builtin(
                "or3",
                "OR",
                "This gate turns on when at least one input is on.",
                (3, 1),
                Primitive::Or3,
            ),
            GateKind::builtin(
                "not",
                "NOT",
                "This gate inverts its input.",
                (1, 1),
                Primitive::Not,
            ),
            GateKind::builtin(
                "xor",
                "XOR",
                "This gate turns on when only one input is on.",
                (2, 1),
                Primitive::Xor,
            ),
            GateKind::builtin(
                "xnor",
                "XNOR",
                "This gate turns on when both inputs are the same.",
                (2, 1),
                Primitive::Xnor,
            ),
            GateKind::builtin(
                "nor",
                "NOR",
                "This gate turns on only when both inputs are off.",
                (2, 1),
                Primitive::Nor,
            ),
            GateKind::builtin(
                "nand",
                "NAND",
                "This gate turns on only when both inputs are not on.",
                (2, 1),
                Primitive::Nand,
            ),
            GateKind::builtin(
                "clock",
                "Clock",
                "This gate turns on and off at 1 second delays.",
                (0, 1),
                Primitive::Clock,
            ),
            GateKind::builtin(
                "halfadder",
                "Half Adder",
                "This circuit turns on the first output when the inputs are different, \
                 and turns on the second output when both inputs are on.",
                (2, 2),
                Primitive::HalfAdder,
            ),
            GateKind::builtin(
                "fulladder",
                "Full Adder",
                "This circuit turns on the first output when an odd number of inputs are on, \
                 and also turns on the second output when at least two inputs are on.",
                (3, 2),
                Primitive::FullAdder,
            ),
        ];

        Self { kinds }
    }

    /// Registers a new kind.
    ///
    /// Registered kinds are immutable, an identifier can only be registered
    /// once.
    pub fn register(&mut self, kind: GateKind) -> Result<(), CircuitError> {
        if self.kinds.iter().any(|k| k.id() == kind.id()) {
            return Err(CircuitError::duplicate_kind(kind.id()));
        }

        self.kinds.push(kind);

        Ok(())
    }

    /// Looks up a kind by identifier, ignoring case.
    pub fn lookup(&self, id: &str) -> Result<GateKind, CircuitError> {
        let id = id.to_lowercase();
        self.kinds
            .iter()
            .find(|k| k.id() == id)
            .cloned()
            .ok_or_else(|| CircuitError::unknown_kind(&id))
    }

    /// Returns an iterator over the kinds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &GateKind> {
        self.kinds.iter()
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns `true` if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for GateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
