//! Puzzle sessions.

use tracing::{debug, info};

use powerline_circuit::{
    check_solution, extra_gates, CircuitConfig, CircuitGraph, GateId, SolutionReport,
};

use crate::{Level, LevelError};

/// Result of submitting a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Index of the submitted level.
    pub level: usize,
    /// Per-row outcome of the check.
    pub report: SolutionReport,
    /// Gates used beyond the best known solution.
    pub extra_gates: i64,
}

impl Submission {
    /// Returns `true` if every row of the table matched.
    pub fn is_solved(&self) -> bool {
        self.report.passed()
    }

    /// Returns `true` if the solution is correct and uses no more gates than
    /// the best known one.
    pub fn is_perfect(&self) -> bool {
        self.is_solved() && self.extra_gates <= 0
    }
}

/// A level being played: the circuit with the level's fixed input and
/// output gates plus whatever the player placed.
#[derive(Debug)]
pub struct Puzzle {
    level: Level,
    graph: CircuitGraph,
    inputs: Vec<GateId>,
    outputs: Vec<GateId>,
}

impl Puzzle {
    /// Opens a level with a fresh circuit.
    pub fn new(level: Level, config: CircuitConfig) -> Result<Self, LevelError> {
        let mut graph = CircuitGraph::new(config);
        let table = level.table();

        let inputs = (0..table.num_inputs())
            .map(|i| graph.create_gate("input", Some(&input_name(i))))
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = (0..table.num_outputs())
            .map(|i| {
                let name = if table.num_outputs() == 1 {
                    "Output".to_string()
                } else {
                    format!("Output {}", i + 1)
                };
                graph.create_gate("output", Some(&name))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(level = level.name(), "opened puzzle");

        Ok(Self {
            level,
            graph,
            inputs,
            outputs,
        })
    }

    /// Returns the level.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Returns the circuit.
    pub fn graph(&self) -> &CircuitGraph {
        &self.graph
    }

    /// Returns the circuit for wiring and toggling.
    pub fn graph_mut(&mut self) -> &mut CircuitGraph {
        &mut self.graph
    }

    /// Returns the level's input gates in table column order.
    pub fn inputs(&self) -> &[GateId] {
        &self.inputs
    }

    /// Returns the level's output gates in table column order.
    pub fn outputs(&self) -> &[GateId] {
        &self.outputs
    }

    /// Places a gate of a permitted kind.
    pub fn place(&mut self, kind: &str) -> Result<GateId, LevelError> {
        let Some(kind) = self.level.permitted_kind(kind).cloned() else {
            return Err(LevelError::not_permitted(kind, self.level.name()));
        };

        Ok(self.graph.insert_gate(kind, None)?)
    }

    /// Removes a placed gate.
    pub fn remove(&mut self, gate: GateId) -> Result<(), LevelError> {
        if self.is_fixed(gate) {
            let name = self
                .graph
                .gate(gate)
                .map(|g| g.name().to_string())
                .unwrap_or_default();
            return Err(LevelError::fixed_gate(&name));
        }

        Ok(self.graph.remove_gate(gate)?)
    }

    /// Returns `true` for the level's own input and output gates.
    pub fn is_fixed(&self, gate: GateId) -> bool {
        self.inputs.contains(&gate) || self.outputs.contains(&gate)
    }

    /// Checks the circuit against the level's truth table.
    ///
    /// The circuit is left as it was before the check.
    pub fn submit(&mut self) -> Result<Submission, LevelError> {
        let report = check_solution(
            &mut self.graph,
            &self.inputs,
            &self.outputs,
            self.level.table(),
        )?;
        let extra_gates = extra_gates(
            self.graph.gate_count(),
            self.inputs.len(),
            self.outputs.len(),
            self.level.best(),
        );

        let submission = Submission {
            level: self.level.index(),
            report,
            extra_gates,
        };

        info!(
            level = self.level.name(),
            solved = submission.is_solved(),
            extra_gates,
            "submitted solution"
        );

        Ok(submission)
    }
}

/// `Input A`, `Input B`, ...
fn input_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Input {}", char::from(b'A' + i)),
        _ => format!("Input {}", index + 1),
    }
}
