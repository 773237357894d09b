//! Truth tables and solution checking.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CircuitError, CircuitGraph, GateId};

/// One row of a truth table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthRow {
    input: Vec<bool>,
    output: Vec<bool>,
}

impl TruthRow {
    /// Creates a new row.
    pub fn new(input: Vec<bool>, output: Vec<bool>) -> Self {
        Self { input, output }
    }

    /// Returns the input assignment.
    pub fn input(&self) -> &[bool] {
        &self.input
    }

    /// Returns the expected outputs.
    pub fn output(&self) -> &[bool] {
        &self.output
    }
}

/// A complete truth table.
///
/// Rows enumerate every input assignment in binary counter order, the last
/// input being the least significant bit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTable {
    num_inputs: usize,
    num_outputs: usize,
    rows: Vec<TruthRow>,
}

impl TruthTable {
    /// Creates a table from explicit rows.
    ///
    /// The rows must cover every input assignment exactly once, in binary
    /// counter order.
    pub fn from_rows(
        num_inputs: usize,
        num_outputs: usize,
        rows: Vec<TruthRow>,
    ) -> Result<Self, CircuitError> {
        if num_inputs >= usize::BITS as usize {
            return Err(CircuitError::invalid_table(format!(
                "{num_inputs} inputs is too many"
            )));
        }
        let expected = 1usize << num_inputs;

        if rows.len() != expected {
            return Err(CircuitError::invalid_table(format!(
                "expected {expected} rows, got {}",
                rows.len()
            )));
        }

        for (n, row) in rows.iter().enumerate() {
            if row.input.len() != num_inputs || row.output.len() != num_outputs {
                return Err(CircuitError::invalid_table(format!(
                    "row {n} does not have {num_inputs} inputs and {num_outputs} outputs"
                )));
            }
            if row.input != counter_bits(n, num_inputs) {
                return Err(CircuitError::invalid_table(format!(
                    "row {n} is out of order"
                )));
            }
        }

        Ok(Self {
            num_inputs,
            num_outputs,
            rows,
        })
    }

    /// Returns the number of inputs.
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Returns the number of outputs.
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[TruthRow] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the expected outputs for an input assignment.
    pub fn lookup(&self, input: &[bool]) -> Option<&[bool]> {
        self.rows
            .iter()
            .find(|row| row.input == input)
            .map(|row| row.output())
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header: Vec<String> = (0..self.num_inputs).map(input_label).collect();
        header.push("|".to_string());
        if self.num_outputs == 1 {
            header.push("Output".to_string());
        } else {
            header.extend((1..=self.num_outputs).map(|i| format!("O{i}")));
        }
        writeln!(f, "{}", header.join(" "))?;

        for row in &self.rows {
            let mut cells: Vec<&str> = row.input.iter().map(|b| bit(*b)).collect();
            cells.push("|");
            cells.extend(row.output.iter().map(|b| bit(*b)));
            writeln!(f, "{}", cells.join(" "))?;
        }

        Ok(())
    }
}

fn bit(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Column label of an input: `A`..`Z`, then `I26`, `I27`, ...
fn input_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => format!("I{index}"),
    }
}

fn counter_bits(n: usize, width: usize) -> Vec<bool> {
    (0..width).map(|i| (n >> (width - 1 - i)) & 1 == 1).collect()
}

/// Builds the truth table of an evaluation function.
///
/// # Panics
///
/// Panics if `evaluate` returns a vector whose length is not `num_outputs`,
/// or if `num_inputs` does not fit a row counter.
pub fn build_truth_table<F>(mut evaluate: F, num_inputs: usize, num_outputs: usize) -> TruthTable
where
    F: FnMut(&[bool]) -> Vec<bool>,
{
    assert!(
        num_inputs < usize::BITS as usize,
        "{num_inputs} inputs is too many for a truth table"
    );

    let len = 1usize << num_inputs;
    let mut input = vec![false; num_inputs];
    let mut rows = Vec::with_capacity(len);

    for _ in 0..len {
        let output = evaluate(&input);
        assert_eq!(
            output.len(),
            num_outputs,
            "arity mismatch: expected {num_outputs} outputs"
        );
        rows.push(TruthRow {
            input: input.clone(),
            output,
        });

        // Binary increment, last input least significant.
        for bit in input.iter_mut().rev() {
            *bit = !*bit;
            if *bit {
                break;
            }
        }
    }

    TruthTable {
        num_inputs,
        num_outputs,
        rows,
    }
}

/// Outcome of checking a circuit against a truth table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionReport {
    rows: Vec<bool>,
}

impl SolutionReport {
    /// Returns `true` if every row matched.
    pub fn passed(&self) -> bool {
        self.rows.iter().all(|pass| *pass)
    }

    /// Returns the per-row results in table order.
    pub fn rows(&self) -> &[bool] {
        &self.rows
    }

    /// Returns the indices of the rows that did not match.
    pub fn failed_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, pass)| !**pass)
            .map(|(n, _)| n)
    }
}

/// Checks a circuit against a truth table.
///
/// For every row the `inputs` gates are driven with the row's assignment and
/// input 0 of each `outputs` gate is compared with the expected value. All
/// rows are evaluated. Afterwards the input gates get their previous values
/// back, and subscribers only observe ports whose state differs from before
/// the check.
pub fn check_solution(
    graph: &mut CircuitGraph,
    inputs: &[GateId],
    outputs: &[GateId],
    table: &TruthTable,
) -> Result<SolutionReport, CircuitError> {
    if table.num_inputs() != inputs.len() || table.num_outputs() != outputs.len() {
        return Err(CircuitError::invalid_table(format!(
            "table has {} inputs and {} outputs, circuit has {} and {}",
            table.num_inputs(),
            table.num_outputs(),
            inputs.len(),
            outputs.len()
        )));
    }

    let mut saved = Vec::with_capacity(inputs.len());
    for &id in inputs {
        let gate = graph.try_gate(id)?;
        if !gate.kind().is_driven() || gate.kind().outputs() == 0 {
            return Err(CircuitError::not_drivable(format!(
                "{id} ({}) cannot be used as a level input",
                gate.kind().name()
            )));
        }
        saved.push(gate.forced().to_vec());
    }
    for &id in outputs {
        graph.input_state(id, 0)?;
    }

    let before = graph.power_states();

    let rows = graph.transact(|graph| {
        let mut rows = Vec::with_capacity(table.len());
        for row in table.rows() {
            for (&id, &value) in inputs.iter().zip(row.input()) {
                graph.set_forced_output(id, 0, value)?;
            }

            let mut pass = true;
            for (&id, &expected) in outputs.iter().zip(row.output()) {
                if graph.input_state(id, 0)? != expected {
                    pass = false;
                }
            }
            rows.push(pass);
        }

        for (&id, forced) in inputs.iter().zip(saved) {
            graph.force_outputs(id, forced)?;
        }
        graph.settle_changes(&before);

        Ok(rows)
    })?;

    let report = SolutionReport { rows };
    debug!(
        passed = report.passed(),
        failed = report.failed_rows().count(),
        "checked solution"
    );

    Ok(report)
}

/// Number of gates used beyond the best known solution.
///
/// Level input and output gates are not counted. Negative values beat the
/// best known solution.
pub fn extra_gates(total: usize, inputs: usize, outputs: usize, best: usize) -> i64 {
    total as i64 - inputs as i64 - outputs as i64 - best as i64
}
