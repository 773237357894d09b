use std::sync::{Arc, Mutex};

use powerline_circuit::{
    build_truth_table, check_solution, CircuitGraph, ErrorKind, GateCatalog, GateId, GateKind,
    Port, TruthTable,
};

fn table(kind: &str) -> TruthTable {
    GateCatalog::builtin().lookup(kind).unwrap().truth_table()
}

/// Inputs A and B wired into `kind`, its output wired into a level output.
fn level_with(graph: &mut CircuitGraph, kind: &str) -> (Vec<GateId>, Vec<GateId>) {
    let a = graph.create_gate("input", None).unwrap();
    let b = graph.create_gate("input", None).unwrap();
    let out = graph.create_gate("output", None).unwrap();
    let gate = graph.create_gate(kind, None).unwrap();
    graph.connect(Port::output(a, 0), Port::input(gate, 0)).unwrap();
    graph.connect(Port::output(b, 0), Port::input(gate, 1)).unwrap();
    graph
        .connect(Port::output(gate, 0), Port::input(out, 0))
        .unwrap();
    (vec![a, b], vec![out])
}

#[test]
fn test_correct_solution_passes() {
    let mut graph = CircuitGraph::default();
    let (inputs, outputs) = level_with(&mut graph, "and");

    let report = check_solution(&mut graph, &inputs, &outputs, &table("and")).unwrap();

    assert!(report.passed());
    assert_eq!(report.rows(), [true; 4]);
}

#[test]
fn test_wrong_solution_reports_every_row() {
    let mut graph = CircuitGraph::default();
    let (inputs, outputs) = level_with(&mut graph, "or");

    let report = check_solution(&mut graph, &inputs, &outputs, &table("xor")).unwrap();

    assert!(!report.passed());
    assert_eq!(report.failed_rows().collect::<Vec<_>>(), vec![3]);
}

#[test]
fn test_nand_from_and_and_not() {
    let mut graph = CircuitGraph::default();
    let a = graph.create_gate("input", None).unwrap();
    let b = graph.create_gate("input", None).unwrap();
    let out = graph.create_gate("output", None).unwrap();
    let and = graph.create_gate("and", None).unwrap();
    let not = graph.create_gate("not", None).unwrap();
    graph.connect(Port::output(a, 0), Port::input(and, 0)).unwrap();
    graph.connect(Port::output(b, 0), Port::input(and, 1)).unwrap();
    graph
        .connect(Port::output(and, 0), Port::input(not, 0))
        .unwrap();
    graph
        .connect(Port::output(not, 0), Port::input(out, 0))
        .unwrap();

    let report = check_solution(&mut graph, &[a, b], &[out], &table("nand")).unwrap();

    assert!(report.passed());
}

#[test]
fn test_inputs_restored_after_check() {
    let mut graph = CircuitGraph::default();
    let (inputs, outputs) = level_with(&mut graph, "and");
    let side_in = graph.create_gate("input", None).unwrap();
    let side_not = graph.create_gate("not", None).unwrap();
    let side_out = graph.create_gate("output", None).unwrap();
    graph
        .connect(Port::output(side_in, 0), Port::input(side_not, 0))
        .unwrap();
    graph
        .connect(Port::output(side_not, 0), Port::input(side_out, 0))
        .unwrap();
    graph.toggle(side_in).unwrap();
    graph.set_input(inputs[0], 0, true).unwrap();
    let before: Vec<_> = graph.gates().map(|g| g.power().to_vec()).collect();

    check_solution(&mut graph, &inputs, &outputs, &table("and")).unwrap();

    let after: Vec<_> = graph.gates().map(|g| g.power().to_vec()).collect();
    assert_eq!(before, after);
    assert!(graph.gate(inputs[0]).unwrap().forced()[0]);
    assert!(!graph.gate(inputs[1]).unwrap().forced()[0]);
    assert!(graph.gate(side_in).unwrap().forced()[0]);
    assert!(graph.output_state(side_in, 0).unwrap());
    assert!(!graph.output_state(side_not, 0).unwrap());
    assert!(!graph.input_state(side_out, 0).unwrap());
}

#[test]
fn test_check_is_silent_when_nothing_changes() {
    let mut graph = CircuitGraph::default();
    let (inputs, outputs) = level_with(&mut graph, "xor");
    let calls = Arc::new(Mutex::new(Vec::new()));
    for &id in inputs.iter().chain(&outputs) {
        let calls = calls.clone();
        graph
            .on_output_changed(id, 0, move |value| calls.lock().unwrap().push((id, value)))
            .unwrap();
    }

    check_solution(&mut graph, &inputs, &outputs, &table("xor")).unwrap();

    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_table_arity_mismatch() {
    let mut graph = CircuitGraph::default();
    let (inputs, outputs) = level_with(&mut graph, "and");

    let err = check_solution(&mut graph, &inputs, &outputs, &table("not")).unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::InvalidTable);
}

#[test]
fn test_non_drivable_level_input() {
    let mut graph = CircuitGraph::default();
    let (mut inputs, outputs) = level_with(&mut graph, "and");
    inputs[1] = graph.create_gate("not", None).unwrap();

    let err = check_solution(&mut graph, &inputs, &outputs, &table("and")).unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::NotDrivable);
}

#[test]
fn test_custom_kind() {
    let mut catalog = GateCatalog::builtin();
    catalog
        .register(GateKind::custom(
            "majority",
            "MAJ",
            "This gate turns on when most inputs are on.",
            3,
            1,
            |i: &[bool]| vec![(i[0] as u8 + i[1] as u8 + i[2] as u8) >= 2],
        ))
        .unwrap();
    let mut graph = CircuitGraph::default().with_catalog(catalog);

    let inputs: Vec<_> = (0..3)
        .map(|_| graph.create_gate("input", None).unwrap())
        .collect();
    let out = graph.create_gate("output", None).unwrap();
    let maj = graph.create_gate("MAJORITY", None).unwrap();
    for (n, &input) in inputs.iter().enumerate() {
        graph
            .connect(Port::output(input, 0), Port::input(maj, n))
            .unwrap();
    }
    graph
        .connect(Port::output(maj, 0), Port::input(out, 0))
        .unwrap();

    let expected = build_truth_table(
        |i| vec![(i[0] && i[1]) || (i[2] && (i[0] || i[1]))],
        3,
        1,
    );
    let report = check_solution(&mut graph, &inputs, &[out], &expected).unwrap();

    assert!(report.passed());
}
