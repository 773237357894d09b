use powerline_circuit::{CircuitConfig, GateId, Port};
use powerline_levels::{Campaign, ErrorKind, LevelPack, Puzzle};

fn wire(puzzle: &mut Puzzle, from: GateId, to: GateId, input: usize) {
    puzzle
        .graph_mut()
        .connect(Port::output(from, 0), Port::input(to, input))
        .unwrap();
}

/// Builds the best known solution of each built-in level.
fn solve(puzzle: &mut Puzzle) {
    let inputs = puzzle.inputs().to_vec();
    let out = puzzle.outputs()[0];

    match puzzle.level().name() {
        "Basic Connection" => wire(puzzle, inputs[0], out, 0),
        "The NOT Gate" => {
            let not = puzzle.place("not").unwrap();
            wire(puzzle, inputs[0], not, 0);
            wire(puzzle, not, out, 0);
        }
        "The AND Gate" | "The OR Gate" => {
            let kind = if puzzle.level().name() == "The AND Gate" {
                "and"
            } else {
                "or"
            };
            let gate = puzzle.place(kind).unwrap();
            wire(puzzle, inputs[0], gate, 0);
            wire(puzzle, inputs[1], gate, 1);
            wire(puzzle, gate, out, 0);
        }
        "The NAND Gate" => {
            let and = puzzle.place("and").unwrap();
            let not = puzzle.place("not").unwrap();
            wire(puzzle, inputs[0], and, 0);
            wire(puzzle, inputs[1], and, 1);
            wire(puzzle, and, not, 0);
            wire(puzzle, not, out, 0);
        }
        "Combining OR Gates" => {
            let first = puzzle.place("or").unwrap();
            let second = puzzle.place("or").unwrap();
            wire(puzzle, inputs[0], first, 0);
            wire(puzzle, inputs[1], first, 1);
            wire(puzzle, first, second, 0);
            wire(puzzle, inputs[2], second, 1);
            wire(puzzle, second, out, 0);
        }
        "The XOR Gate" => {
            let or = puzzle.place("or").unwrap();
            let and = puzzle.place("and").unwrap();
            let not = puzzle.place("not").unwrap();
            let both = puzzle.place("and").unwrap();
            wire(puzzle, inputs[0], or, 0);
            wire(puzzle, inputs[1], or, 1);
            wire(puzzle, inputs[0], and, 0);
            wire(puzzle, inputs[1], and, 1);
            wire(puzzle, and, not, 0);
            wire(puzzle, or, both, 0);
            wire(puzzle, not, both, 1);
            wire(puzzle, both, out, 0);
        }
        other => panic!("no solution for {other}"),
    }
}

#[test]
fn test_play_builtin_campaign() {
    let mut campaign = Campaign::new(LevelPack::builtin().unwrap(), CircuitConfig::default());
    let mut unlocked = Vec::new();

    while !campaign.is_complete() {
        let mut puzzle = campaign.start().unwrap();
        solve(&mut puzzle);

        let submission = puzzle.submit().unwrap();
        assert!(submission.is_solved(), "{}", puzzle.level().name());
        assert!(submission.is_perfect(), "{}", puzzle.level().name());
        assert_eq!(submission.extra_gates, 0);

        let new = campaign.record(&submission).unwrap();
        unlocked.extend(new.iter().map(|k| k.id().to_string()));
    }

    assert!(campaign.current_level().is_none());
    assert!((0..7).all(|i| campaign.is_solved(i)));
    assert_eq!(
        unlocked,
        ["input", "output", "not", "and", "or", "nand", "nor", "or3", "and3", "xor"]
    );

    let mut sandbox = campaign.sandbox().unwrap();
    assert!(sandbox.create_gate("xor", None).is_ok());
    assert!(sandbox.create_gate("clock", None).is_err());
}

#[test]
fn test_puzzle_fixed_gates() {
    let campaign = Campaign::new(LevelPack::builtin().unwrap(), CircuitConfig::default());
    let mut puzzle = campaign.start_level(5).unwrap();

    let names: Vec<_> = puzzle
        .graph()
        .gates()
        .map(|g| g.name().to_string())
        .collect();
    assert_eq!(names, ["Input A", "Input B", "Input C", "Output"]);

    let input = puzzle.inputs()[0];
    let err = puzzle.remove(input).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::FixedGate);

    let or = puzzle.place("or").unwrap();
    puzzle.remove(or).unwrap();
    assert_eq!(puzzle.graph().gate_count(), 4);
}

#[test]
fn test_place_not_permitted() {
    let campaign = Campaign::new(LevelPack::builtin().unwrap(), CircuitConfig::default());
    let mut puzzle = campaign.start_level(4).unwrap();

    let err = puzzle.place("nand").unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::NotPermitted);
    assert!(puzzle.place("AND").is_ok());
}

#[test]
fn test_wrong_solution_is_not_recorded() {
    let mut campaign = Campaign::new(LevelPack::builtin().unwrap(), CircuitConfig::default());
    let mut puzzle = campaign.start_level(1).unwrap();
    let inputs = puzzle.inputs().to_vec();
    let out = puzzle.outputs()[0];
    wire(&mut puzzle, inputs[0], out, 0);

    let submission = puzzle.submit().unwrap();

    assert!(!submission.is_solved());
    assert_eq!(submission.report.failed_rows().collect::<Vec<_>>(), vec![0, 1]);
    assert!(campaign.record(&submission).unwrap().is_empty());
    assert_eq!(campaign.current(), 0);
    assert!(!campaign.is_solved(1));
}

#[test]
fn test_extra_gates_counted() {
    let mut campaign = Campaign::new(LevelPack::builtin().unwrap(), CircuitConfig::default());
    let mut puzzle = campaign.start().unwrap();
    let inputs = puzzle.inputs().to_vec();
    let out = puzzle.outputs()[0];
    wire(&mut puzzle, inputs[0], out, 0);
    puzzle.graph_mut().create_gate("not", None).unwrap();

    let submission = puzzle.submit().unwrap();

    assert!(submission.is_solved());
    assert!(!submission.is_perfect());
    assert_eq!(submission.extra_gates, 1);
    assert_eq!(campaign.record(&submission).unwrap().len(), 2);
    assert_eq!(campaign.current(), 1);
}

#[test]
fn test_unknown_level() {
    let campaign = Campaign::new(LevelPack::builtin().unwrap(), CircuitConfig::default());

    let err = campaign.start_level(7).unwrap_err();

    assert_eq!(err.kind(), &ErrorKind::UnknownLevel);
}
