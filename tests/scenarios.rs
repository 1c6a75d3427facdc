//! End-to-end scenarios: configuration text in, validation issues and simulation traces out.

use tmsim::{load, validate, Issue, Mode, Outcome, Symbol, TransitionKey, NO_TRANSITION_MARKER};

const HEADER: &str = "\
q_states:
  q_list:
    - q0
    - q1
    - q2
    - qaccept
  initial: q0
  final: qaccept
";

fn config(alphabet: &[&str], tape_alphabet: &[&str], delta: &str, inputs: &[&str]) -> String {
    let list = |items: &[&str]| -> String {
        items
            .iter()
            .map(|item| format!("  - {}\n", item))
            .collect()
    };

    format!(
        "{}alphabet:\n{}tape_alphabet:\n{}delta:\n{}simulation_strings:\n{}",
        HEADER,
        list(alphabet),
        list(tape_alphabet),
        delta,
        list(inputs)
    )
}

fn rule(state: &str, read: &str, next: &str, write: &str, direction: &str) -> String {
    format!(
        "  - params:\n      initial_state: {state}\n      tape_input: {read}\n    output:\n      final_state: {next}\n      tape_output: {write}\n      tape_displacement: {direction}\n"
    )
}

#[test]
fn empty_input_accepted_by_blank_rule() {
    let delta = rule("q0", "", "qaccept", "", "S");
    let built = load(&config(&["a", "b"], &[""], &delta, &["''"]), Mode::Normal).unwrap();
    assert_eq!(built.inputs, vec![String::new()]);

    let simulation = built.machine.simulate("", 100);
    assert_eq!(simulation.outcome, Outcome::Accepted);
    // The initial ID plus the one reached by the blank rule.
    assert_eq!(simulation.trace.len(), 2);
    assert_eq!(simulation.last().unwrap().state, "qaccept");
}

#[test]
fn initial_final_state_accepts_without_a_step() {
    let text = config(&["a"], &[""], "", &[]).replace("final: qaccept", "final: q0");
    let built = load(&text, Mode::Normal).unwrap();

    let simulation = built.machine.simulate("", 100);
    assert!(simulation.accepted());
    assert_eq!(simulation.trace.len(), 1);
}

#[test]
fn missing_rule_rejects_with_marked_id() {
    let delta = rule("q0", "b", "q1", "a", "R");
    let built = load(&config(&["a", "b"], &[""], &delta, &["a"]), Mode::Normal).unwrap();
    assert!(built.issues().iter().all(|issue| issue.contains("never used")));

    let simulation = built.machine.simulate("a", 100);
    assert_eq!(simulation.outcome, Outcome::NoTransition);
    assert_eq!(simulation.trace.len(), 2);
    assert_eq!(
        simulation.last().unwrap().state,
        format!("q0{}", NO_TRANSITION_MARKER)
    );
}

#[test]
fn endless_loop_hits_step_limit() {
    let delta = format!(
        "{}{}",
        rule("q0", "a", "q0", "a", "R"),
        rule("q0", "", "q0", "a", "R")
    );
    let built = load(&config(&["a"], &[""], &delta, &["a"]), Mode::Normal).unwrap();

    let simulation = built.machine.simulate("a", 100);
    assert_eq!(simulation.outcome, Outcome::StepLimit);
    assert_eq!(simulation.trace.len(), 101);
    assert_eq!(simulation.trace[100].step, 100);
    assert_eq!(simulation.last().unwrap().tape.len(), 102);
}

#[test]
fn duplicate_rule_reported_by_builder_and_validator() {
    let delta = format!(
        "{}{}",
        rule("q0", "a", "q1", "a", "R"),
        rule("q0", "a", "qaccept", "b", "S")
    );
    let built = load(&config(&["a", "b"], &[""], &delta, &[]), Mode::Normal).unwrap();
    let key = TransitionKey::new("q0", None, Symbol::normalize(Some("a")));

    assert_eq!(built.machine.duplicates(), &[key.clone()]);
    assert!(validate(&built.machine, &built.inputs).contains(&Issue::DuplicateTransition(key)));

    let message = "Duplicate transition for (q0, B, a)";
    let reported = built.issues().iter().filter(|issue| *issue == message).count();
    assert_eq!(reported, 2);

    // The first occurrence stays in effect.
    assert_eq!(built.machine.simulate("a", 10).last().unwrap().state, "q1 (no δ)");
}

#[test]
fn tape_alphabet_without_blank_is_reported() {
    let delta = rule("q0", "", "qaccept", "", "S");
    let built = load(&config(&["a"], &["a"], &delta, &["a"]), Mode::Normal).unwrap();

    let issues = validate(&built.machine, &built.inputs);
    assert!(issues.contains(&Issue::MissingBlank));
    assert!(built
        .issues()
        .iter()
        .any(|issue| issue.contains("must include the blank")));
}

#[test]
fn hash_outside_alphabet_reports_both_issues() {
    let delta = rule("q0", "", "qaccept", "", "S");
    let built = load(&config(&["a"], &[""], &delta, &["'a#'"]), Mode::Normal).unwrap();
    assert_eq!(built.inputs, vec!["a#".to_string()]);

    let issues = validate(&built.machine, &built.inputs);
    assert!(issues.contains(&Issue::HashOutsideAlphabet));
    assert!(issues.contains(&Issue::SymbolsOutsideAlphabet {
        input: "a#".into(),
        symbols: vec!['#'],
    }));
}
