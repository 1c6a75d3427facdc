//! This module checks a built machine and its input strings for configuration problems.
//!
//! Validation never fails. It collects every issue it finds and leaves the decision whether to
//! simulate to the caller.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use thiserror::Error;

use crate::machine::TuringMachine;
use crate::types::{Symbol, TransitionKey};

/// A single finding of the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    #[error("Initial state '{0}' is not declared in q_states.q_list")]
    UndeclaredInitialState(String),
    #[error("Final state '{0}' is not declared in q_states.q_list")]
    UndeclaredFinalState(String),
    #[error("Duplicate states in q_states.q_list")]
    DuplicateStates,
    /// Advisory only.
    #[error("States declared but never used: [{}]", .0.join(", "))]
    UnusedStates(Vec<String>),
    #[error("Transition from unknown state '{0}'")]
    UnknownSourceState(String),
    #[error("Transition to unknown state '{0}'")]
    UnknownTargetState(String),
    #[error("tape_input '{0}' is not in tape_alphabet")]
    TapeInputOutsideAlphabet(Symbol),
    #[error("tape_output '{0}' is not in tape_alphabet")]
    TapeOutputOutsideAlphabet(Symbol),
    #[error("Duplicate transition for {0}")]
    DuplicateTransition(TransitionKey),
    #[error("The tape alphabet must include the blank (declare it with a bare '-' entry)")]
    MissingBlank,
    #[error("Input strings use '#' but '#' is not in the alphabet (add it quoted)")]
    HashOutsideAlphabet,
    #[error("Input '{input}' contains symbols outside the alphabet: {{{}}}", format_symbols(.symbols))]
    SymbolsOutsideAlphabet { input: String, symbols: Vec<char> },
}

fn format_symbols(symbols: &[char]) -> String {
    symbols
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs every check against `machine` and `inputs`.
///
/// The checks run in a fixed order and none of them short-circuits:
///
/// 1. initial and final states are declared, and no state is declared twice
/// 2. declared states that nothing uses
/// 3. transitions from or to undeclared states
/// 4. tape symbols read or written outside the tape alphabet
/// 5. duplicate transition keys, detected independently of the machine's own index
/// 6. a tape alphabet without the blank
/// 7. inputs containing `#` when `#` is not in the input alphabet
/// 8. input characters outside the input alphabet, one issue per offending input
pub fn validate(machine: &TuringMachine, inputs: &[String]) -> Vec<Issue> {
    let mut issues = Vec::new();
    let states = machine.states();
    let transitions = machine.transitions();

    let declared: HashSet<&str> = states.iter().map(String::as_str).collect();
    if !declared.contains(machine.initial_state()) {
        issues.push(Issue::UndeclaredInitialState(
            machine.initial_state().to_string(),
        ));
    }
    if !declared.contains(machine.final_state()) {
        issues.push(Issue::UndeclaredFinalState(machine.final_state().to_string()));
    }
    if declared.len() != states.len() {
        issues.push(Issue::DuplicateStates);
    }

    let used: HashSet<&str> = [machine.initial_state(), machine.final_state()]
        .into_iter()
        .chain(transitions.iter().map(|t| t.params.state.as_str()))
        .chain(transitions.iter().map(|t| t.output.next_state.as_str()))
        .collect();
    let unused: BTreeSet<&str> = declared.difference(&used).copied().collect();
    if !unused.is_empty() {
        issues.push(Issue::UnusedStates(
            unused.into_iter().map(str::to_string).collect(),
        ));
    }

    for transition in transitions {
        if !declared.contains(transition.params.state.as_str()) {
            issues.push(Issue::UnknownSourceState(transition.params.state.clone()));
        }
        if !declared.contains(transition.output.next_state.as_str()) {
            issues.push(Issue::UnknownTargetState(
                transition.output.next_state.clone(),
            ));
        }
    }

    let tape_alphabet = machine.tape_alphabet();
    for transition in transitions {
        if let Some(symbol) = &transition.params.symbol {
            if !tape_alphabet.contains(&transition.params.symbol) {
                issues.push(Issue::TapeInputOutsideAlphabet(symbol.clone()));
            }
        }
        if let Some(symbol) = &transition.output.write {
            if !tape_alphabet.contains(&transition.output.write) {
                issues.push(Issue::TapeOutputOutsideAlphabet(symbol.clone()));
            }
        }
    }

    let mut seen = HashSet::new();
    for transition in transitions {
        if !seen.insert(&transition.params) {
            issues.push(Issue::DuplicateTransition(transition.params.clone()));
        }
    }

    if !tape_alphabet.contains(&None) {
        issues.push(Issue::MissingBlank);
    }

    let hash_declared = machine.input_alphabet().iter().any(|s| s == "#");
    if !hash_declared && inputs.iter().any(|input| input.contains('#')) {
        issues.push(Issue::HashOutsideAlphabet);
    }

    issues.extend(inputs.iter().filter_map(|input| check_input(machine, input)));

    tracing::debug!(
        issues = issues.len(),
        inputs = inputs.len(),
        "validated machine"
    );

    issues
}

/// Checks one input string against the machine's input alphabet.
///
/// # Returns
///
/// * `None` if every character is an alphabet symbol.
/// * `Some(Issue::SymbolsOutsideAlphabet)` listing the offending characters, sorted and
///   deduplicated.
pub fn check_input(machine: &TuringMachine, input: &str) -> Option<Issue> {
    let alphabet = machine.input_alphabet();
    let mut buf = [0u8; 4];
    let symbols: BTreeSet<char> = input
        .chars()
        .filter(|c| {
            let c: &str = c.encode_utf8(&mut buf);
            !alphabet.iter().any(|s| s == c)
        })
        .collect();

    if symbols.is_empty() {
        None
    } else {
        Some(Issue::SymbolsOutsideAlphabet {
            input: input.to_string(),
            symbols: symbols.into_iter().collect(),
        })
    }
}

/// Returns the declared states that no chain of transitions reaches from the initial state,
/// sorted by name.
pub fn unreachable_states(machine: &TuringMachine) -> Vec<String> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for transition in machine.transitions() {
        edges
            .entry(transition.params.state.as_str())
            .or_default()
            .push(transition.output.next_state.as_str());
    }

    let mut visited = HashSet::from([machine.initial_state()]);
    let mut queue = VecDeque::from([machine.initial_state()]);
    while let Some(state) = queue.pop_front() {
        for &next in edges.get(state).into_iter().flatten() {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let unreachable: BTreeSet<&str> = machine
        .states()
        .iter()
        .map(String::as_str)
        .filter(|state| !visited.contains(state))
        .collect();
    unreachable.into_iter().map(str::to_string).collect()
}
