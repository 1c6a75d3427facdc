//! This module maps a parsed configuration document onto a [`TuringMachine`].
//!
//! The builder is permissive. Missing or malformed fields fall back to defaults and never fail
//! the build. Problems with the resulting definition are left to the validator.

use crate::document::Node;
use crate::machine::{Definition, TuringMachine};
use crate::parser::parse;
use crate::types::{
    Cell, Direction, Mode, Symbol, Transition, TransitionKey, TransitionOutput,
    TuringMachineError, DEFAULT_STATE,
};
use crate::validator::{validate, Issue};

/// A built machine together with the inputs its configuration asks to simulate.
#[derive(Debug, Clone)]
pub struct BuiltMachine {
    pub machine: TuringMachine,
    /// The configuration's `simulation_strings`.
    pub inputs: Vec<String>,
    /// One message per transition rejected from the index as a duplicate.
    pub duplicate_issues: Vec<String>,
}

impl BuiltMachine {
    /// Every outstanding issue: the validator's findings followed by the builder's duplicate
    /// messages. The two duplicate reports are both kept.
    pub fn issues(&self) -> Vec<String> {
        validate(&self.machine, &self.inputs)
            .iter()
            .map(Issue::to_string)
            .chain(self.duplicate_issues.iter().cloned())
            .collect()
    }

    /// Returns the machine unchanged if it has no outstanding issues.
    ///
    /// # Returns
    ///
    /// * `Ok(BuiltMachine)` when [`issues`](Self::issues) is empty.
    /// * `Err(TuringMachineError::ValidationError)` carrying every issue otherwise.
    pub fn into_valid(self) -> Result<Self, TuringMachineError> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(self)
        } else {
            Err(TuringMachineError::ValidationError(issues))
        }
    }
}

/// Parses and builds a configuration in one go.
///
/// # Arguments
///
/// * `text` - The configuration document.
/// * `mode` - The lookup policy for the built machine.
///
/// # Returns
///
/// * `Ok(BuiltMachine)` if the text parses. The machine may still have validation issues.
/// * `Err(TuringMachineError::ParseError)` if the text is malformed.
pub fn load(text: &str, mode: Mode) -> Result<BuiltMachine, TuringMachineError> {
    let tree = parse(text)?;
    Ok(build(&tree, mode))
}

/// Builds a machine from a parsed configuration document.
///
/// The recognized schema is:
///
/// ```text
/// q_states: { q_list: [..], initial: .., final: .. }
/// alphabet: [..]
/// tape_alphabet: [.., null]
/// delta:
///   - params: { initial_state, mem_cache_value, tape_input }
///     output: { final_state, mem_cache_value, tape_output, tape_displacement }
/// simulation_strings: [..]
/// ```
pub fn build(tree: &Node, mode: Mode) -> BuiltMachine {
    let (states, initial_state, final_state) = match tree.get("q_states") {
        Some(q_states @ Node::Mapping(_)) => (
            scalars(q_states.get("q_list")),
            state_name(q_states.get("initial")),
            state_name(q_states.get("final")),
        ),
        None | Some(Node::Null) => (
            Vec::new(),
            DEFAULT_STATE.to_string(),
            DEFAULT_STATE.to_string(),
        ),
        Some(_) => {
            tracing::warn!("q_states is not a mapping, using a two-state placeholder");
            (
                vec!["0".to_string(), "1".to_string()],
                "0".to_string(),
                "1".to_string(),
            )
        }
    };

    let input_alphabet = scalars(tree.get("alphabet"));
    let mut tape_alphabet = cells(tree.get("tape_alphabet"));
    for symbol in &input_alphabet {
        let cell = Symbol::normalize(Some(symbol.as_str()));
        if cell.is_some() && !tape_alphabet.contains(&cell) {
            tape_alphabet.push(cell);
        }
    }

    let transitions = transitions(tree.get("delta"));
    let inputs = scalars(tree.get("simulation_strings"));

    let machine = TuringMachine::new(Definition {
        states,
        initial_state,
        final_state,
        input_alphabet,
        tape_alphabet,
        transitions,
        mode,
    });

    let duplicate_issues = machine
        .duplicates()
        .iter()
        .map(|key| Issue::DuplicateTransition(key.clone()).to_string())
        .collect::<Vec<_>>();

    tracing::debug!(
        states = machine.states().len(),
        transitions = machine.transitions().len(),
        inputs = inputs.len(),
        duplicates = duplicate_issues.len(),
        "built machine"
    );

    BuiltMachine {
        machine,
        inputs,
        duplicate_issues,
    }
}

fn transitions(delta: Option<&Node>) -> Vec<Transition> {
    let Some(entries) = delta.and_then(Node::as_sequence) else {
        return Vec::new();
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            if entry.as_mapping().is_none() {
                tracing::warn!(index = i, "skipping delta entry that is not a mapping");
                return None;
            }

            let params = entry.get("params");
            let output = entry.get("output");
            Some(Transition {
                params: TransitionKey::new(
                    state_name(field(params, "initial_state")),
                    symbol(field(params, "mem_cache_value")),
                    symbol(field(params, "tape_input")),
                ),
                output: TransitionOutput {
                    next_state: state_name(field(output, "final_state")),
                    cache: symbol(field(output, "mem_cache_value")),
                    write: symbol(field(output, "tape_output")),
                    direction: Direction::from_token(
                        field(output, "tape_displacement").and_then(Node::as_scalar),
                    ),
                },
            })
        })
        .collect()
}

fn field<'a>(section: Option<&'a Node>, name: &str) -> Option<&'a Node> {
    section.and_then(|s| s.get(name))
}

/// Reads a list of strings. Nulls and nested containers are skipped and a lone scalar becomes a
/// one-element list.
fn scalars(node: Option<&Node>) -> Vec<String> {
    match node {
        Some(Node::Sequence(items)) => items
            .iter()
            .filter_map(Node::as_scalar)
            .map(str::to_string)
            .collect(),
        Some(Node::Scalar(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Reads a list of tape symbols. Only a null entry declares the blank; scalars are kept verbatim,
/// so `B` or `''` here is an ordinary symbol.
fn cells(node: Option<&Node>) -> Vec<Cell> {
    match node {
        Some(Node::Sequence(items)) => items
            .iter()
            .filter_map(|item| match item {
                Node::Scalar(s) => Some(Some(Symbol::literal(s.as_str()))),
                Node::Null => Some(None),
                _ => None,
            })
            .collect(),
        Some(Node::Scalar(s)) => vec![Some(Symbol::literal(s.as_str()))],
        _ => Vec::new(),
    }
}

fn symbol(node: Option<&Node>) -> Cell {
    Symbol::normalize(node.and_then(Node::as_scalar))
}

fn state_name(node: Option<&Node>) -> String {
    node.and_then(Node::as_scalar)
        .unwrap_or(DEFAULT_STATE)
        .to_string()
}
