//! Read-only views of a machine for presentation layers: a transition table and a Graphviz
//! state diagram.

use std::collections::HashMap;
use std::fmt::Write;

use serde::Serialize;

use crate::machine::TuringMachine;
use crate::types::{cell_label, Transition};

/// One row of the transition table. Blank cells are rendered as `B`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRow {
    /// 1-based position in declaration order.
    pub index: usize,
    pub state: String,
    pub cache_in: String,
    pub tape_in: String,
    pub next_state: String,
    pub cache_out: String,
    pub tape_out: String,
    pub direction: char,
}

impl From<(usize, &Transition)> for TransitionRow {
    fn from((i, transition): (usize, &Transition)) -> Self {
        Self {
            index: i + 1,
            state: transition.params.state.clone(),
            cache_in: cell_label(&transition.params.cache).to_string(),
            tape_in: cell_label(&transition.params.symbol).to_string(),
            next_state: transition.output.next_state.clone(),
            cache_out: cell_label(&transition.output.cache).to_string(),
            tape_out: cell_label(&transition.output.write).to_string(),
            direction: transition.output.direction.letter(),
        }
    }
}

/// Lists every transition, duplicates included, in declaration order.
pub fn transition_table(machine: &TuringMachine) -> Vec<TransitionRow> {
    machine
        .transitions()
        .iter()
        .enumerate()
        .map(TransitionRow::from)
        .collect()
}

/// Renders the state diagram as a Graphviz DOT document.
///
/// Transitions sharing a source and target are merged into one edge whose label holds one
/// `[c],t → [c'],t',D` line per transition.
pub fn to_dot(machine: &TuringMachine) -> String {
    let mut dot = String::new();
    let _ = writeln!(dot, "digraph turing_machine {{");
    let _ = writeln!(dot, "    rankdir=LR;");
    let _ = writeln!(
        dot,
        "    node [shape=circle, style=filled, fillcolor=lightblue];"
    );
    let _ = writeln!(dot, "    start [label=\"\", shape=none, width=0, height=0];");
    let _ = writeln!(
        dot,
        "    start -> \"{}\" [label=\"start\", color=green, penwidth=2];",
        escape(machine.initial_state())
    );

    for state in machine.states() {
        let name = escape(state);
        if state == machine.final_state() {
            let _ = writeln!(
                dot,
                "    \"{name}\" [shape=doublecircle, fillcolor=lightgreen];"
            );
        } else if state == machine.initial_state() {
            let _ = writeln!(dot, "    \"{name}\" [fillcolor=lightyellow];");
        } else {
            let _ = writeln!(dot, "    \"{name}\";");
        }
    }

    let mut groups: Vec<((&str, &str), Vec<String>)> = Vec::new();
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    for transition in machine.transitions() {
        let pair = (
            transition.params.state.as_str(),
            transition.output.next_state.as_str(),
        );
        let position = *positions.entry(pair).or_insert_with(|| {
            groups.push((pair, Vec::new()));
            groups.len() - 1
        });
        groups[position].1.push(edge_label(transition));
    }

    for ((source, target), labels) in &groups {
        let _ = writeln!(
            dot,
            "    \"{}\" -> \"{}\" [label=\"{}\", fontsize=9];",
            escape(source),
            escape(target),
            labels.join("\\n")
        );
    }

    dot.push_str("}\n");
    dot
}

fn edge_label(transition: &Transition) -> String {
    format!(
        "[{}],{} → [{}],{},{}",
        escape(cell_label(&transition.params.cache)),
        escape(cell_label(&transition.params.symbol)),
        escape(cell_label(&transition.output.cache)),
        escape(cell_label(&transition.output.write)),
        transition.output.direction.letter()
    )
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::load;
    use crate::types::Mode;

    const MACHINE: &str = r#"
q_states:
  q_list:
    - q0
    - q1
    - qf
  initial: q0
  final: qf
alphabet:
  - a
tape_alphabet:
  - a
  - X
  -
delta:
  - params:
      initial_state: q0
      tape_input: a
    output:
      final_state: q1
      tape_output: X
      tape_displacement: R
  - params:
      initial_state: q0
      mem_cache_value: c
      tape_input: '"'
    output:
      final_state: q1
      mem_cache_value: d
      tape_displacement: L
  - params:
      initial_state: q1
    output:
      final_state: qf
"#;

    fn machine() -> TuringMachine {
        load(MACHINE, Mode::Normal).unwrap().machine
    }

    #[test]
    fn test_transition_table_rows() {
        let rows = transition_table(&machine());

        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            TransitionRow {
                index: 1,
                state: "q0".into(),
                cache_in: "B".into(),
                tape_in: "a".into(),
                next_state: "q1".into(),
                cache_out: "B".into(),
                tape_out: "X".into(),
                direction: 'R',
            }
        );
        assert_eq!(rows[2].index, 3);
        assert_eq!(rows[2].direction, 'S');
    }

    #[test]
    fn test_dot_marks_start_and_final_states() {
        let dot = to_dot(&machine());

        assert!(dot.starts_with("digraph turing_machine {\n"));
        assert!(dot.contains("rankdir=LR;"));
        assert!(dot.contains("start -> \"q0\" [label=\"start\""));
        assert!(dot.contains("\"qf\" [shape=doublecircle"));
        assert!(dot.contains("\"q0\" [fillcolor=lightyellow];"));
        assert!(dot.contains("    \"q1\";"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_dot_groups_edges_by_state_pair() {
        let dot = to_dot(&machine());

        let q0_q1: Vec<&str> = dot.lines().filter(|l| l.contains("\"q0\" -> \"q1\"")).collect();
        assert_eq!(q0_q1.len(), 1);
        assert!(q0_q1[0].contains("[B],a → [B],X,R\\n[c],\\\" → [d],B,L"));
        assert!(dot.contains("\"q1\" -> \"qf\" [label=\"[B],B → [B],B,S\""));
    }
}
