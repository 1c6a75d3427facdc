//! This module defines the `TuringMachine` struct, the immutable model of a single-tape machine
//! with a cache cell. It owns the state set, both alphabets and the transition list, and indexes
//! the transitions for lookup under the machine's [`Mode`].

use crate::execution::Execution;
use crate::types::{Cell, Mode, Simulation, Transition, TransitionKey};
use std::collections::HashMap;

/// Everything needed to construct a [`TuringMachine`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    pub states: Vec<String>,
    pub initial_state: String,
    pub final_state: String,
    pub input_alphabet: Vec<String>,
    /// Declared tape symbols; a `None` entry declares the blank.
    pub tape_alphabet: Vec<Cell>,
    pub transitions: Vec<Transition>,
    pub mode: Mode,
}

/// A built machine, read-only once constructed.
///
/// The transition index keeps the first transition for each key. Every later transition with an
/// already indexed key is recorded in [`duplicates`](Self::duplicates) instead.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    definition: Definition,
    index: HashMap<TransitionKey, usize>,
    duplicates: Vec<TransitionKey>,
}

impl TuringMachine {
    /// Creates a machine from its definition and builds the transition index.
    pub fn new(definition: Definition) -> Self {
        let mut index = HashMap::new();
        let mut duplicates = Vec::new();

        for (i, transition) in definition.transitions.iter().enumerate() {
            let key = transition.params.clone();
            if index.contains_key(&key) {
                tracing::warn!(key = %key, "duplicate transition rejected from index");
                duplicates.push(key);
            } else {
                index.insert(key, i);
            }
        }

        Self {
            definition,
            index,
            duplicates,
        }
    }

    /// Finds the transition that applies to `state` with `cache` and `symbol` under the head.
    ///
    /// In [`Mode::Strict`] only the exact key matches. In [`Mode::Normal`] the candidates are
    /// tried in a fixed order and the first hit wins: exact, blank symbol, blank cache, both
    /// blank.
    pub fn find_transition(&self, state: &str, cache: &Cell, symbol: &Cell) -> Option<&Transition> {
        let blank: Cell = None;
        let candidates = [
            (cache, symbol),
            (cache, &blank),
            (&blank, symbol),
            (&blank, &blank),
        ];
        let tried = match self.definition.mode {
            Mode::Strict => &candidates[..1],
            Mode::Normal => &candidates[..],
        };

        tried.iter().find_map(|(cache, symbol)| {
            let key = TransitionKey::new(state, (*cache).clone(), (*symbol).clone());
            self.get(&key)
        })
    }

    /// Returns the indexed transition for an exact key.
    pub fn get(&self, key: &TransitionKey) -> Option<&Transition> {
        self.index
            .get(key)
            .map(|&i| &self.definition.transitions[i])
    }

    /// Simulates the machine on `input`, bounded by `max_steps`.
    ///
    /// Each call works on a fresh tape, so a machine can be shared across threads and simulated
    /// concurrently.
    pub fn simulate(&self, input: &str, max_steps: usize) -> Simulation {
        Execution::new(self, input).run(max_steps)
    }

    pub fn states(&self) -> &[String] {
        &self.definition.states
    }

    pub fn initial_state(&self) -> &str {
        &self.definition.initial_state
    }

    pub fn final_state(&self) -> &str {
        &self.definition.final_state
    }

    pub fn input_alphabet(&self) -> &[String] {
        &self.definition.input_alphabet
    }

    pub fn tape_alphabet(&self) -> &[Cell] {
        &self.definition.tape_alphabet
    }

    /// All transitions in declaration order, duplicates included.
    pub fn transitions(&self) -> &[Transition] {
        &self.definition.transitions
    }

    /// Iterates over the indexed transitions in declaration order.
    pub fn index(&self) -> impl Iterator<Item = (&TransitionKey, &Transition)> {
        self.definition
            .transitions
            .iter()
            .enumerate()
            .filter(|(i, t)| self.index.get(&t.params) == Some(i))
            .map(|(_, t)| (&t.params, t))
    }

    /// Keys whose second and later occurrences were left out of the index.
    pub fn duplicates(&self) -> &[TransitionKey] {
        &self.duplicates
    }

    pub fn mode(&self) -> Mode {
        self.definition.mode
    }

    pub fn is_strict(&self) -> bool {
        self.definition.mode == Mode::Strict
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }
}
