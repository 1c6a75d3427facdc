//! This module defines the core data structures shared by the builder, the validator and the
//! execution engine: tape symbols, transitions, instantaneous descriptions, simulation outcomes
//! and the crate-wide error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::parser::SyntaxError;

/// How a blank cell is rendered in messages, tables and traces.
pub const BLANK_LABEL: &str = "B";
/// Literal tokens that denote the blank symbol wherever a symbol is expected.
pub const BLANK_TOKENS: [&str; 3] = ["", " ", "B"];
/// State name used when a configuration omits one.
pub const DEFAULT_STATE: &str = "0";
/// Appended to the state label of the final ID when no transition applies.
pub const NO_TRANSITION_MARKER: &str = " (no δ)";
/// The default step bound for a single simulation.
pub const DEFAULT_MAX_STEPS: usize = 10_000;
/// The maximum allowed size for a configuration document in bytes.
pub const MAX_CONFIG_SIZE: usize = 65_536; // 64KB

/// A non-blank tape or cache symbol.
///
/// The blank is never a `Symbol`: cells are `Option<Symbol>` and `None` is the blank, so no
/// literal character can collide with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

/// A tape cell, the cache, or a symbol slot in a transition. `None` is the blank.
pub type Cell = Option<Symbol>;

impl Symbol {
    /// Normalizes a raw configuration value into a cell.
    ///
    /// Absent values and the tokens in [`BLANK_TOKENS`] become the blank; anything else is kept
    /// verbatim.
    pub fn normalize(raw: Option<&str>) -> Cell {
        match raw {
            Some(s) if !BLANK_TOKENS.contains(&s) => Some(Symbol(s.to_string())),
            _ => None,
        }
    }

    /// Wraps a raw value as a symbol without blank-token normalization.
    pub fn literal(raw: impl Into<String>) -> Self {
        Symbol(raw.into())
    }

    /// Normalizes a single input character into a cell.
    pub fn from_char(c: char) -> Cell {
        let mut buf = [0u8; 4];
        Self::normalize(Some(&*c.encode_utf8(&mut buf)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders a cell for display, using [`BLANK_LABEL`] for the blank.
pub fn cell_label(cell: &Cell) -> &str {
    cell.as_ref().map_or(BLANK_LABEL, Symbol::as_str)
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Interprets a `tape_displacement` token.
    ///
    /// Missing or empty tokens default to `S`. Matching is case-insensitive and any token other
    /// than `L` or `R` means `Stay`.
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::to_uppercase).as_deref() {
            Some("L") => Direction::Left,
            Some("R") => Direction::Right,
            _ => Direction::Stay,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }
}

/// The transition lookup policy of a machine.
///
/// - `Normal` (default): blank cache or tape slots in a rule act as wildcards, tried after the
///   exact match in the order (state, cache, symbol), (state, cache, B), (state, B, symbol),
///   (state, B, B).
/// - `Strict`: only the exact (state, cache, symbol) key matches.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Strict,
}

/// The lookup key of a transition: source state, cache value and symbol under the head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TransitionKey {
    pub state: String,
    pub cache: Cell,
    pub symbol: Cell,
}

impl TransitionKey {
    pub fn new(state: impl Into<String>, cache: Cell, symbol: Cell) -> Self {
        Self {
            state: state.into(),
            cache,
            symbol,
        }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.state,
            cell_label(&self.cache),
            cell_label(&self.symbol)
        )
    }
}

/// What a transition does once it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutput {
    /// The state the machine moves to.
    pub next_state: String,
    /// The new cache value.
    pub cache: Cell,
    /// The symbol written under the head.
    pub write: Cell,
    /// How the head moves after writing.
    pub direction: Direction,
}

/// A single rule of the transition function δ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub params: TransitionKey,
    pub output: TransitionOutput,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "δ([{}, {}], {}) → ([{}, {}], {}, {})",
            self.params.state,
            cell_label(&self.params.cache),
            cell_label(&self.params.symbol),
            self.output.next_state,
            cell_label(&self.output.cache),
            cell_label(&self.output.write),
            self.output.direction.letter()
        )
    }
}

/// A snapshot of the machine configuration at one step of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstantaneousDescription {
    /// The state label; carries [`NO_TRANSITION_MARKER`] on a stuck final ID.
    pub state: String,
    pub tape: Vec<Cell>,
    pub head: usize,
    pub cache: Cell,
    pub step: usize,
}

impl InstantaneousDescription {
    /// The symbol under the head, or `None` if the head lies outside the tape.
    pub fn scanned(&self) -> Option<&Cell> {
        self.tape.get(self.head)
    }
}

impl fmt::Display for InstantaneousDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID_{}: ", self.step)?;
        for (i, cell) in self.tape.iter().enumerate() {
            if i == self.head {
                write!(f, "[{}]({})", self.state, cell_label(cell))?;
            } else {
                f.write_str(cell_label(cell))?;
            }
        }
        write!(f, ", Cache: {}", cell_label(&self.cache))
    }
}

/// The terminal outcome of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine reached its final state.
    Accepted,
    /// No transition applied to the current configuration.
    NoTransition,
    /// The step bound was exhausted before the final state was reached.
    StepLimit,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Accepted => f.write_str("accepted"),
            Outcome::NoTransition => f.write_str("rejected: no applicable transition"),
            Outcome::StepLimit => f.write_str("rejected: step limit reached"),
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a step and keeps running.
    Continue,
    /// The machine reached a terminal outcome.
    Halt(Outcome),
}

/// The result of simulating one input string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub outcome: Outcome,
    /// Every ID from step 0 to the terminal step.
    pub trace: Vec<InstantaneousDescription>,
    pub last_transition: Option<Transition>,
}

impl Simulation {
    pub fn accepted(&self) -> bool {
        self.outcome.is_accepted()
    }

    /// The number of steps reported for this run (IDs after the initial one).
    pub fn steps(&self) -> usize {
        self.trace.len().saturating_sub(1)
    }

    pub fn last(&self) -> Option<&InstantaneousDescription> {
        self.trace.last()
    }
}

/// Represents the errors that can occur while loading a machine definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The configuration text is malformed.
    #[error("Configuration parsing error: {0}")]
    ParseError(#[from] SyntaxError),
    /// The machine definition has outstanding validation issues.
    #[error("Machine validation failed: {}", .0.join("; "))]
    ValidationError(Vec<String>),
    /// Reading a configuration file failed.
    #[error("File error: {0}")]
    FileError(String),
    /// Serializing a document or result failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// No built-in program carries the requested name.
    #[error("Program '{0}' not found")]
    ProgramNotFound(String),
}
