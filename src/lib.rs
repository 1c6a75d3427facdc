//! This crate provides the core logic for a single-tape Turing machine simulator with a cache
//! cell. It parses machine configuration documents, builds and validates machines, simulates
//! them step by step, and exports their transition tables and state diagrams.
//!
//! The crate performs no I/O. Presentation layers live under `platforms/`.

pub mod builder;
pub mod document;
pub mod execution;
pub mod export;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod report;
pub mod types;
pub mod validator;

/// Re-exports the `build` and `load` functions and the `BuiltMachine` struct from the builder module.
pub use builder::{build, load, BuiltMachine};
/// Re-exports the document tree produced by the parser.
pub use document::{Mapping, Node};
/// Re-exports the `Execution` struct from the execution module.
pub use execution::Execution;
/// Re-exports the export functions and `TransitionRow` from the export module.
pub use export::{to_dot, transition_table, TransitionRow};
/// Re-exports the `TuringMachine` and `Definition` structs from the machine module.
pub use machine::{Definition, TuringMachine};
/// Re-exports the `parse` function and the syntax error types from the parser module.
pub use parser::{parse, Rule, SyntaxError, SyntaxErrorKind};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the batch simulation helpers from the report module.
pub use report::{simulate_all, RunSummary, Statistics};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    cell_label, Cell, Direction, InstantaneousDescription, Mode, Outcome, Simulation, Step,
    Symbol, Transition, TransitionKey, TransitionOutput, TuringMachineError, BLANK_LABEL,
    DEFAULT_MAX_STEPS, MAX_CONFIG_SIZE, NO_TRANSITION_MARKER,
};
/// Re-exports the validator entry points and the `Issue` enum.
pub use validator::{check_input, unreachable_states, validate, Issue};
