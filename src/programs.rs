use crate::builder::{build, BuiltMachine};
use crate::document::Node;
use crate::parser::{parse, SyntaxError};
use crate::types::{Mode, TuringMachineError};

/// Built-in machine configurations, by display name.
pub const PROGRAMS: [(&str, &str); 3] = [
    (
        "Universal acceptor (3 phases)",
        include_str!("../machines/universal-acceptor.yaml"),
    ),
    (
        "Replace a with X",
        include_str!("../machines/replace-a.yaml"),
    ),
    (
        "Rotate left (cache)",
        include_str!("../machines/rotate-left.yaml"),
    ),
];

lazy_static::lazy_static! {
    static ref TREES: Vec<Result<Node, SyntaxError>> =
        PROGRAMS.iter().map(|(_, text)| parse(text)).collect();
}

/// A short description of a built-in program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub state_count: usize,
    pub transition_count: usize,
    pub input_count: usize,
}

/// Access to the built-in programs.
pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// List all program names
    pub fn names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|(name, _)| *name).collect()
    }

    /// Get the configuration text of a program by its name
    pub fn text_by_name(name: &str) -> Result<&'static str, TuringMachineError> {
        Self::index_of(name).map(|index| PROGRAMS[index].1)
    }

    /// Build a program by its name
    pub fn load_by_name(name: &str, mode: Mode) -> Result<BuiltMachine, TuringMachineError> {
        Self::load_by_index(Self::index_of(name)?, mode)
    }

    /// Build a program by its index
    pub fn load_by_index(index: usize, mode: Mode) -> Result<BuiltMachine, TuringMachineError> {
        match TREES.get(index) {
            Some(Ok(tree)) => Ok(build(tree, mode)),
            Some(Err(e)) => Err(e.clone().into()),
            None => Err(TuringMachineError::ProgramNotFound(format!("#{index}"))),
        }
    }

    /// Get information about a program by its index
    pub fn info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let built = Self::load_by_index(index, Mode::default())?;

        Ok(ProgramInfo {
            index,
            name: PROGRAMS[index].0.to_string(),
            state_count: built.machine.states().len(),
            transition_count: built.machine.transitions().len(),
            input_count: built.inputs.len(),
        })
    }

    fn index_of(name: &str) -> Result<usize, TuringMachineError> {
        PROGRAMS
            .iter()
            .position(|(candidate, _)| *candidate == name)
            .ok_or_else(|| TuringMachineError::ProgramNotFound(name.to_string()))
    }
}
