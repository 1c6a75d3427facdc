//! Acquires configuration text from files and standard input, enforcing [`MAX_CONFIG_SIZE`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tmsim::{TuringMachineError, MAX_CONFIG_SIZE};

/// Reads a configuration file.
///
/// # Returns
///
/// * `Ok(String)` with the file contents.
/// * `Err(TuringMachineError::FileError)` if the file cannot be read, is not UTF-8, or is larger
///   than [`MAX_CONFIG_SIZE`].
pub fn read_config(path: &Path) -> Result<String, TuringMachineError> {
    let file = File::open(path).map_err(|e| {
        TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    })?;

    read_limited(file, &path.display().to_string())
}

/// Reads a configuration from standard input.
pub fn read_stdin() -> Result<String, TuringMachineError> {
    read_limited(io::stdin().lock(), "stdin")
}

/// Reads at most [`MAX_CONFIG_SIZE`] bytes from `reader`.
pub fn read_limited<R: Read>(reader: R, source: &str) -> Result<String, TuringMachineError> {
    let mut buffer = Vec::new();
    reader
        .take(MAX_CONFIG_SIZE as u64 + 1)
        .read_to_end(&mut buffer)
        .map_err(|e| TuringMachineError::FileError(format!("Failed to read {}: {}", source, e)))?;

    if buffer.len() > MAX_CONFIG_SIZE {
        return Err(TuringMachineError::FileError(format!(
            "{} exceeds the maximum configuration size of {} bytes",
            source, MAX_CONFIG_SIZE
        )));
    }

    String::from_utf8(buffer)
        .map_err(|e| TuringMachineError::FileError(format!("{} is not valid UTF-8: {}", source, e)))
}
