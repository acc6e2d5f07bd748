//! JSON input and output for sample lists, payloads and pairing results.
//!
//! `-` (or `/dev/stdin`, `/dev/stdout`) selects the standard streams.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::errors::{PairingError, Result};

/// Returns true if the path is "-" or "/dev/stdin".
///
/// # Example
/// ```
/// use tnpair_lib::json_io::is_stdin_path;
///
/// assert!(is_stdin_path("-"));
/// assert!(!is_stdin_path("samples.json"));
/// ```
pub fn is_stdin_path<P: AsRef<Path>>(path: P) -> bool {
    let path_str = path.as_ref().to_string_lossy();
    path_str == "-" || path_str == "/dev/stdin"
}

/// Returns true if the path is "-" or "/dev/stdout".
pub fn is_stdout_path<P: AsRef<Path>>(path: P) -> bool {
    let path_str = path.as_ref().to_string_lossy();
    path_str == "-" || path_str == "/dev/stdout"
}

/// Reads and deserializes a JSON document.
///
/// # Arguments
/// * `path` - File to read, or "-" for stdin
/// * `file_type` - Description used in errors (e.g., "samples")
///
/// # Errors
/// Returns [`PairingError::InvalidFileFormat`] if the input cannot be read or parsed.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P, file_type: &str) -> Result<T> {
    let path = path.as_ref();
    let invalid = |reason: String| PairingError::InvalidFileFormat {
        file_type: file_type.to_string(),
        path: path.display().to_string(),
        reason,
    };

    let reader: Box<dyn Read> = if is_stdin_path(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(path).map_err(|e| invalid(e.to_string()))?)
    };
    serde_json::from_reader(BufReader::new(reader)).map_err(|e| invalid(e.to_string()))
}

/// Serializes `value` as pretty-printed JSON followed by a newline.
///
/// # Errors
/// Returns [`PairingError::Write`] if the output cannot be created or written.
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let write_error = |source: io::Error| PairingError::Write { path: path.display().to_string(), source };

    let writer: Box<dyn Write> = if is_stdout_path(path) {
        Box::new(io::stdout().lock())
    } else {
        Box::new(File::create(path).map_err(write_error)?)
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| write_error(e.into()))?;
    writeln!(writer).and_then(|()| writer.flush()).map_err(write_error)
}
