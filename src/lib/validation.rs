//! Input validation utilities
//!
//! Common checks for command-line parameters and input paths, reported through the
//! structured errors in [`crate::errors`].

use crate::errors::{PairingError, Result};
use std::path::Path;

/// Validate that a file exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description of the file (e.g., "Fixture", "Samples")
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use tnpair_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/fixture.json", "Fixture");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(PairingError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

/// Validate that every path exists, all sharing one description
///
/// # Errors
/// Returns an error for the first file that doesn't exist, or if `paths` is empty
pub fn validate_files_exist<P: AsRef<Path>>(paths: &[P], description: &str) -> Result<()> {
    if paths.is_empty() {
        return Err(PairingError::InvalidParameter {
            parameter: description.to_string(),
            reason: "at least one file is required".to_string(),
        });
    }
    paths.iter().try_for_each(|p| validate_file_exists(p, description))
}

/// Validate that a string parameter is not empty or whitespace
///
/// # Errors
/// Returns [`PairingError::InvalidParameter`] naming `name`
///
/// # Example
/// ```
/// use tnpair_lib::validation::validate_not_blank;
///
/// assert!(validate_not_blank("C-DRKHP7", "patient-id").is_ok());
/// assert!(validate_not_blank("  ", "patient-id").is_err());
/// ```
pub fn validate_not_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PairingError::InvalidParameter {
            parameter: name.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}
