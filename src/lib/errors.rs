//! Custom error types for tnpair operations.

use thiserror::Error;

/// Result type alias for tnpair operations
pub type Result<T> = std::result::Result<T, PairingError>;

/// Error type for tnpair operations
#[derive(Error, Debug)]
pub enum PairingError {
    /// A sample record is missing a field required for matching
    #[error("Sample record {index} is missing required field '{field}'")]
    MissingField {
        /// Position of the record in the input
        index: usize,
        /// The missing field name
        field: &'static str,
    },

    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "fixture", "samples")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// An output file could not be written
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// Destination path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The metadata repository could not answer a query
    #[error("Metadata repository query failed: {reason}")]
    Repository {
        /// Explanation from the repository backend
        reason: String,
    },

    /// File entries could not be assembled into read groups
    #[error("Cannot assemble read groups for sample '{igo_id}': {reason}")]
    Assembly {
        /// The sample being assembled
        igo_id: String,
        /// Explanation of the problem
        reason: String,
    },

    /// No normal could be found for a tumor and the caller asked for this to fail
    #[error("No normal found for tumor '{tumor}' (patient {patient_id}, bait set {bait_set})")]
    NoNormalFound {
        /// The tumor's igo_id, or "<unknown>"
        tumor: String,
        /// The tumor's patient
        patient_id: String,
        /// The tumor's bait set
        bait_set: String,
    },
}

impl PairingError {
    /// True for infrastructure failures that may succeed when retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Repository { .. })
    }
}
