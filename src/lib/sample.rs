//! Sample records: the normalized view of one sequencing sample used for pairing.
//!
//! Two records describe the same patient/assay when their `(patient_id, bait_set)`
//! keys are equal; `igo_id` identifies a sample uniquely once it is known.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{PairingError, Result};
use crate::read_group::ReadGroupPayload;

/// Classification of a sample as disease tissue or matched reference tissue.
///
/// Deserialization goes through [`FromStr`], so JSON accepts the same spellings as the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TumorType {
    /// Disease tissue
    Tumor,
    /// Reference tissue from the same patient
    Normal,
}

impl TumorType {
    /// The spelling used in repository metadata and JSON output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tumor => "Tumor",
            Self::Normal => "Normal",
        }
    }
}

impl TryFrom<String> for TumorType {
    type Error = PairingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for TumorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TumorType {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tumor" => Ok(Self::Tumor),
            "normal" => Ok(Self::Normal),
            other => Err(PairingError::InvalidParameter {
                parameter: "tumor_type".to_string(),
                reason: format!("expected 'Tumor' or 'Normal', got '{other}'"),
            }),
        }
    }
}

/// One sequencing sample as supplied by the caller or built from the repository.
///
/// Optional fields are omitted from serialized output when absent, so a record read
/// from JSON is written back with the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Clinical patient identifier
    #[serde(default)]
    pub patient_id: String,

    /// Capture panel used for sequencing
    #[serde(default)]
    pub bait_set: String,

    /// Tumor or Normal
    pub tumor_type: TumorType,

    /// Sample identifier, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub igo_id: Option<String>,

    /// Owning request, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Sequencing date; only set for samples resolved from the repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_date: Option<NaiveDate>,

    /// Tissue preservation / specimen type (e.g. "Blood", "FFPE")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specimen_type: Option<String>,

    /// Lane-level read-group data for samples built from repository entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_group: Option<Box<ReadGroupPayload>>,
}

impl SampleRecord {
    /// Creates a record with only the matching key and classification set.
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        bait_set: impl Into<String>,
        tumor_type: TumorType,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            bait_set: bait_set.into(),
            tumor_type,
            igo_id: None,
            request_id: None,
            run_date: None,
            specimen_type: None,
            read_group: None,
        }
    }

    /// Sets the sample identifier.
    #[must_use]
    pub fn with_igo_id(mut self, igo_id: impl Into<String>) -> Self {
        self.igo_id = Some(igo_id.into());
        self
    }

    /// Sets the owning request.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the specimen type.
    #[must_use]
    pub fn with_specimen_type(mut self, specimen_type: impl Into<String>) -> Self {
        self.specimen_type = Some(specimen_type.into());
        self
    }

    /// True for tumor samples.
    #[must_use]
    pub fn is_tumor(&self) -> bool {
        self.tumor_type == TumorType::Tumor
    }

    /// True for normal samples.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.tumor_type == TumorType::Normal
    }

    /// True if both records share the same `(patient_id, bait_set)` key.
    #[must_use]
    pub fn same_patient_and_assay(&self, other: &SampleRecord) -> bool {
        self.patient_id == other.patient_id && self.bait_set == other.bait_set
    }

    /// The igo_id, or a placeholder for log and error messages.
    #[must_use]
    pub fn display_id(&self) -> &str {
        self.igo_id.as_deref().unwrap_or("<unknown>")
    }

    /// Checks that the fields used for matching are present.
    ///
    /// # Arguments
    /// * `index` - Position of the record in its input, reported in the error
    ///
    /// # Errors
    /// Returns [`PairingError::MissingField`] when `patient_id` or `bait_set` is empty.
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.patient_id.trim().is_empty() {
            return Err(PairingError::MissingField { index, field: "patient_id" });
        }
        if self.bait_set.trim().is_empty() {
            return Err(PairingError::MissingField { index, field: "bait_set" });
        }
        Ok(())
    }
}

/// Validates every record, failing on the first malformed one.
///
/// # Errors
/// Returns the first [`PairingError::MissingField`] encountered.
pub fn validate_samples(samples: &[SampleRecord]) -> Result<()> {
    samples.iter().enumerate().try_for_each(|(i, s)| s.validate(i))
}
