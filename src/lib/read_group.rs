//! The alignment-ready, read-group-level description of one sample.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sample::TumorType;

/// Sequencing center written to `CN` unless overridden.
pub const DEFAULT_SEQUENCING_CENTER: &str = "MSKCC";

/// Platform written to `PL` unless overridden.
pub const DEFAULT_PLATFORM: &str = "Illumina";

/// Read-group values that do not come from repository metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadGroupDefaults {
    pub sequencing_center: String,
    pub platform: String,
}

impl Default for ReadGroupDefaults {
    fn default() -> Self {
        Self {
            sequencing_center: DEFAULT_SEQUENCING_CENTER.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

/// A sample's read groups, one entry per lane in each per-lane field.
///
/// `PU`, `ID`, `R1`, `R2`, `R1_bid`, `R2_bid` and `run_date` are index-aligned:
/// position `i` of each describes the same lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct ReadGroupPayload {
    /// Sequencing center
    pub CN: String,
    /// Platform
    pub PL: String,
    /// Platform unit per lane
    pub PU: Vec<String>,
    /// Library
    pub LB: String,
    /// Sample name
    pub SM: String,
    /// Read-group id per lane
    pub ID: Vec<String>,
    pub R1: Vec<String>,
    pub R2: Vec<String>,
    pub R1_bid: Vec<Uuid>,
    pub R2_bid: Vec<Uuid>,
    pub species: Option<String>,
    pub specimen_type: Option<String>,
    /// Requests the sample's files were delivered under, first-seen order
    pub request_id: Vec<String>,
    /// Run date per lane, `YYYY-MM-DD`, empty when the lane has no date
    pub run_date: Vec<String>,
    pub patient_id: String,
    pub bait_set: String,
    pub igo_id: String,
    pub tumor_type: TumorType,
}

impl ReadGroupPayload {
    /// Number of lanes described.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.R1.len()
    }

    /// The latest lane run date, if any lane has one.
    #[must_use]
    pub fn latest_run_date(&self) -> Option<&str> {
        self.run_date.iter().filter(|d| !d.is_empty()).map(String::as_str).max()
    }

    /// True when every per-lane field has one entry per lane.
    #[must_use]
    pub fn is_lane_aligned(&self) -> bool {
        let n = self.lane_count();
        [
            self.R2.len(),
            self.R1_bid.len(),
            self.R2_bid.len(),
            self.PU.len(),
            self.ID.len(),
            self.run_date.len(),
        ]
        .iter()
        .all(|&len| len == n)
    }
}
