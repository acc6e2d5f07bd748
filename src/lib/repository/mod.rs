//! The metadata repository query contract consumed by the resolver.
//!
//! A repository is a read-only store of sequencing file entries, each carrying the
//! sample metadata recorded when the file was imported. The resolver only needs
//! [`MetadataRepository::find_samples`]; everything else in this module describes the
//! shape of what that query returns.
//!
//! - [`memory`] - a `Vec`-backed repository used by the CLI and in tests
//! - [`fixture`] - a loader for JSON fixture dumps of File/FileMetadata rows

pub mod fixture;
pub mod memory;

pub use fixture::{FixtureLoader, load_fixtures};
pub use memory::InMemoryRepository;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::errors::Result;
use crate::sample::TumorType;

/// Which read of a pair a FASTQ file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadOrientation {
    /// Forward read
    R1,
    /// Reverse read
    R2,
}

impl fmt::Display for ReadOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R1 => f.write_str("R1"),
            Self::R2 => f.write_str("R2"),
        }
    }
}

/// Sample metadata attached to one repository file.
///
/// Keys follow the repository's camelCase spelling; keys not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Sample identifier (igo_id)
    #[serde(rename = "sampleId", default)]
    pub igo_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub bait_set: String,
    /// Tumor/Normal classification
    #[serde(rename = "tumorOrNormal", default)]
    pub tumor_type: Option<TumorType>,
    /// Sample name as given by the submitter, e.g. `C-DRKHP7-N001-d`
    #[serde(default)]
    pub sample_name: String,
    #[serde(default)]
    pub specimen_type: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub run_date: Option<NaiveDate>,
    #[serde(default)]
    pub flow_cell_id: Option<String>,
    #[serde(default)]
    pub barcode_index: Option<String>,
    #[serde(default)]
    pub library_id: Option<String>,
    /// Read orientation of the FASTQ
    #[serde(rename = "R", default)]
    pub read: Option<ReadOrientation>,
    /// True once the sequencing facility has marked the sample complete
    #[serde(rename = "igocomplete", default)]
    pub igo_complete: bool,
}

/// One repository row: a FASTQ file and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Repository identifier of the file
    pub file_id: Uuid,
    /// Absolute path of the FASTQ
    pub path: String,
    pub file_name: String,
    pub metadata: FileMetadata,
}

/// Query over repository entries. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleFilter {
    pub patient_id: Option<String>,
    pub tumor_type: Option<TumorType>,
    pub request_id: Option<String>,
    pub bait_set: Option<String>,
    pub igo_id: Option<String>,
    /// Only entries whose metadata is marked `igocomplete`
    pub igo_complete_only: bool,
}

impl SampleFilter {
    /// A filter matching every entry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    #[must_use]
    pub fn tumor_type(mut self, tumor_type: TumorType) -> Self {
        self.tumor_type = Some(tumor_type);
        self
    }

    #[must_use]
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn bait_set(mut self, bait_set: impl Into<String>) -> Self {
        self.bait_set = Some(bait_set.into());
        self
    }

    #[must_use]
    pub fn igo_id(mut self, igo_id: impl Into<String>) -> Self {
        self.igo_id = Some(igo_id.into());
        self
    }

    #[must_use]
    pub fn igo_complete_only(mut self) -> Self {
        self.igo_complete_only = true;
        self
    }

    /// True if the entry satisfies every set field.
    #[must_use]
    pub fn matches(&self, entry: &FileEntry) -> bool {
        let m = &entry.metadata;
        self.patient_id.as_ref().is_none_or(|p| *p == m.patient_id)
            && self.tumor_type.is_none_or(|t| m.tumor_type == Some(t))
            && self.request_id.as_ref().is_none_or(|r| *r == m.request_id)
            && self.bait_set.as_ref().is_none_or(|b| *b == m.bait_set)
            && self.igo_id.as_ref().is_none_or(|i| *i == m.igo_id)
            && (!self.igo_complete_only || m.igo_complete)
    }
}

/// Read-only query capability over file entries.
///
/// Implementations must return entries in a stable order for identical repository
/// state. Backend failures are reported as
/// [`PairingError::Repository`](crate::errors::PairingError::Repository).
pub trait MetadataRepository: Send + Sync {
    /// All entries matching `filter`.
    fn find_samples(&self, filter: &SampleFilter) -> Result<Vec<FileEntry>>;
}
