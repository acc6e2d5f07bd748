//! Metrics describing how tumors in a request were paired with normals.
//!
//! One [`PairingMetric`] row is produced per tumor; [`PairingSummaryMetrics`]
//! rolls those rows up into counts per [`NormalSource`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Metric, ProcessingMetrics};

/// Where the normal paired with a tumor came from.
///
/// The variants are listed in the order the resolver tries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSource {
    /// A normal supplied alongside the tumor in the same input set
    Local,
    /// A repository normal from the tumor's own request
    SameRequest,
    /// A repository normal from any other request or project
    CrossRequest,
    /// A clinical reference normal from the DMP lookup
    DmpNormal,
    /// The closest related normal inferred from relatedness data
    ClosestRelated,
    /// A pooled normal chosen by assay and preservation type
    PooledNormal,
}

impl NormalSource {
    /// Returns a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Local => "Normal supplied in the same sample set",
            Self::SameRequest => "Repository normal from the same request",
            Self::CrossRequest => "Repository normal from another request",
            Self::DmpNormal => "DMP reference normal",
            Self::ClosestRelated => "Closest related normal",
            Self::PooledNormal => "Pooled normal",
        }
    }

    /// Returns the short snake-case name used in metric files.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::SameRequest => "same_request",
            Self::CrossRequest => "cross_request",
            Self::DmpNormal => "dmp_normal",
            Self::ClosestRelated => "closest_related",
            Self::PooledNormal => "pooled_normal",
        }
    }
}

impl fmt::Display for NormalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-tumor pairing outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingMetric {
    /// Sample identifier of the tumor, empty when the input record had none
    pub tumor_igo_id: String,
    /// Patient identifier shared by the tumor and its normal
    pub patient_id: String,
    /// Capture panel of the tumor
    pub bait_set: String,
    /// Sample identifier of the chosen normal, empty when unpaired or unknown
    pub normal_igo_id: String,
    /// Requests the normal was sequenced under, comma-separated
    pub normal_request_ids: String,
    /// How the normal was found; absent when the tumor stayed unpaired
    pub source: Option<NormalSource>,
    /// True when more than one candidate tied on run date
    pub ambiguous: bool,
}

impl Metric for PairingMetric {
    fn metric_name() -> &'static str {
        "pairing"
    }
}

impl PairingMetric {
    /// True if a normal was found for the tumor.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.source.is_some()
    }
}

/// Roll-up of [`PairingMetric`] rows for one pairing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingSummaryMetrics {
    /// Number of tumors in the input
    pub tumors: u64,
    /// Tumors that received a normal
    pub paired: u64,
    /// Tumors for which no normal was found
    pub unpaired: u64,
    /// Tumors paired with a normal from the input set
    pub local: u64,
    /// Tumors paired with a repository normal from the same request
    pub same_request: u64,
    /// Tumors paired with a repository normal from another request
    pub cross_request: u64,
    /// Tumors paired through the DMP lookup
    pub dmp_normal: u64,
    /// Tumors paired with the closest related normal
    pub closest_related: u64,
    /// Tumors paired with a pooled normal
    pub pooled_normal: u64,
    /// Tumors whose normal was chosen by the igo_id tie-break
    pub ambiguous: u64,
}

impl Metric for PairingSummaryMetrics {
    fn metric_name() -> &'static str {
        "pairing summary"
    }
}

impl PairingSummaryMetrics {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a summary from per-tumor rows.
    #[must_use]
    pub fn from_metrics(metrics: &[PairingMetric]) -> Self {
        let mut summary = Self::new();
        for metric in metrics {
            summary.add(metric);
        }
        summary
    }

    /// Adds one per-tumor row to the counts.
    pub fn add(&mut self, metric: &PairingMetric) {
        self.tumors += 1;
        if metric.ambiguous {
            self.ambiguous += 1;
        }
        let Some(source) = metric.source else {
            self.unpaired += 1;
            return;
        };
        self.paired += 1;
        let counter = match source {
            NormalSource::Local => &mut self.local,
            NormalSource::SameRequest => &mut self.same_request,
            NormalSource::CrossRequest => &mut self.cross_request,
            NormalSource::DmpNormal => &mut self.dmp_normal,
            NormalSource::ClosestRelated => &mut self.closest_related,
            NormalSource::PooledNormal => &mut self.pooled_normal,
        };
        *counter += 1;
    }

    /// Count of tumors paired from the given source.
    #[must_use]
    pub fn count(&self, source: NormalSource) -> u64 {
        match source {
            NormalSource::Local => self.local,
            NormalSource::SameRequest => self.same_request,
            NormalSource::CrossRequest => self.cross_request,
            NormalSource::DmpNormal => self.dmp_normal,
            NormalSource::ClosestRelated => self.closest_related,
            NormalSource::PooledNormal => self.pooled_normal,
        }
    }
}

impl ProcessingMetrics for PairingSummaryMetrics {
    fn total_input(&self) -> u64 {
        self.tumors
    }

    fn total_output(&self) -> u64 {
        self.paired
    }

    fn total_filtered(&self) -> u64 {
        self.unpaired
    }
}
