//! The pairing engine: matches every tumor in a sample set with a normal.
//!
//! Tumors are processed in input order. A normal from the input set with the same
//! `(patient_id, bait_set)` is always preferred; otherwise the
//! [`NormalResolutionChain`] searches the repository and extension tiers. Duplicate
//! tumors are each paired independently.

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{PairingError, Result};
use crate::read_group::ReadGroupPayload;
use crate::repository::MetadataRepository;
use crate::resolver::{NormalQuery, NormalResolutionChain, Resolution};
use crate::sample::{SampleRecord, validate_samples};
use tnpair_metrics::{NormalSource, PairingMetric, PairingSummaryMetrics};

/// What to do with a tumor for which no tier finds a normal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingNormalPolicy {
    /// Leave the tumor out of the pairs and list it as unpaired
    #[default]
    Omit,
    /// Pair the tumor with a null normal
    Keep,
    /// Fail the whole pairing run
    Fail,
}

/// The normal half of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalSample {
    /// Assembled from repository entries or an extension lookup
    Resolved(Box<ReadGroupPayload>),
    /// Taken from the input sample set
    Local(SampleRecord),
}

impl NormalSample {
    /// The normal's igo_id, if known.
    #[must_use]
    pub fn igo_id(&self) -> Option<&str> {
        match self {
            Self::Resolved(payload) => Some(&payload.igo_id),
            Self::Local(record) => record.igo_id.as_deref(),
        }
    }

    #[must_use]
    pub fn patient_id(&self) -> &str {
        match self {
            Self::Resolved(payload) => &payload.patient_id,
            Self::Local(record) => &record.patient_id,
        }
    }

    #[must_use]
    pub fn as_payload(&self) -> Option<&ReadGroupPayload> {
        match self {
            Self::Resolved(payload) => Some(payload),
            Self::Local(_) => None,
        }
    }

    fn request_ids(&self) -> Vec<String> {
        match self {
            Self::Resolved(payload) => payload.request_id.clone(),
            Self::Local(record) => record.request_id.iter().cloned().collect(),
        }
    }
}

/// Index-aligned tumor and normal sequences.
///
/// `normal[i]` is the normal of `tumor[i]`; it is `None` only under
/// [`MissingNormalPolicy::Keep`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingResult {
    pub tumor: Vec<SampleRecord>,
    pub normal: Vec<Option<NormalSample>>,
    /// Tumors left out under [`MissingNormalPolicy::Omit`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unpaired: Vec<SampleRecord>,
    /// One row per input tumor, in input order
    #[serde(skip)]
    pub outcomes: Vec<PairingMetric>,
}

impl PairingResult {
    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tumor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tumor.is_empty()
    }

    /// Iterates over `(tumor, normal)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&SampleRecord, Option<&NormalSample>)> {
        self.tumor.iter().zip(self.normal.iter().map(Option::as_ref))
    }

    /// Per-tumor metric rows.
    #[must_use]
    pub fn metrics(&self) -> &[PairingMetric] {
        &self.outcomes
    }

    #[must_use]
    pub fn summary(&self) -> PairingSummaryMetrics {
        PairingSummaryMetrics::from_metrics(&self.outcomes)
    }
}

/// Pairs tumors with normals against one repository.
pub struct PairingEngine<'a> {
    repository: &'a dyn MetadataRepository,
    chain: NormalResolutionChain,
    policy: MissingNormalPolicy,
}

impl<'a> PairingEngine<'a> {
    /// An engine with the default resolution chain and [`MissingNormalPolicy::Omit`].
    #[must_use]
    pub fn new(repository: &'a dyn MetadataRepository) -> Self {
        Self {
            repository,
            chain: NormalResolutionChain::default(),
            policy: MissingNormalPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_chain(mut self, chain: NormalResolutionChain) -> Self {
        self.chain = chain;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MissingNormalPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> MissingNormalPolicy {
        self.policy
    }

    /// Resolves the normal for a single tumor without consulting any input set.
    ///
    /// # Errors
    /// Propagates repository and assembly errors.
    pub fn resolve_normal(&self, query: &NormalQuery) -> Result<Option<Resolution>> {
        self.chain.resolve_normal(query, self.repository)
    }

    /// Pairs every tumor in `samples`.
    ///
    /// # Errors
    /// Returns [`PairingError::MissingField`] for malformed records before any lookup,
    /// repository and assembly errors as they occur, and
    /// [`PairingError::NoNormalFound`] under [`MissingNormalPolicy::Fail`].
    pub fn pair(&self, samples: &[SampleRecord]) -> Result<PairingResult> {
        validate_samples(samples)?;

        let (tumors, normals): (Vec<&SampleRecord>, Vec<&SampleRecord>) =
            samples.iter().partition(|s| s.is_tumor());
        debug!("Pairing {} tumors against {} input normals", tumors.len(), normals.len());

        let mut result = PairingResult::default();
        for tumor in tumors {
            let (normal, source, ambiguous) = self.find_normal(tumor, &normals)?;
            result.outcomes.push(outcome(tumor, normal.as_ref(), source, ambiguous));

            match (normal, self.policy) {
                (Some(normal), _) => {
                    result.tumor.push(tumor.clone());
                    result.normal.push(Some(normal));
                }
                (None, MissingNormalPolicy::Fail) => {
                    return Err(PairingError::NoNormalFound {
                        tumor: tumor.display_id().to_string(),
                        patient_id: tumor.patient_id.clone(),
                        bait_set: tumor.bait_set.clone(),
                    });
                }
                (None, MissingNormalPolicy::Keep) => {
                    warn!(
                        "No normal found for tumor {} (patient {}); keeping it with a null normal",
                        tumor.display_id(),
                        tumor.patient_id
                    );
                    result.tumor.push(tumor.clone());
                    result.normal.push(None);
                }
                (None, MissingNormalPolicy::Omit) => {
                    warn!(
                        "No normal found for tumor {} (patient {}); leaving it unpaired",
                        tumor.display_id(),
                        tumor.patient_id
                    );
                    result.unpaired.push(tumor.clone());
                }
            }
        }

        info!("Paired {} of {} tumors", result.len(), result.outcomes.len());
        Ok(result)
    }

    /// The first local normal with the tumor's key, else the chain's resolution.
    fn find_normal(
        &self,
        tumor: &SampleRecord,
        normals: &[&SampleRecord],
    ) -> Result<(Option<NormalSample>, Option<NormalSource>, bool)> {
        if let Some(local) = normals.iter().find(|n| n.same_patient_and_assay(tumor)) {
            return Ok((Some(NormalSample::Local((*local).clone())), Some(NormalSource::Local), false));
        }
        let query = NormalQuery::for_tumor(tumor);
        Ok(match self.chain.resolve_normal(&query, self.repository)? {
            Some(resolution) => (
                Some(NormalSample::Resolved(Box::new(resolution.payload))),
                Some(resolution.source),
                resolution.ambiguous,
            ),
            None => (None, None, false),
        })
    }
}

fn outcome(
    tumor: &SampleRecord,
    normal: Option<&NormalSample>,
    source: Option<NormalSource>,
    ambiguous: bool,
) -> PairingMetric {
    PairingMetric {
        tumor_igo_id: tumor.igo_id.clone().unwrap_or_default(),
        patient_id: tumor.patient_id.clone(),
        bait_set: tumor.bait_set.clone(),
        normal_igo_id: normal.and_then(NormalSample::igo_id).unwrap_or_default().to_string(),
        normal_request_ids: normal.map(|n| n.request_ids().join(",")).unwrap_or_default(),
        source,
        ambiguous,
    }
}
