//! Multi-tier search for the normal sample that accompanies a tumor.
//!
//! A [`NormalResolutionChain`] holds an ordered list of [`NormalStrategy`] tiers and
//! returns the first tier's hit. The default chain is:
//!
//! 1. [`SameRequestNormal`] - normals of the patient within the tumor's request
//! 2. [`CrossRequestNormal`] - normals of the patient in any request
//! 3. [`DmpNormalLookup`] - external reference-normal lookup by patient
//! 4. [`ClosestRelatedNormal`] - closest related normal by patient
//! 5. [`PooledNormal`] - pooled normal by bait set and specimen type
//!
//! Tiers 3 to 5 match nothing unless a lookup is installed. Repository tiers only
//! consider igo-complete normals.
//!
//! # Tie-break
//!
//! When a repository tier finds several normal samples, each sample is dated by the
//! latest run date among its files (samples without dates sort first) and the latest
//! sample wins. Equal dates are broken by the lowest igo_id; the resolution is then
//! flagged ambiguous and a warning is logged. A candidate whose files cannot be
//! assembled is skipped with a warning and the next-ranked candidate is tried.

use chrono::NaiveDate;
use log::{debug, warn};
use std::cmp::Reverse;

use crate::assembler::{ReadGroupAssembler, group_by_sample};
use crate::errors::Result;
use crate::read_group::ReadGroupPayload;
use crate::repository::{FileEntry, MetadataRepository, SampleFilter};
use crate::sample::{SampleRecord, TumorType};
use tnpair_metrics::NormalSource;

/// What is known about a tumor when searching for its normal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalQuery {
    pub patient_id: String,
    pub bait_set: String,
    pub request_id: Option<String>,
    pub specimen_type: Option<String>,
    /// The tumor's igo_id, for log messages
    pub tumor_igo_id: Option<String>,
}

impl NormalQuery {
    #[must_use]
    pub fn new(patient_id: impl Into<String>, bait_set: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            bait_set: bait_set.into(),
            request_id: None,
            specimen_type: None,
            tumor_igo_id: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_specimen_type(mut self, specimen_type: impl Into<String>) -> Self {
        self.specimen_type = Some(specimen_type.into());
        self
    }

    /// Builds the query for a tumor record.
    #[must_use]
    pub fn for_tumor(tumor: &SampleRecord) -> Self {
        Self {
            patient_id: tumor.patient_id.clone(),
            bait_set: tumor.bait_set.clone(),
            request_id: tumor.request_id.clone(),
            specimen_type: tumor.specimen_type.clone(),
            tumor_igo_id: tumor.igo_id.clone(),
        }
    }

    fn tumor_label(&self) -> &str {
        self.tumor_igo_id.as_deref().unwrap_or("<unknown>")
    }
}

/// A normal found by one of the chain's tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub payload: ReadGroupPayload,
    /// The tier that produced the normal
    pub source: NormalSource,
    /// True when the tie-break had to choose between equally recent samples
    pub ambiguous: bool,
}

/// Options controlling the repository-backed tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Restrict same- and cross-request normals to the tumor's bait set
    pub match_bait_set: bool,
}

/// One tier of the resolution chain.
pub trait NormalStrategy: Send + Sync {
    /// The tier this strategy implements.
    fn source(&self) -> NormalSource;

    /// Attempts to find a normal for `query`.
    ///
    /// # Errors
    /// Propagates repository and assembly errors; "no match" is `Ok(None)`.
    fn attempt(
        &self,
        query: &NormalQuery,
        repository: &dyn MetadataRepository,
        assembler: &ReadGroupAssembler,
    ) -> Result<Option<Resolution>>;
}

/// Tier 1: normals of the tumor's patient delivered under the tumor's request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameRequestNormal {
    options: ResolutionOptions,
}

impl SameRequestNormal {
    #[must_use]
    pub fn new(options: ResolutionOptions) -> Self {
        Self { options }
    }
}

impl NormalStrategy for SameRequestNormal {
    fn source(&self) -> NormalSource {
        NormalSource::SameRequest
    }

    fn attempt(
        &self,
        query: &NormalQuery,
        repository: &dyn MetadataRepository,
        assembler: &ReadGroupAssembler,
    ) -> Result<Option<Resolution>> {
        let Some(request_id) = query.request_id.as_deref() else {
            return Ok(None);
        };
        let filter = normal_filter(query, self.options).request_id(request_id);
        let entries = repository.find_samples(&filter)?;
        resolve_from_entries(entries, query, self.source(), assembler)
    }
}

/// Tier 2: normals of the tumor's patient in any request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossRequestNormal {
    options: ResolutionOptions,
}

impl CrossRequestNormal {
    #[must_use]
    pub fn new(options: ResolutionOptions) -> Self {
        Self { options }
    }
}

impl NormalStrategy for CrossRequestNormal {
    fn source(&self) -> NormalSource {
        NormalSource::CrossRequest
    }

    fn attempt(
        &self,
        query: &NormalQuery,
        repository: &dyn MetadataRepository,
        assembler: &ReadGroupAssembler,
    ) -> Result<Option<Resolution>> {
        let entries = repository.find_samples(&normal_filter(query, self.options))?;
        resolve_from_entries(entries, query, self.source(), assembler)
    }
}

/// Lookup of an external normal by patient id.
pub type PatientNormalLookup =
    Box<dyn Fn(&str) -> Result<Option<ReadGroupPayload>> + Send + Sync>;

/// Lookup of a pooled normal by bait set and specimen type.
pub type PooledNormalLookup =
    Box<dyn Fn(&str, Option<&str>) -> Result<Option<ReadGroupPayload>> + Send + Sync>;

/// Tier 3: reference normal from the clinical sequencing archive.
#[derive(Default)]
pub struct DmpNormalLookup {
    lookup: Option<PatientNormalLookup>,
}

impl DmpNormalLookup {
    #[must_use]
    pub fn new(lookup: PatientNormalLookup) -> Self {
        Self { lookup: Some(lookup) }
    }
}

impl NormalStrategy for DmpNormalLookup {
    fn source(&self) -> NormalSource {
        NormalSource::DmpNormal
    }

    fn attempt(
        &self,
        query: &NormalQuery,
        _repository: &dyn MetadataRepository,
        _assembler: &ReadGroupAssembler,
    ) -> Result<Option<Resolution>> {
        let Some(lookup) = &self.lookup else { return Ok(None) };
        Ok(lookup(&query.patient_id)?.map(|payload| unambiguous(payload, self.source())))
    }
}

/// Tier 4: the closest related normal of the patient.
#[derive(Default)]
pub struct ClosestRelatedNormal {
    lookup: Option<PatientNormalLookup>,
}

impl ClosestRelatedNormal {
    #[must_use]
    pub fn new(lookup: PatientNormalLookup) -> Self {
        Self { lookup: Some(lookup) }
    }
}

impl NormalStrategy for ClosestRelatedNormal {
    fn source(&self) -> NormalSource {
        NormalSource::ClosestRelated
    }

    fn attempt(
        &self,
        query: &NormalQuery,
        _repository: &dyn MetadataRepository,
        _assembler: &ReadGroupAssembler,
    ) -> Result<Option<Resolution>> {
        let Some(lookup) = &self.lookup else { return Ok(None) };
        Ok(lookup(&query.patient_id)?.map(|payload| unambiguous(payload, self.source())))
    }
}

/// Tier 5: a pooled normal for the assay and preservation type.
#[derive(Default)]
pub struct PooledNormal {
    lookup: Option<PooledNormalLookup>,
}

impl PooledNormal {
    #[must_use]
    pub fn new(lookup: PooledNormalLookup) -> Self {
        Self { lookup: Some(lookup) }
    }
}

impl NormalStrategy for PooledNormal {
    fn source(&self) -> NormalSource {
        NormalSource::PooledNormal
    }

    fn attempt(
        &self,
        query: &NormalQuery,
        _repository: &dyn MetadataRepository,
        _assembler: &ReadGroupAssembler,
    ) -> Result<Option<Resolution>> {
        let Some(lookup) = &self.lookup else { return Ok(None) };
        Ok(lookup(&query.bait_set, query.specimen_type.as_deref())?
            .map(|payload| unambiguous(payload, self.source())))
    }
}

/// Ordered list of tiers; the first tier with a match wins.
pub struct NormalResolutionChain {
    strategies: Vec<Box<dyn NormalStrategy>>,
    assembler: ReadGroupAssembler,
}

impl Default for NormalResolutionChain {
    fn default() -> Self {
        Self::new(ResolutionOptions::default(), ReadGroupAssembler::default())
    }
}

impl NormalResolutionChain {
    /// The five default tiers, with the extension tiers matching nothing.
    #[must_use]
    pub fn new(options: ResolutionOptions, assembler: ReadGroupAssembler) -> Self {
        Self {
            strategies: vec![
                Box::new(SameRequestNormal::new(options)),
                Box::new(CrossRequestNormal::new(options)),
                Box::new(DmpNormalLookup::default()),
                Box::new(ClosestRelatedNormal::default()),
                Box::new(PooledNormal::default()),
            ],
            assembler,
        }
    }

    /// A chain with no tiers; add them with [`Self::with_strategy`].
    #[must_use]
    pub fn empty(assembler: ReadGroupAssembler) -> Self {
        Self { strategies: Vec::new(), assembler }
    }

    /// Replaces the tier with the same source, or appends `strategy` if there is none.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn NormalStrategy>) -> Self {
        let source = strategy.source();
        match self.strategies.iter().position(|s| s.source() == source) {
            Some(i) => self.strategies[i] = strategy,
            None => self.strategies.push(strategy),
        }
        self
    }

    #[must_use]
    pub fn with_dmp_normal_lookup(self, lookup: PatientNormalLookup) -> Self {
        self.with_strategy(Box::new(DmpNormalLookup::new(lookup)))
    }

    #[must_use]
    pub fn with_closest_related_normal(self, lookup: PatientNormalLookup) -> Self {
        self.with_strategy(Box::new(ClosestRelatedNormal::new(lookup)))
    }

    #[must_use]
    pub fn with_pooled_normal(self, lookup: PooledNormalLookup) -> Self {
        self.with_strategy(Box::new(PooledNormal::new(lookup)))
    }

    /// The tiers in evaluation order.
    #[must_use]
    pub fn tiers(&self) -> Vec<NormalSource> {
        self.strategies.iter().map(|s| s.source()).collect()
    }

    #[must_use]
    pub fn assembler(&self) -> &ReadGroupAssembler {
        &self.assembler
    }

    /// Runs the tiers in order and returns the first match.
    ///
    /// # Errors
    /// Returns the first repository or assembly error; later tiers are not tried.
    pub fn resolve_normal(
        &self,
        query: &NormalQuery,
        repository: &dyn MetadataRepository,
    ) -> Result<Option<Resolution>> {
        for strategy in &self.strategies {
            if let Some(resolution) = strategy.attempt(query, repository, &self.assembler)? {
                debug!(
                    "Tumor {} resolved to normal {} via {}",
                    query.tumor_label(),
                    resolution.payload.igo_id,
                    resolution.source
                );
                return Ok(Some(resolution));
            }
        }
        debug!("No normal found for tumor {} (patient {})", query.tumor_label(), query.patient_id);
        Ok(None)
    }
}

/// Ranks the samples in a set of entries, most recent first.
///
/// Each item holds one sample's entries and whether its date ties with the next-ranked
/// sample.
#[must_use]
pub fn rank_by_recency(entries: Vec<FileEntry>) -> Vec<(Vec<FileEntry>, bool)> {
    let mut candidates: Vec<(Option<NaiveDate>, String, Vec<FileEntry>)> = group_by_sample(entries)
        .into_iter()
        .map(|(igo_id, entries)| {
            let date = entries.iter().filter_map(|e| e.metadata.run_date).max();
            (date, igo_id, entries)
        })
        .collect();
    candidates.sort_by(|a, b| (Reverse(a.0), &a.1).cmp(&(Reverse(b.0), &b.1)));

    let dates: Vec<Option<NaiveDate>> = candidates.iter().map(|c| c.0).collect();
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, (date, _, entries))| (entries, dates.get(i + 1) == Some(&date)))
        .collect()
}

/// Picks the most recent sample from a set of entries.
///
/// Returns the winning sample's entries and whether the choice was a tie.
#[must_use]
pub fn select_latest(entries: Vec<FileEntry>) -> Option<(Vec<FileEntry>, bool)> {
    rank_by_recency(entries).into_iter().next()
}

fn normal_filter(query: &NormalQuery, options: ResolutionOptions) -> SampleFilter {
    let filter = SampleFilter::new()
        .patient_id(&query.patient_id)
        .tumor_type(TumorType::Normal)
        .igo_complete_only();
    if options.match_bait_set { filter.bait_set(&query.bait_set) } else { filter }
}

/// Assembles the most recent candidate, falling back down the ranking when a candidate's
/// files cannot be assembled. Only repository errors propagate.
fn resolve_from_entries(
    entries: Vec<FileEntry>,
    query: &NormalQuery,
    source: NormalSource,
    assembler: &ReadGroupAssembler,
) -> Result<Option<Resolution>> {
    for (candidate, ambiguous) in rank_by_recency(entries) {
        let payload = match assembler.assemble(&candidate) {
            Ok(payload) => payload,
            Err(e) if e.is_retryable() => return Err(e),
            Err(e) => {
                warn!("Skipping {source} candidate for tumor {}: {e}", query.tumor_label());
                continue;
            }
        };
        if ambiguous {
            warn!(
                "Several normals of patient {} share the latest run date for tumor {}; chose {} ({})",
                query.patient_id,
                query.tumor_label(),
                payload.igo_id,
                source
            );
        }
        return Ok(Some(Resolution { payload, source, ambiguous }));
    }
    Ok(None)
}

fn unambiguous(payload: ReadGroupPayload, source: NormalSource) -> Resolution {
    Resolution { payload, source, ambiguous: false }
}
