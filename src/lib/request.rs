//! Builds the sample set of one request from the repository.
//!
//! Only entries marked `igocomplete` are used. Entries are grouped by igo_id in the
//! order the repository returns them, so the output order is stable for a given
//! repository state.

use log::{debug, info, warn};

use crate::assembler::{ReadGroupAssembler, group_by_sample};
use crate::errors::Result;
use crate::read_group::ReadGroupPayload;
use crate::repository::{FileEntry, MetadataRepository, SampleFilter};
use crate::sample::SampleRecord;

/// Turns the repository entries of a request into sample records or payloads.
#[derive(Debug, Clone, Default)]
pub struct RequestSampleBuilder {
    assembler: ReadGroupAssembler,
    include_read_groups: bool,
}

impl RequestSampleBuilder {
    #[must_use]
    pub fn new(assembler: ReadGroupAssembler) -> Self {
        Self { assembler, include_read_groups: false }
    }

    /// Attach the assembled read-group payload to every record.
    #[must_use]
    pub fn with_read_groups(mut self, include: bool) -> Self {
        self.include_read_groups = include;
        self
    }

    fn grouped(
        &self,
        repository: &dyn MetadataRepository,
        request_id: &str,
    ) -> Result<Vec<(String, Vec<FileEntry>)>> {
        let filter = SampleFilter::new().request_id(request_id).igo_complete_only();
        let groups = group_by_sample(repository.find_samples(&filter)?);
        info!("Request {request_id} has {} complete samples", groups.len());
        Ok(groups)
    }

    /// One sample record per igo-complete sample of the request.
    ///
    /// Samples whose metadata has no tumor/normal classification are skipped with a
    /// warning.
    ///
    /// # Errors
    /// Propagates repository errors, and assembly errors when read groups are included.
    pub fn samples(
        &self,
        repository: &dyn MetadataRepository,
        request_id: &str,
    ) -> Result<Vec<SampleRecord>> {
        let mut samples = Vec::new();
        for (igo_id, entries) in self.grouped(repository, request_id)? {
            let metadata = &entries[0].metadata;
            let Some(tumor_type) = metadata.tumor_type else {
                warn!("Sample {igo_id} in request {request_id} has no tumorOrNormal; skipping");
                continue;
            };

            let mut record = SampleRecord::new(&metadata.patient_id, &metadata.bait_set, tumor_type)
                .with_igo_id(&igo_id)
                .with_request_id(request_id);
            record.specimen_type.clone_from(&metadata.specimen_type);
            record.run_date = entries.iter().filter_map(|e| e.metadata.run_date).max();
            if self.include_read_groups {
                record.read_group = Some(Box::new(self.assembler.assemble(&entries)?));
            }
            debug!("Built {tumor_type} sample {igo_id} for patient {}", record.patient_id);
            samples.push(record);
        }
        Ok(samples)
    }

    /// The read-group payload of every igo-complete sample of the request.
    ///
    /// # Errors
    /// Propagates repository and assembly errors.
    pub fn payloads(
        &self,
        repository: &dyn MetadataRepository,
        request_id: &str,
    ) -> Result<Vec<ReadGroupPayload>> {
        self.grouped(repository, request_id)?
            .into_iter()
            .map(|(_, entries)| self.assembler.assemble(&entries))
            .collect()
    }
}
