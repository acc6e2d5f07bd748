//! Assembly of read-group payloads from repository file entries.
//!
//! All entries for one sample are split into R1 and R2 files and paired into lanes. An
//! R1 file's mate is the R2 file whose path equals the R1 path with its last `_R1_`
//! replaced by `_R2_`; a sample with exactly one R1 and one R2 is paired regardless
//! of names. Lanes are ordered by R1 path.
//!
//! Sample-level fields come from the first lane's R1 metadata:
//! - `SM` is `s_` followed by the sample name with `-` replaced by `_`
//! - `LB` is the igo_id
//!
//! Per lane, `PU` is the flowcell id and `ID` is `{SM}_{PU}`.

use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

use crate::errors::{PairingError, Result};
use crate::read_group::{ReadGroupDefaults, ReadGroupPayload};
use crate::repository::{FileEntry, ReadOrientation};

/// Builds [`ReadGroupPayload`]s from the file entries of a single sample.
#[derive(Debug, Clone, Default)]
pub struct ReadGroupAssembler {
    defaults: ReadGroupDefaults,
}

struct Lane<'a> {
    r1: &'a FileEntry,
    r2: &'a FileEntry,
}

impl ReadGroupAssembler {
    #[must_use]
    pub fn new(defaults: ReadGroupDefaults) -> Self {
        Self { defaults }
    }

    #[must_use]
    pub fn defaults(&self) -> &ReadGroupDefaults {
        &self.defaults
    }

    /// Assembles the payload for one sample.
    ///
    /// # Errors
    /// Returns [`PairingError::Assembly`] when `entries` is empty, spans more than one
    /// igo_id, contains an unpaired R1 or R2, or lacks the sample name, flowcell id or
    /// tumor/normal classification.
    pub fn assemble(&self, entries: &[FileEntry]) -> Result<ReadGroupPayload> {
        let Some(first) = entries.first() else {
            return Err(assembly_error("<none>", "no file entries"));
        };
        let igo_id = first.metadata.igo_id.as_str();
        if let Some(other) = entries.iter().find(|e| e.metadata.igo_id != igo_id) {
            return Err(assembly_error(
                igo_id,
                format!("entries belong to more than one sample (also '{}')", other.metadata.igo_id),
            ));
        }

        let lanes = pair_lanes(igo_id, entries)?;
        let primary = &lanes[0].r1.metadata;

        if primary.sample_name.is_empty() {
            return Err(assembly_error(igo_id, "metadata has no sampleName"));
        }
        let tumor_type = primary
            .tumor_type
            .ok_or_else(|| assembly_error(igo_id, "metadata has no tumorOrNormal"))?;
        let sm = sample_name_to_sm(&primary.sample_name);

        let mut payload = ReadGroupPayload {
            CN: self.defaults.sequencing_center.clone(),
            PL: self.defaults.platform.clone(),
            PU: Vec::with_capacity(lanes.len()),
            LB: igo_id.to_string(),
            SM: sm,
            ID: Vec::with_capacity(lanes.len()),
            R1: Vec::with_capacity(lanes.len()),
            R2: Vec::with_capacity(lanes.len()),
            R1_bid: Vec::with_capacity(lanes.len()),
            R2_bid: Vec::with_capacity(lanes.len()),
            species: primary.species.clone(),
            specimen_type: primary.specimen_type.clone(),
            request_id: Vec::new(),
            run_date: Vec::with_capacity(lanes.len()),
            patient_id: primary.patient_id.clone(),
            bait_set: primary.bait_set.clone(),
            igo_id: igo_id.to_string(),
            tumor_type,
        };

        for lane in &lanes {
            let pu = lane.r1.metadata.flow_cell_id.clone().ok_or_else(|| {
                assembly_error(igo_id, format!("'{}' has no flowCellId", lane.r1.path))
            })?;
            payload.ID.push(format!("{}_{pu}", payload.SM));
            payload.PU.push(pu);
            payload.R1.push(lane.r1.path.clone());
            payload.R2.push(lane.r2.path.clone());
            payload.R1_bid.push(lane.r1.file_id);
            payload.R2_bid.push(lane.r2.file_id);
            payload.run_date.push(
                lane.r1.metadata.run_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            );
        }

        payload.request_id = lanes
            .iter()
            .flat_map(|lane| [lane.r1, lane.r2])
            .map(|e| e.metadata.request_id.clone())
            .filter(|r| !r.is_empty())
            .unique()
            .collect();

        debug!("Assembled {} lane(s) for sample {igo_id}", payload.lane_count());
        Ok(payload)
    }
}

/// Converts a sample name such as `C-DRKHP7-N001-d` into `s_C_DRKHP7_N001_d`.
#[must_use]
pub fn sample_name_to_sm(sample_name: &str) -> String {
    format!("s_{}", sample_name.replace('-', "_"))
}

/// The expected R2 path for an R1 path, replacing the last `_R1_`.
#[must_use]
pub fn mate_path(r1_path: &str) -> Option<String> {
    let idx = r1_path.rfind("_R1_")?;
    Some(format!("{}_R2_{}", &r1_path[..idx], &r1_path[idx + 4..]))
}

/// Groups entries by igo_id, keeping the order in which samples are first seen.
#[must_use]
pub fn group_by_sample(entries: Vec<FileEntry>) -> Vec<(String, Vec<FileEntry>)> {
    let mut groups: Vec<(String, Vec<FileEntry>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let igo_id = entry.metadata.igo_id.clone();
        match index.get(&igo_id) {
            Some(&i) => groups[i].1.push(entry),
            None => {
                index.insert(igo_id.clone(), groups.len());
                groups.push((igo_id, vec![entry]));
            }
        }
    }
    groups
}

fn orientation(entry: &FileEntry) -> Option<ReadOrientation> {
    entry.metadata.read.or_else(|| {
        if entry.file_name.contains("_R1_") {
            Some(ReadOrientation::R1)
        } else if entry.file_name.contains("_R2_") {
            Some(ReadOrientation::R2)
        } else {
            None
        }
    })
}

fn pair_lanes<'a>(igo_id: &str, entries: &'a [FileEntry]) -> Result<Vec<Lane<'a>>> {
    let mut r1s: Vec<&FileEntry> = Vec::new();
    let mut r2s: Vec<&FileEntry> = Vec::new();
    for entry in entries {
        match orientation(entry) {
            Some(ReadOrientation::R1) => r1s.push(entry),
            Some(ReadOrientation::R2) => r2s.push(entry),
            None => {
                return Err(assembly_error(
                    igo_id,
                    format!("cannot tell whether '{}' is R1 or R2", entry.path),
                ));
            }
        }
    }
    r1s.sort_by(|a, b| a.path.cmp(&b.path));

    if r1s.len() == 1 && r2s.len() == 1 {
        return Ok(vec![Lane { r1: r1s[0], r2: r2s[0] }]);
    }

    let mut lanes = Vec::with_capacity(r1s.len());
    for r1 in r1s {
        let expected = mate_path(&r1.path);
        let position = expected
            .as_deref()
            .and_then(|p| r2s.iter().position(|r2| r2.path == p))
            .ok_or_else(|| assembly_error(igo_id, format!("R1 '{}' has no matching R2", r1.path)))?;
        lanes.push(Lane { r1, r2: r2s.swap_remove(position) });
    }

    if let Some(orphan) = r2s.first() {
        return Err(assembly_error(igo_id, format!("R2 '{}' has no matching R1", orphan.path)));
    }
    if lanes.is_empty() {
        return Err(assembly_error(igo_id, "no R1/R2 pairs"));
    }
    Ok(lanes)
}

fn assembly_error(igo_id: &str, reason: impl Into<String>) -> PairingError {
    PairingError::Assembly { igo_id: igo_id.to_string(), reason: reason.into() }
}
