//! Loader for JSON fixture dumps of the file repository.
//!
//! A fixture is a JSON array of `{"model": ..., "pk": ..., "fields": {...}}` objects.
//! Two models are read:
//!
//! - `file_system.file` - `pk` is the file UUID; `fields` holds `file_name` and `path`
//! - `file_system.filemetadata` - `fields.file` references a file UUID and
//!   `fields.metadata` holds the sample metadata (an object, or a JSON string)
//!
//! Other models are skipped. A file may carry several metadata versions; the one with
//! the greatest `(created_date, version)` wins, later loads winning exact ties. Loading
//! the same file `pk` twice replaces the earlier row. Files without metadata are dropped.

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use super::memory::InMemoryRepository;
use super::{FileEntry, FileMetadata};
use crate::errors::{PairingError, Result};

const FILE_MODEL: &str = "file_system.file";
const FILE_METADATA_MODEL: &str = "file_system.filemetadata";

#[derive(Debug, Deserialize)]
struct FixtureObject {
    model: String,
    #[serde(default)]
    pk: Value,
    #[serde(default)]
    fields: Value,
}

#[derive(Debug, Deserialize)]
struct FileFields {
    file_name: String,
    path: String,
}

#[derive(Debug, Deserialize)]
struct FileMetadataFields {
    file: Uuid,
    metadata: Value,
    #[serde(default)]
    version: i64,
    /// ISO-8601 timestamp; compared as a string
    #[serde(default)]
    created_date: String,
}

#[derive(Debug)]
struct MetadataVersion {
    created_date: String,
    version: i64,
    metadata: FileMetadata,
}

/// Accumulates fixture objects from one or more sources into a repository.
#[derive(Debug, Default)]
pub struct FixtureLoader {
    files: Vec<(Uuid, FileFields)>,
    file_index: HashMap<Uuid, usize>,
    metadata: HashMap<Uuid, MetadataVersion>,
}

impl FixtureLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and adds one fixture file.
    ///
    /// # Errors
    /// Returns [`PairingError::InvalidFileFormat`] if the file cannot be read or parsed.
    pub fn add_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| PairingError::InvalidFileFormat {
            file_type: "fixture".to_string(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let count = self.add_str(&text, &path.display().to_string())?;
        info!("Loaded {count} fixture objects from {}", path.display());
        Ok(count)
    }

    /// Parses and adds fixture JSON; `source` names the input in error messages.
    ///
    /// Returns the number of objects read.
    ///
    /// # Errors
    /// Returns [`PairingError::InvalidFileFormat`] if the JSON is malformed or a file or
    /// metadata object lacks required fields.
    pub fn add_str(&mut self, json: &str, source: &str) -> Result<usize> {
        let invalid = |reason: String| PairingError::InvalidFileFormat {
            file_type: "fixture".to_string(),
            path: source.to_string(),
            reason,
        };

        let objects: Vec<FixtureObject> =
            serde_json::from_str(json).map_err(|e| invalid(e.to_string()))?;

        for (i, object) in objects.iter().enumerate() {
            match object.model.as_str() {
                FILE_MODEL => {
                    let file_id: Uuid = serde_json::from_value(object.pk.clone())
                        .map_err(|e| invalid(format!("object {i}: bad file pk: {e}")))?;
                    let fields: FileFields = serde_json::from_value(object.fields.clone())
                        .map_err(|e| invalid(format!("object {i}: {e}")))?;
                    self.add_file(file_id, fields);
                }
                FILE_METADATA_MODEL => {
                    let fields: FileMetadataFields = serde_json::from_value(object.fields.clone())
                        .map_err(|e| invalid(format!("object {i}: {e}")))?;
                    let metadata = parse_metadata(fields.metadata)
                        .map_err(|e| invalid(format!("object {i}: bad metadata: {e}")))?;
                    self.add_metadata(
                        fields.file,
                        MetadataVersion {
                            created_date: fields.created_date,
                            version: fields.version,
                            metadata,
                        },
                    );
                }
                other => debug!("Skipping fixture object {i} of model '{other}' in {source}"),
            }
        }
        Ok(objects.len())
    }

    fn add_file(&mut self, file_id: Uuid, fields: FileFields) {
        if let Some(&index) = self.file_index.get(&file_id) {
            self.files[index].1 = fields;
        } else {
            self.file_index.insert(file_id, self.files.len());
            self.files.push((file_id, fields));
        }
    }

    fn add_metadata(&mut self, file_id: Uuid, candidate: MetadataVersion) {
        let replace = self.metadata.get(&file_id).is_none_or(|current| {
            (&candidate.created_date, candidate.version)
                >= (&current.created_date, current.version)
        });
        if replace {
            self.metadata.insert(file_id, candidate);
        }
    }

    /// Joins files with their most recent metadata, in file load order.
    #[must_use]
    pub fn finish(mut self) -> InMemoryRepository {
        let mut entries = Vec::with_capacity(self.files.len());
        for (file_id, fields) in self.files {
            match self.metadata.remove(&file_id) {
                Some(version) => entries.push(FileEntry {
                    file_id,
                    path: fields.path,
                    file_name: fields.file_name,
                    metadata: version.metadata,
                }),
                None => debug!("File {file_id} ({}) has no metadata; skipping", fields.file_name),
            }
        }
        if !self.metadata.is_empty() {
            warn!("{} metadata objects reference files not present in any fixture", self.metadata.len());
        }
        InMemoryRepository::new(entries)
    }
}

fn parse_metadata(value: Value) -> serde_json::Result<FileMetadata> {
    match value {
        Value::String(text) => serde_json::from_str(&text),
        other => serde_json::from_value(other),
    }
}

/// Loads every fixture file into a single repository.
///
/// # Errors
/// Returns the first file's read or parse error.
pub fn load_fixtures<P: AsRef<Path>>(paths: &[P]) -> Result<InMemoryRepository> {
    let mut loader = FixtureLoader::new();
    for path in paths {
        loader.add_path(path)?;
    }
    let repository = loader.finish();
    info!("Repository holds {} file entries", repository.len());
    Ok(repository)
}
