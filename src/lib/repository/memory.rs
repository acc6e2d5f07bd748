//! A `Vec`-backed metadata repository.

use log::debug;

use super::{FileEntry, MetadataRepository, SampleFilter};
use crate::errors::Result;

/// Repository holding all entries in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    entries: Vec<FileEntry>,
}

impl InMemoryRepository {
    /// Creates a repository over the given entries.
    #[must_use]
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self { entries }
    }

    /// Appends one entry.
    pub fn push(&mut self, entry: FileEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }
}

impl FromIterator<FileEntry> for InMemoryRepository {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl MetadataRepository for InMemoryRepository {
    fn find_samples(&self, filter: &SampleFilter) -> Result<Vec<FileEntry>> {
        let found: Vec<FileEntry> =
            self.entries.iter().filter(|e| filter.matches(e)).cloned().collect();
        debug!("Repository query {filter:?} matched {} entries", found.len());
        Ok(found)
    }
}
