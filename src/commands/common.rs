//! Common CLI options shared across commands.
//!
//! This module provides shared argument structures that can be composed into
//! command structs using `#[command(flatten)]`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use tnpair_lib::assembler::ReadGroupAssembler;
use tnpair_lib::read_group::{DEFAULT_PLATFORM, DEFAULT_SEQUENCING_CENTER, ReadGroupDefaults};
use tnpair_lib::repository::{InMemoryRepository, load_fixtures};
use tnpair_lib::resolver::{NormalResolutionChain, ResolutionOptions};
use tnpair_lib::validation::validate_files_exist;

/// Where repository rows are loaded from.
#[derive(Debug, Clone, Args)]
pub struct RepositoryOptions {
    /// Fixture dump files holding repository file and file-metadata rows
    #[arg(short = 'f', long = "fixtures", required = true, num_args = 1..)]
    pub fixtures: Vec<PathBuf>,
}

impl RepositoryOptions {
    /// Validates that every fixture file exists.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing file.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_files_exist(self.fixtures.as_slice(), "Fixture")?;
        Ok(())
    }

    /// Loads all fixture files into one repository.
    pub fn load(&self) -> anyhow::Result<InMemoryRepository> {
        load_fixtures(self.fixtures.as_slice()).context("Failed to load repository fixtures")
    }
}

/// Read-group values not taken from repository metadata.
#[derive(Debug, Clone, Args)]
pub struct ReadGroupOptions {
    /// Sequencing center written to CN
    #[arg(long = "sequencing-center", default_value = DEFAULT_SEQUENCING_CENTER)]
    pub sequencing_center: String,

    /// Platform written to PL
    #[arg(long = "platform", default_value = DEFAULT_PLATFORM)]
    pub platform: String,
}

impl Default for ReadGroupOptions {
    fn default() -> Self {
        Self {
            sequencing_center: DEFAULT_SEQUENCING_CENTER.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl ReadGroupOptions {
    #[must_use]
    pub fn defaults(&self) -> ReadGroupDefaults {
        ReadGroupDefaults {
            sequencing_center: self.sequencing_center.clone(),
            platform: self.platform.clone(),
        }
    }

    #[must_use]
    pub fn assembler(&self) -> ReadGroupAssembler {
        ReadGroupAssembler::new(self.defaults())
    }
}

/// Options for the repository-backed normal search.
#[derive(Debug, Clone, Default, Args)]
pub struct ResolutionArgs {
    /// Only accept repository normals sequenced with the tumor's bait set
    #[arg(long = "match-bait-set", default_value = "false")]
    pub match_bait_set: bool,
}

impl ResolutionArgs {
    /// Builds the default resolution chain with these options.
    #[must_use]
    pub fn chain(&self, assembler: ReadGroupAssembler) -> NormalResolutionChain {
        NormalResolutionChain::new(ResolutionOptions { match_bait_set: self.match_bait_set }, assembler)
    }
}
