//! Resolve the normal for a single tumor directly against the repository.

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use tnpair_lib::json_io::write_json;
use tnpair_lib::logging::OperationTimer;
use tnpair_lib::resolver::NormalQuery;
use tnpair_lib::validation::validate_not_blank;

use crate::commands::command::Command;
use crate::commands::common::{ReadGroupOptions, RepositoryOptions, ResolutionArgs};

/// Find the normal for one tumor.
#[derive(Debug, Parser)]
#[command(
    name = "resolve",
    about = "\x1b[38;5;72m[PAIRING]\x1b[0m        \x1b[36mResolve the normal for a single tumor\x1b[0m",
    long_about = r#"
Find the normal sample for one tumor by patient and bait set.

The resolution tiers are tried in order: normals of the patient in the given request,
then normals of the patient in any request. The read-group payload of the chosen
normal is written as JSON. Exits with an error when no normal is found.

Example usage:
  tnpair resolve -f db.json -p C-DRKHP7 -b IMPACT468_BAITS -r 10075_D
"#
)]
pub struct Resolve {
    /// Repository options
    #[command(flatten)]
    pub repository: RepositoryOptions,

    /// Patient of the tumor
    #[arg(short = 'p', long = "patient-id")]
    pub patient_id: String,

    /// Bait set of the tumor
    #[arg(short = 'b', long = "bait-set")]
    pub bait_set: String,

    /// Request of the tumor; without it the same-request tier is skipped
    #[arg(short = 'r', long = "request-id")]
    pub request_id: Option<String>,

    /// Specimen type of the tumor (e.g. FFPE)
    #[arg(long = "specimen-type")]
    pub specimen_type: Option<String>,

    /// Output JSON file, or "-" for stdout
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,

    /// Resolution options
    #[command(flatten)]
    pub resolution: ResolutionArgs,

    /// Read-group options
    #[command(flatten)]
    pub read_groups: ReadGroupOptions,
}

impl Resolve {
    fn query(&self) -> NormalQuery {
        let mut query = NormalQuery::new(&self.patient_id, &self.bait_set);
        query.request_id.clone_from(&self.request_id);
        query.specimen_type.clone_from(&self.specimen_type);
        query
    }
}

impl Command for Resolve {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.repository.validate()?;
        validate_not_blank(&self.patient_id, "patient-id")?;
        validate_not_blank(&self.bait_set, "bait-set")?;

        info!("Starting Resolve");
        info!("Command line: {command_line}");

        let timer = OperationTimer::new("Resolving normal");
        let repository = self.repository.load()?;
        let chain = self.resolution.chain(self.read_groups.assembler());
        let query = self.query();

        let Some(resolution) = chain
            .resolve_normal(&query, &repository)
            .context("Normal resolution failed")?
        else {
            bail!(
                "No normal found for patient {} with bait set {}",
                self.patient_id,
                self.bait_set
            );
        };

        info!(
            "Resolved normal {} via {}{}",
            resolution.payload.igo_id,
            resolution.source,
            if resolution.ambiguous { " (tie-break)" } else { "" }
        );
        write_json(&self.output, &resolution.payload)
            .with_context(|| format!("Failed to write payload to {}", self.output.display()))?;

        timer.log_completion(1);
        Ok(())
    }
}
