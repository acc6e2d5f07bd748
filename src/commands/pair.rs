//! Pair the tumors of a sample set with normals.
//!
//! Samples come either from a JSON list of sample records or from the igo-complete
//! samples of a request in the repository.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use tnpair_lib::json_io::{is_stdin_path, read_json, write_json};
use tnpair_lib::logging::{OperationTimer, log_pairing_summary};
use tnpair_lib::pairing::{MissingNormalPolicy, PairingEngine};
use tnpair_lib::repository::InMemoryRepository;
use tnpair_lib::request::RequestSampleBuilder;
use tnpair_lib::sample::SampleRecord;
use tnpair_lib::validation::{validate_file_exists, validate_not_blank};
use tnpair_metrics::write_metrics_auto;

use crate::commands::command::Command;
use crate::commands::common::{ReadGroupOptions, RepositoryOptions, ResolutionArgs};

/// Pair tumor samples with normal samples.
#[derive(Debug, Parser)]
#[command(
    name = "pair",
    about = "\x1b[38;5;72m[PAIRING]\x1b[0m        \x1b[36mPair tumor samples with normal samples\x1b[0m",
    long_about = r#"
Pair every tumor in a sample set with a normal sample from the same patient.

A normal in the sample set with the tumor's patient and bait set is always used first.
Otherwise the repository is searched: normals from the tumor's own request, then
normals of the patient from any request. When several normals qualify the most
recently sequenced one is chosen.

The sample set is either a JSON list of sample records (--samples) or the
igo-complete samples of a request in the repository (--request-id).

Output is a JSON object with index-aligned "tumor" and "normal" lists.

Example usage:
  tnpair pair -f db.json -s samples.json -o pairs.json
  tnpair pair -f db.json -r 10075_D -o pairs.json -m pairing.tsv --missing-normal keep
"#
)]
pub struct Pair {
    /// Repository options
    #[command(flatten)]
    pub repository: RepositoryOptions,

    /// JSON list of sample records to pair, or "-" for stdin
    #[arg(
        short = 's',
        long = "samples",
        required_unless_present = "request_id",
        conflicts_with = "request_id"
    )]
    pub samples: Option<PathBuf>,

    /// Pair the igo-complete samples of this request
    #[arg(short = 'r', long = "request-id")]
    pub request_id: Option<String>,

    /// Output JSON file, or "-" for stdout
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Optional per-tumor pairing metrics (TSV)
    #[arg(short = 'm', long = "metrics")]
    pub metrics: Option<PathBuf>,

    /// Optional pairing summary metrics (TSV)
    #[arg(long = "summary")]
    pub summary: Option<PathBuf>,

    /// What to do with a tumor for which no normal is found
    #[arg(long = "missing-normal", value_enum, default_value_t = MissingNormalPolicy::Omit)]
    pub missing_normal: MissingNormalPolicy,

    /// Resolution options
    #[command(flatten)]
    pub resolution: ResolutionArgs,

    /// Read-group options
    #[command(flatten)]
    pub read_groups: ReadGroupOptions,
}

impl Pair {
    fn load_samples(
        &self,
        builder: &RequestSampleBuilder,
        repository: &InMemoryRepository,
    ) -> Result<Vec<SampleRecord>> {
        match (&self.samples, &self.request_id) {
            (Some(path), _) => read_json(path, "samples")
                .with_context(|| format!("Failed to read samples from {}", path.display())),
            (None, Some(request_id)) => builder
                .samples(repository, request_id)
                .with_context(|| format!("Failed to build samples for request {request_id}")),
            (None, None) => anyhow::bail!("Either --samples or --request-id is required"),
        }
    }
}

impl Command for Pair {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.repository.validate()?;
        if let Some(path) = &self.samples {
            if !is_stdin_path(path) {
                validate_file_exists(path, "Samples")?;
            }
        }
        if let Some(request_id) = &self.request_id {
            validate_not_blank(request_id, "request-id")?;
        }

        info!("Starting Pair");
        info!("Command line: {command_line}");
        info!("Missing normal policy: {:?}", self.missing_normal);
        if self.resolution.match_bait_set {
            info!("Bait set matching: enabled");
        }

        let timer = OperationTimer::new("Pairing samples");
        let repository = self.repository.load()?;
        let assembler = self.read_groups.assembler();
        let samples = self.load_samples(&RequestSampleBuilder::new(assembler.clone()), &repository)?;
        info!("Loaded {} samples", samples.len());

        let result = PairingEngine::new(&repository)
            .with_chain(self.resolution.chain(assembler))
            .with_policy(self.missing_normal)
            .pair(&samples)
            .context("Pairing failed")?;

        write_json(&self.output, &result)
            .with_context(|| format!("Failed to write pairs to {}", self.output.display()))?;

        let summary = result.summary();
        if let Some(path) = &self.metrics {
            write_metrics_auto(path, result.metrics())?;
        }
        if let Some(path) = &self.summary {
            write_metrics_auto(path, std::slice::from_ref(&summary))?;
        }

        log_pairing_summary(&summary);
        timer.log_completion(summary.tumors);
        Ok(())
    }
}
