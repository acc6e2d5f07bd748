//! Assemble read-group payloads for every sample of a request.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use tnpair_lib::json_io::write_json;
use tnpair_lib::logging::OperationTimer;
use tnpair_lib::request::RequestSampleBuilder;
use tnpair_lib::validation::validate_not_blank;

use crate::commands::command::Command;
use crate::commands::common::{ReadGroupOptions, RepositoryOptions};

/// Build read-group payloads for a request.
#[derive(Debug, Parser)]
#[command(
    name = "assemble",
    about = "\x1b[38;5;166m[UTILITIES]\x1b[0m      \x1b[36mAssemble read groups for a request\x1b[0m",
    long_about = r#"
Assemble the read-group payload of every igo-complete sample in a request.

Each sample's FASTQ files are paired into lanes by R1/R2 file name. The output is a
JSON list with one payload per sample, in repository order.

Example usage:
  tnpair assemble -f db.json -r 10075_D -o read_groups.json
"#
)]
pub struct Assemble {
    /// Repository options
    #[command(flatten)]
    pub repository: RepositoryOptions,

    /// Request whose samples are assembled
    #[arg(short = 'r', long = "request-id")]
    pub request_id: String,

    /// Output JSON file, or "-" for stdout
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathBuf,

    /// Read-group options
    #[command(flatten)]
    pub read_groups: ReadGroupOptions,
}

impl Command for Assemble {
    fn execute(&self, command_line: &str) -> Result<()> {
        self.repository.validate()?;
        validate_not_blank(&self.request_id, "request-id")?;

        info!("Starting Assemble");
        info!("Command line: {command_line}");

        let timer = OperationTimer::new("Assembling read groups");
        let repository = self.repository.load()?;
        let payloads = RequestSampleBuilder::new(self.read_groups.assembler())
            .payloads(&repository, &self.request_id)
            .with_context(|| format!("Failed to assemble request {}", self.request_id))?;

        let lanes: usize = payloads.iter().map(|p| p.lane_count()).sum();
        info!("Assembled {} samples with {lanes} lanes", payloads.len());
        write_json(&self.output, &payloads)
            .with_context(|| format!("Failed to write payloads to {}", self.output.display()))?;

        timer.log_completion(payloads.len() as u64);
        Ok(())
    }
}
