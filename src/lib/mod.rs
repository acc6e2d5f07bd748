#![deny(unsafe_code)]
// Clippy lint configuration for CI
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::needless_pass_by_value,
    clippy::items_after_statements,
    clippy::unused_self,
    clippy::match_same_arms,
    clippy::unnecessary_wraps,
    clippy::too_many_lines,
    clippy::redundant_closure_for_method_calls,
    clippy::explicit_iter_loop,
    clippy::map_unwrap_or,
    clippy::uninlined_format_args
)]

//! # tnpair - Tumor/Normal Sample Pairing
//!
//! This library pairs the tumor samples of a sequencing request with normal samples
//! from the same patient, searching progressively wider scopes when the request itself
//! holds no usable normal, and assembles the read-group records needed to build a
//! pipeline job for each pair.
//!
//! ## Overview
//!
//! ### Core Functionality
//!
//! - **[`pairing`]** - The pairing engine and its output
//! - **[`resolver`]** - The tiered normal resolution chain
//! - **[`assembler`]** - Read-group assembly from repository file entries
//! - **[`repository`]** - The metadata query contract, an in-memory store and a fixture loader
//!
//! ### Data Types
//!
//! - **[`sample`]** - Sample records supplied to the engine
//! - **[`read_group`]** - The lane-aligned read-group payload
//! - **[`request`]** - Building a request's sample set from the repository
//!
//! ### Utilities
//!
//! - **[`errors`]** - Structured error types
//! - **[`validation`]** - Input validation helpers
//! - **[`logging`]** - Formatted logging and timing
//! - **[`json_io`]** - JSON reading and writing
//!
//! ## Quick Start
//!
//! ```no_run
//! use tnpair_lib::pairing::PairingEngine;
//! use tnpair_lib::repository::load_fixtures;
//! use tnpair_lib::sample::{SampleRecord, TumorType};
//!
//! # fn main() -> anyhow::Result<()> {
//! let repository = load_fixtures(&["fixtures/10075_D.json"])?;
//! let samples = vec![
//!     SampleRecord::new("C-DRKHP7", "IMPACT468_BAITS", TumorType::Tumor)
//!         .with_igo_id("10075_D_1")
//!         .with_request_id("10075_D"),
//! ];
//! let result = PairingEngine::new(&repository).pair(&samples)?;
//! for (tumor, normal) in result.pairs() {
//!     println!("{} -> {:?}", tumor.display_id(), normal.and_then(|n| n.igo_id()));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The engine performs no I/O of its own; the repository is passed in by the caller.

pub mod assembler;
pub mod errors;
pub mod json_io;
pub mod logging;
pub mod pairing;
pub mod read_group;
pub mod repository;
pub mod request;
pub mod resolver;
pub mod sample;
pub mod validation;

pub use assembler::ReadGroupAssembler;
pub use errors::{PairingError, Result};
pub use pairing::{MissingNormalPolicy, NormalSample, PairingEngine, PairingResult};
pub use read_group::{ReadGroupDefaults, ReadGroupPayload};
pub use repository::{InMemoryRepository, MetadataRepository, SampleFilter};
pub use resolver::{NormalQuery, NormalResolutionChain, Resolution, ResolutionOptions};
pub use sample::{SampleRecord, TumorType};
pub use tnpair_metrics::NormalSource;
