//! CLI command implementations for tnpair.
//!
//! Each submodule implements one subcommand.
//!
//! ## Pairing
//! - [`pair`] - Pair the tumors of a sample set or request with normals
//! - [`resolve`] - Resolve the normal for a single tumor
//!
//! ## Utilities
//! - [`assemble`] - Assemble read-group payloads for a request

#![allow(
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::uninlined_format_args
)]

pub mod assemble;
pub mod command;
pub mod common;
pub mod pair;
pub mod resolve;
