//! Error type for the pedigree core.

use thiserror::Error;

/// Errors raised by the pedigree reconstruction core.
///
/// Per-row validity failures (§7 category 2) are not represented here: those
/// are silently dropped by the producing stage and folded into its returned
/// count summary rather than propagated as errors.
#[derive(Error, Debug)]
pub enum PedigreeError {
    /// A reference file (relationships lookup/opposites) could not be parsed.
    #[error("malformed reference table: {0}")]
    ReferenceTable(String),

    /// A relationship group name did not resolve to either vocabulary.
    #[error("unknown relationship group: {0}")]
    UnknownGroup(String),
}

pub type Result<T> = std::result::Result<T, PedigreeError>;
