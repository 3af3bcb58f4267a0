//! Core domain errors.

use thiserror::Error;

/// Validation errors for task requests.
///
/// These are raised before any network call and are meant to be surfaced
/// as field-level messages next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The repository URL is not an absolute http/https URL.
    #[error("please enter a valid GitHub URL")]
    InvalidRepoUrl,

    /// The natural-language instruction is empty.
    #[error("please enter a feature description")]
    EmptyInstruction,

    /// The bench instance id is empty.
    #[error("please select a bench task")]
    EmptyBenchId,
}
