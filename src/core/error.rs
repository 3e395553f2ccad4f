//! Error taxonomy for annotation attachment, composition, and apply.
//!
//! All errors are raised synchronously at the point of detection and
//! propagate unmodified; the core performs no recovery or suppression.

use crate::core::types::FragmentCategory;
use crate::platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    /// A single annotation's parameters are malformed or missing.
    /// Raised at attach time, local to that annotation.
    #[error("invalid {category} configuration: {reason}")]
    InvalidConfiguration {
        category: FragmentCategory,
        reason: String,
    },

    /// Composition could not resolve a required field after merge and
    /// inference. Raised at build time.
    #[error("missing required field '{field}' in {category} configuration")]
    MissingRequiredField {
        category: FragmentCategory,
        field: String,
    },

    /// Two fragments supplied differing values for a field declared
    /// non-mergeable. Raised at build time.
    #[error("conflicting values for non-mergeable field '{field}' in {category} configuration")]
    Conflict {
        category: FragmentCategory,
        field: String,
    },

    /// A flow manifest could not be loaded or refers to unknown kinds.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// A built specification could not be encoded for display or submission.
    #[error("specification encode error: {0}")]
    Encode(String),

    /// The orchestration platform call failed; carries the underlying cause.
    #[error("deployment apply failed: {0}")]
    Apply(#[from] PlatformError),
}
