//! Orchestration platform contract.
//!
//! The core treats the platform as an opaque registration endpoint: a
//! specification goes in, a receipt or an error comes out. Retry and
//! backoff belong to the caller, not here.

pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::DeploymentSpec;

/// Failure surfaced by the orchestration platform call.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform refused the deployment.
    #[error("platform rejected deployment ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The request never completed.
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The platform answered, but not with a parseable receipt.
    #[error("platform response malformed: {0}")]
    Malformed(String),
}

/// Receipt returned by the platform for a registered deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyReceipt {
    /// Platform-assigned deployment id
    pub deployment_id: String,

    /// Link to the deployment in the platform UI, when provided
    #[serde(default)]
    pub url: Option<String>,
}

/// Registration mechanism of the external orchestration platform.
pub trait Orchestrator {
    fn register(&self, spec: &DeploymentSpec) -> Result<ApplyReceipt, PlatformError>;
}
