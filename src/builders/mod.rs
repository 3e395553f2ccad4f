//! Concrete deployment builders — one per fragment category.
//!
//! Thin collaborators over the composition core: each constructs a
//! validated fragment from its own parameters. Manifest annotations are
//! decoded into these builders by kind.

pub mod dask;
pub mod kubernetes;
pub mod metadata;
pub mod s3;

pub use dask::Dask;
pub use kubernetes::Kubernetes;
pub use metadata::FlowMetadata;
pub use s3::S3;

use serde::de::DeserializeOwned;

use crate::core::error::DeployError;
use crate::core::handle::DeploymentBuilder;
use crate::core::types::FragmentCategory;

/// Annotation kinds the manifest surface understands.
pub const KNOWN_KINDS: &[&str] = &["kubernetes", "dask", "s3", "metadata"];

/// Decode a manifest annotation into its builder.
pub fn from_decl(
    kind: &str,
    options: &serde_yaml_ng::Value,
) -> Result<Box<dyn DeploymentBuilder>, DeployError> {
    match kind {
        "kubernetes" => decode::<Kubernetes>(FragmentCategory::Infrastructure, options)
            .map(|b| Box::new(b) as Box<dyn DeploymentBuilder>),
        "dask" => decode::<Dask>(FragmentCategory::TaskRunner, options)
            .map(|b| Box::new(b) as Box<dyn DeploymentBuilder>),
        "s3" => decode::<S3>(FragmentCategory::Storage, options)
            .map(|b| Box::new(b) as Box<dyn DeploymentBuilder>),
        "metadata" => decode::<FlowMetadata>(FragmentCategory::Metadata, options)
            .map(|b| Box::new(b) as Box<dyn DeploymentBuilder>),
        other => Err(DeployError::Manifest(format!(
            "unknown annotation kind '{}'",
            other
        ))),
    }
}

fn decode<T: DeserializeOwned>(
    category: FragmentCategory,
    options: &serde_yaml_ng::Value,
) -> Result<T, DeployError> {
    serde_yaml_ng::from_value(options.clone()).map_err(|e| DeployError::InvalidConfiguration {
        category,
        reason: e.to_string(),
    })
}
