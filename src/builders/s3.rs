//! S3 flow-storage builder.
//!
//! Contributes the storage fragment: where the platform uploads and later
//! retrieves the flow's code. The base path is derived from bucket and
//! path at fragment time.

use serde::{Deserialize, Serialize};

use crate::core::error::DeployError;
use crate::core::handle::DeploymentBuilder;
use crate::core::types::{ConfigFragment, FragmentCategory, OptionMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3 {
    /// Bare bucket name (no scheme)
    pub bucket: String,

    /// Key prefix within the bucket
    pub path: String,
}

impl S3 {
    /// Full object-store path: `s3://{bucket}/{path}`.
    pub fn basepath(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.path.trim_start_matches('/'))
    }

    fn validate(&self) -> Result<(), DeployError> {
        let invalid = |reason: String| DeployError::InvalidConfiguration {
            category: FragmentCategory::Storage,
            reason,
        };

        if self.bucket.is_empty() {
            return Err(invalid("bucket must not be empty".to_string()));
        }
        if self.bucket.contains("://") || self.bucket.contains('/') {
            return Err(invalid(format!(
                "bucket must be a bare bucket name, got '{}'",
                self.bucket
            )));
        }
        if self.path.is_empty() {
            return Err(invalid("path must not be empty".to_string()));
        }
        Ok(())
    }
}

impl DeploymentBuilder for S3 {
    fn category(&self) -> FragmentCategory {
        FragmentCategory::Storage
    }

    fn fragment(&self) -> Result<ConfigFragment, DeployError> {
        self.validate()?;

        let mut options = OptionMap::new();
        options.insert("bucket".to_string(), self.bucket.as_str().into());
        options.insert("path".to_string(), self.path.as_str().into());
        options.insert("basepath".to_string(), self.basepath().into());
        Ok(ConfigFragment::new(FragmentCategory::Storage, options))
    }
}
