//! Kubernetes infrastructure builder.
//!
//! Contributes the infrastructure fragment: container image, namespace,
//! cpu/memory allocation, and job lifecycle timeouts. Namespace is
//! optional; composition fills it with the deployment name when absent.

use serde::{Deserialize, Serialize};

use crate::core::error::DeployError;
use crate::core::handle::DeploymentBuilder;
use crate::core::types::{ConfigFragment, FragmentCategory, OptionMap};

const MAX_CPU: f64 = 64.0;
const MAX_MEMORY_GB: f64 = 256.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Kubernetes {
    /// Container image used to run the flow
    #[serde(default = "default_image")]
    pub image: String,

    /// Kubernetes namespace to deploy into. When unset, the composed
    /// deployment name is used.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Virtual CPU cores to allocate
    pub cpu: f64,

    /// Memory to allocate in GB
    pub memory_gb: f64,

    /// Seconds to watch a job before giving up
    #[serde(default = "default_job_watch_timeout")]
    pub job_watch_timeout_seconds: u64,

    /// Seconds a finished job is retained before cleanup
    #[serde(default = "default_finished_job_ttl")]
    pub finished_job_ttl_seconds: u64,
}

fn default_image() -> String {
    "lanzar/flow-runner:latest".to_string()
}

fn default_job_watch_timeout() -> u64 {
    10 * 60
}

fn default_finished_job_ttl() -> u64 {
    10 * 60
}

impl Kubernetes {
    fn validate(&self) -> Result<(), DeployError> {
        let invalid = |reason: String| DeployError::InvalidConfiguration {
            category: FragmentCategory::Infrastructure,
            reason,
        };

        if self.cpu.is_nan() || self.cpu <= 0.0 {
            return Err(invalid(format!("cpu must be positive, got {}", self.cpu)));
        }
        if self.cpu > MAX_CPU {
            return Err(invalid(format!("cpu must be at most {}, got {}", MAX_CPU, self.cpu)));
        }
        if self.memory_gb.is_nan() || self.memory_gb <= 0.0 {
            return Err(invalid(format!(
                "memory_gb must be positive, got {}",
                self.memory_gb
            )));
        }
        if self.memory_gb > MAX_MEMORY_GB {
            return Err(invalid(format!(
                "memory_gb must be at most {}, got {}",
                MAX_MEMORY_GB, self.memory_gb
            )));
        }
        if self.image.is_empty() {
            return Err(invalid("image must not be empty".to_string()));
        }
        if let Some(namespace) = &self.namespace {
            if namespace.is_empty() {
                return Err(invalid("namespace must not be empty when set".to_string()));
            }
        }
        Ok(())
    }
}

impl DeploymentBuilder for Kubernetes {
    fn category(&self) -> FragmentCategory {
        FragmentCategory::Infrastructure
    }

    fn fragment(&self) -> Result<ConfigFragment, DeployError> {
        self.validate()?;

        let mut options = OptionMap::new();
        options.insert("image".to_string(), self.image.as_str().into());
        if let Some(namespace) = &self.namespace {
            options.insert("namespace".to_string(), namespace.as_str().into());
        }
        options.insert("cpu".to_string(), self.cpu.into());
        options.insert("memory_gb".to_string(), self.memory_gb.into());
        options.insert(
            "job_watch_timeout_seconds".to_string(),
            self.job_watch_timeout_seconds.into(),
        );
        options.insert(
            "finished_job_ttl_seconds".to_string(),
            self.finished_job_ttl_seconds.into(),
        );
        Ok(ConfigFragment::new(FragmentCategory::Infrastructure, options))
    }
}
