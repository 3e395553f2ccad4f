//! Dask task-runner builder.
//!
//! Contributes the task-runner fragment: worker pool sizing for a Dask
//! cluster the platform spins up alongside the flow.

use serde::{Deserialize, Serialize};

use crate::core::error::DeployError;
use crate::core::handle::DeploymentBuilder;
use crate::core::types::{ConfigFragment, FragmentCategory, OptionMap};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dask {
    /// Number of Dask workers
    pub num_workers: u32,

    /// Threads per worker; the platform default applies when unset
    #[serde(default)]
    pub threads_per_worker: Option<u32>,

    /// Per-worker memory limit in GB
    #[serde(default)]
    pub memory_limit_gb: Option<f64>,
}

impl Dask {
    fn validate(&self) -> Result<(), DeployError> {
        let invalid = |reason: String| DeployError::InvalidConfiguration {
            category: FragmentCategory::TaskRunner,
            reason,
        };

        if self.num_workers == 0 {
            return Err(invalid("num_workers must be at least 1".to_string()));
        }
        if let Some(threads) = self.threads_per_worker {
            if threads == 0 {
                return Err(invalid("threads_per_worker must be at least 1".to_string()));
            }
        }
        if let Some(limit) = self.memory_limit_gb {
            if limit.is_nan() || limit <= 0.0 {
                return Err(invalid(format!(
                    "memory_limit_gb must be positive, got {}",
                    limit
                )));
            }
        }
        Ok(())
    }
}

impl DeploymentBuilder for Dask {
    fn category(&self) -> FragmentCategory {
        FragmentCategory::TaskRunner
    }

    fn fragment(&self) -> Result<ConfigFragment, DeployError> {
        self.validate()?;

        let mut options = OptionMap::new();
        options.insert("runner".to_string(), "dask".into());
        options.insert("num_workers".to_string(), self.num_workers.into());
        if let Some(threads) = self.threads_per_worker {
            options.insert("threads_per_worker".to_string(), threads.into());
        }
        if let Some(limit) = self.memory_limit_gb {
            options.insert("memory_limit_gb".to_string(), limit.into());
        }
        Ok(ConfigFragment::new(FragmentCategory::TaskRunner, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dask_fragment_fields() {
        let dask = Dask {
            num_workers: 5,
            threads_per_worker: None,
            memory_limit_gb: None,
        };
        let fragment = dask.fragment().unwrap();
        assert_eq!(fragment.category(), FragmentCategory::TaskRunner);
        assert_eq!(fragment.get("runner"), Some(&"dask".into()));
        assert_eq!(fragment.get("num_workers"), Some(&5u32.into()));
        assert!(fragment.get("threads_per_worker").is_none());
    }

    #[test]
    fn test_dask_zero_workers_rejected() {
        let dask = Dask {
            num_workers: 0,
            threads_per_worker: None,
            memory_limit_gb: None,
        };
        let err = dask.fragment().unwrap_err();
        assert!(matches!(
            err,
            DeployError::InvalidConfiguration {
                category: FragmentCategory::TaskRunner,
                ..
            }
        ));
    }

    #[test]
    fn test_dask_zero_threads_rejected() {
        let dask = Dask {
            num_workers: 2,
            threads_per_worker: Some(0),
            memory_limit_gb: None,
        };
        assert!(dask.fragment().is_err());
    }

    #[test]
    fn test_dask_negative_memory_limit_rejected() {
        let dask = Dask {
            num_workers: 2,
            threads_per_worker: None,
            memory_limit_gb: Some(-0.5),
        };
        assert!(dask.fragment().is_err());
    }

    #[test]
    fn test_dask_deserialize_negative_workers_rejected() {
        // num_workers is unsigned; a negative manifest value fails decode
        let result: Result<Dask, _> = serde_yaml_ng::from_str("{num_workers: -5}");
        assert!(result.is_err());
    }

    #[test]
    fn test_dask_full_options() {
        let dask = Dask {
            num_workers: 4,
            threads_per_worker: Some(2),
            memory_limit_gb: Some(8.0),
        };
        let fragment = dask.fragment().unwrap();
        assert_eq!(fragment.get("threads_per_worker"), Some(&2u32.into()));
        assert_eq!(fragment.get("memory_limit_gb"), Some(&8.0.into()));
    }
}
