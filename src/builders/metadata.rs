//! Flow metadata builder.
//!
//! Contributes explicit metadata overrides. Anything left unset here is
//! inferred from the flow's own declared properties at composition time;
//! environment has no inference fallback and must be set somewhere when
//! the compose rules require it.

use serde::{Deserialize, Serialize};

use crate::core::error::DeployError;
use crate::core::handle::DeploymentBuilder;
use crate::core::types::{ConfigFragment, FragmentCategory, OptionMap};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowMetadata {
    /// Deployment name override
    #[serde(default)]
    pub name: Option<String>,

    /// Deployment version
    #[serde(default)]
    pub version: Option<String>,

    /// Target environment (dev, staging, prod, ...)
    #[serde(default)]
    pub environment: Option<String>,

    /// Description override
    #[serde(default)]
    pub description: Option<String>,

    /// Template for naming individual flow runs
    #[serde(default)]
    pub flow_run_name: Option<String>,

    /// Explicit tag set; defaults to name + version when unset
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl FlowMetadata {
    fn validate(&self) -> Result<(), DeployError> {
        let invalid = |reason: String| DeployError::InvalidConfiguration {
            category: FragmentCategory::Metadata,
            reason,
        };

        for (field, value) in [
            ("name", &self.name),
            ("version", &self.version),
            ("environment", &self.environment),
        ] {
            if let Some(value) = value {
                if value.is_empty() {
                    return Err(invalid(format!("{} must not be empty when set", field)));
                }
            }
        }
        Ok(())
    }
}

impl DeploymentBuilder for FlowMetadata {
    fn category(&self) -> FragmentCategory {
        FragmentCategory::Metadata
    }

    fn fragment(&self) -> Result<ConfigFragment, DeployError> {
        self.validate()?;

        let mut options = OptionMap::new();
        if let Some(name) = &self.name {
            options.insert("name".to_string(), name.as_str().into());
        }
        if let Some(version) = &self.version {
            options.insert("version".to_string(), version.as_str().into());
        }
        if let Some(environment) = &self.environment {
            options.insert("environment".to_string(), environment.as_str().into());
        }
        if let Some(description) = &self.description {
            options.insert("description".to_string(), description.as_str().into());
        }
        if let Some(flow_run_name) = &self.flow_run_name {
            options.insert("flow_run_name".to_string(), flow_run_name.as_str().into());
        }
        if let Some(tags) = &self.tags {
            options.insert(
                "tags".to_string(),
                serde_yaml_ng::Value::Sequence(
                    tags.iter().map(|t| t.as_str().into()).collect(),
                ),
            );
        }
        Ok(ConfigFragment::new(FragmentCategory::Metadata, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_only_set_fields_contribute() {
        let metadata = FlowMetadata {
            environment: Some("dev".to_string()),
            ..FlowMetadata::default()
        };
        let fragment = metadata.fragment().unwrap();
        assert_eq!(fragment.category(), FragmentCategory::Metadata);
        assert_eq!(fragment.get("environment"), Some(&"dev".into()));
        assert!(fragment.get("name").is_none());
        assert!(fragment.get("version").is_none());
        assert!(fragment.get("tags").is_none());
    }

    #[test]
    fn test_metadata_empty_builder_contributes_nothing() {
        let fragment = FlowMetadata::default().fragment().unwrap();
        assert!(fragment.options().is_empty());
    }

    #[test]
    fn test_metadata_empty_environment_rejected() {
        let metadata = FlowMetadata {
            environment: Some(String::new()),
            ..FlowMetadata::default()
        };
        let err = metadata.fragment().unwrap_err();
        assert!(matches!(
            err,
            DeployError::InvalidConfiguration {
                category: FragmentCategory::Metadata,
                ..
            }
        ));
    }

    #[test]
    fn test_metadata_tags_sequence() {
        let metadata = FlowMetadata {
            tags: Some(vec!["nightly".to_string(), "gpu".to_string()]),
            ..FlowMetadata::default()
        };
        let fragment = metadata.fragment().unwrap();
        assert_eq!(
            fragment.get("tags"),
            Some(&serde_yaml_ng::Value::Sequence(vec![
                "nightly".into(),
                "gpu".into()
            ]))
        );
    }

    #[test]
    fn test_metadata_deserialize_all_optional() {
        let metadata: FlowMetadata = serde_yaml_ng::from_str("{}").unwrap();
        assert!(metadata.name.is_none());
        assert!(metadata.environment.is_none());
    }
}
