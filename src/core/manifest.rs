//! Flow manifest parsing and validation.
//!
//! The CLI surface works from a `flow.yaml` manifest: a flow declaration
//! plus an ordered annotation list. Listed order is application order, so
//! the last listed annotation is the outermost and wins same-category
//! field overrides. Structural constraints checked here:
//! - Version must be "1.0"
//! - Flow name and entrypoint must be present and well-formed
//! - Annotation kinds must be known

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builders;
use crate::core::error::DeployError;
use crate::core::handle::FlowHandle;
use crate::core::types::Flow;

/// Top-level flow.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowManifest {
    /// Schema version (must be "1.0")
    pub version: String,

    /// The flow being deployed
    pub flow: FlowDecl,

    /// Annotations in application order (last = outermost)
    #[serde(default)]
    pub annotations: Vec<AnnotationDecl>,
}

/// Declared flow properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowDecl {
    /// Flow name
    pub name: String,

    /// Module-qualified flow reference
    pub entrypoint: String,

    /// Documentation string
    #[serde(default)]
    pub description: Option<String>,

    /// Declared parameter names
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// One annotation: a builder kind plus its options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationDecl {
    /// Builder kind (kubernetes, dask, s3, metadata)
    pub kind: String,

    /// Kind-specific options
    #[serde(default = "empty_options")]
    pub options: serde_yaml_ng::Value,
}

fn empty_options() -> serde_yaml_ng::Value {
    serde_yaml_ng::Value::Mapping(serde_yaml_ng::Mapping::new())
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a flow.yaml file from disk.
pub fn parse_manifest_file(path: &Path) -> Result<FlowManifest, DeployError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DeployError::Manifest(format!("failed to read {}: {}", path.display(), e)))?;
    parse_manifest(&content)
}

/// Parse a flow.yaml from a string.
pub fn parse_manifest(yaml: &str) -> Result<FlowManifest, DeployError> {
    serde_yaml_ng::from_str(yaml)
        .map_err(|e| DeployError::Manifest(format!("YAML parse error: {}", e)))
}

/// Validate a parsed manifest. Returns a list of errors (empty = valid).
pub fn validate_manifest(manifest: &FlowManifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if manifest.version != "1.0" {
        errors.push(ValidationError {
            message: format!("version must be \"1.0\", got \"{}\"", manifest.version),
        });
    }

    if manifest.flow.name.is_empty() {
        errors.push(ValidationError {
            message: "flow name must not be empty".to_string(),
        });
    }

    if manifest.flow.entrypoint.is_empty() {
        errors.push(ValidationError {
            message: "flow entrypoint must not be empty".to_string(),
        });
    } else if manifest.flow.entrypoint.chars().any(char::is_whitespace) {
        errors.push(ValidationError {
            message: format!(
                "flow entrypoint '{}' must be a module-qualified reference",
                manifest.flow.entrypoint
            ),
        });
    }

    for (index, annotation) in manifest.annotations.iter().enumerate() {
        if !builders::KNOWN_KINDS.contains(&annotation.kind.as_str()) {
            errors.push(ValidationError {
                message: format!(
                    "annotation {} has unknown kind '{}' (known: {})",
                    index,
                    annotation.kind,
                    builders::KNOWN_KINDS.join(", ")
                ),
            });
        }
    }

    errors
}

/// Build a flow handle by applying the manifest's annotations in listed
/// order. Builder parameter validation happens here, at attach time.
pub fn into_handle(manifest: &FlowManifest) -> Result<FlowHandle, DeployError> {
    let mut flow = Flow::new(&manifest.flow.name, &manifest.flow.entrypoint);
    if let Some(description) = &manifest.flow.description {
        flow = flow.with_doc(description);
    }
    flow = flow.with_parameters(manifest.flow.parameters.iter().cloned());

    let mut handle = FlowHandle::new(flow);
    for annotation in &manifest.annotations {
        let builder = builders::from_decl(&annotation.kind, &annotation.options)?;
        handle = builder.attach(handle)?;
    }
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FragmentCategory;

    const MANIFEST: &str = r#"
version: "1.0"
flow:
  name: simple_flow
  entrypoint: demo::flows::simple_flow
  description: "Add two numbers."
  parameters: [x, y]
annotations:
  - kind: s3
    options:
      bucket: my-bucket
      path: my-path
  - kind: dask
    options:
      num_workers: 5
  - kind: metadata
    options:
      environment: dev
  - kind: kubernetes
    options:
      cpu: 0.8
      memory_gb: 1.5
      image: my-image
"#;

    #[test]
    fn test_manifest_parse() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        assert_eq!(manifest.version, "1.0");
        assert_eq!(manifest.flow.name, "simple_flow");
        assert_eq!(manifest.flow.parameters, vec!["x", "y"]);
        assert_eq!(manifest.annotations.len(), 4);
        assert_eq!(manifest.annotations[0].kind, "s3");
    }

    #[test]
    fn test_manifest_validate_ok() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        assert!(validate_manifest(&manifest).is_empty());
    }

    #[test]
    fn test_manifest_validate_bad_version() {
        let mut manifest = parse_manifest(MANIFEST).unwrap();
        manifest.version = "2.0".to_string();
        let errors = validate_manifest(&manifest);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("version"));
    }

    #[test]
    fn test_manifest_validate_unknown_kind() {
        let mut manifest = parse_manifest(MANIFEST).unwrap();
        manifest.annotations[1].kind = "spark".to_string();
        let errors = validate_manifest(&manifest);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("spark"));
    }

    #[test]
    fn test_manifest_validate_entrypoint_shape() {
        let mut manifest = parse_manifest(MANIFEST).unwrap();
        manifest.flow.entrypoint = "has a space".to_string();
        let errors = validate_manifest(&manifest);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("module-qualified"));
    }

    #[test]
    fn test_manifest_into_handle_applies_in_order() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        let handle = into_handle(&manifest).unwrap();
        assert_eq!(handle.fragments().len(), 4);
        assert_eq!(handle.fragments()[0].category(), FragmentCategory::Storage);
        assert_eq!(
            handle.fragments()[3].category(),
            FragmentCategory::Infrastructure
        );
    }

    #[test]
    fn test_manifest_into_handle_builds_spec() {
        let manifest = parse_manifest(MANIFEST).unwrap();
        let spec = into_handle(&manifest).unwrap().build_deployment().unwrap();
        assert_eq!(spec.name, "simple_flow");
        assert_eq!(spec.description, "Add two numbers.");
        assert_eq!(spec.storage["bucket"], serde_yaml_ng::Value::from("my-bucket"));
        assert_eq!(spec.task_runner["num_workers"], serde_yaml_ng::Value::from(5));
    }

    #[test]
    fn test_manifest_later_annotation_overrides() {
        let yaml = r#"
version: "1.0"
flow:
  name: f
  entrypoint: m::f
annotations:
  - kind: s3
    options: {bucket: inner, path: p}
  - kind: s3
    options: {bucket: outer, path: p}
  - kind: metadata
    options: {environment: dev}
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let spec = into_handle(&manifest).unwrap().build_deployment().unwrap();
        assert_eq!(spec.storage["bucket"], serde_yaml_ng::Value::from("outer"));
    }

    #[test]
    fn test_manifest_malformed_options_fail_attach() {
        let yaml = r#"
version: "1.0"
flow:
  name: f
  entrypoint: m::f
annotations:
  - kind: kubernetes
    options:
      cpu: -1
      memory_gb: 1.0
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let err = into_handle(&manifest).unwrap_err();
        assert!(matches!(err, DeployError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_manifest_unknown_kind_fails_into_handle() {
        let yaml = r#"
version: "1.0"
flow:
  name: f
  entrypoint: m::f
annotations:
  - kind: spark
    options: {}
"#;
        let manifest = parse_manifest(yaml).unwrap();
        let err = into_handle(&manifest).unwrap_err();
        assert!(matches!(err, DeployError::Manifest(_)));
    }

    #[test]
    fn test_manifest_parse_file_missing() {
        let err = parse_manifest_file(Path::new("/nonexistent/flow.yaml")).unwrap_err();
        assert!(matches!(err, DeployError::Manifest(_)));
    }
}
