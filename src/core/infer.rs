//! Metadata inference — derive specification defaults from the flow's own
//! declared properties.
//!
//! Explicit overrides from the metadata annotation always win. The
//! deployment name defaults to the flow's declared name, the description to
//! its doc string (else empty). Environment has no inference fallback; it
//! is explicit-only and enforced by the compose rules.

use crate::core::types::{value_to_string, Flow, OptionMap};

/// Metadata fields after overrides and inference have been reconciled.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMetadata {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub environment: Option<String>,
    pub flow_run_name: Option<String>,
    pub tags: Vec<String>,
}

/// Reconcile explicit metadata overrides with flow-derived defaults.
pub fn resolve_metadata(flow: &Flow, overrides: &OptionMap) -> ResolvedMetadata {
    let name = string_field(overrides, "name").unwrap_or_else(|| flow.name().to_string());
    let description = string_field(overrides, "description")
        .or_else(|| flow.doc().map(str::to_string))
        .unwrap_or_default();
    let version = string_field(overrides, "version");
    let environment = string_field(overrides, "environment");
    let flow_run_name = string_field(overrides, "flow_run_name");

    let tags = match overrides.get("tags") {
        Some(serde_yaml_ng::Value::Sequence(seq)) => seq.iter().map(value_to_string).collect(),
        _ => build_tags(&name, version.as_deref()),
    };

    ResolvedMetadata {
        name,
        description,
        version,
        environment,
        flow_run_name,
        tags,
    }
}

/// Default tag set: the deployment name, plus the version when declared.
pub fn build_tags(name: &str, version: Option<&str>) -> Vec<String> {
    let mut tags = vec![name.to_string()];
    if let Some(version) = version {
        tags.push(version.to_string());
    }
    tags
}

fn string_field(overrides: &OptionMap, field: &str) -> Option<String> {
    overrides
        .get(field)
        .map(value_to_string)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> OptionMap {
        let mut map = OptionMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), (*v).into());
        }
        map
    }

    #[test]
    fn test_infer_name_defaults_to_flow_name() {
        let flow = Flow::new("simple_flow", "demo::simple_flow");
        let resolved = resolve_metadata(&flow, &OptionMap::new());
        assert_eq!(resolved.name, "simple_flow");
    }

    #[test]
    fn test_infer_explicit_name_wins() {
        let flow = Flow::new("simple_flow", "demo::simple_flow");
        let resolved = resolve_metadata(&flow, &overrides(&[("name", "renamed")]));
        assert_eq!(resolved.name, "renamed");
    }

    #[test]
    fn test_infer_description_falls_back_to_doc() {
        let flow = Flow::new("f", "m::f").with_doc("Add two numbers.");
        let resolved = resolve_metadata(&flow, &OptionMap::new());
        assert_eq!(resolved.description, "Add two numbers.");
    }

    #[test]
    fn test_infer_description_empty_without_doc() {
        let flow = Flow::new("f", "m::f");
        let resolved = resolve_metadata(&flow, &OptionMap::new());
        assert_eq!(resolved.description, "");
    }

    #[test]
    fn test_infer_explicit_description_wins_over_doc() {
        let flow = Flow::new("f", "m::f").with_doc("Doc string.");
        let resolved = resolve_metadata(&flow, &overrides(&[("description", "Override.")]));
        assert_eq!(resolved.description, "Override.");
    }

    #[test]
    fn test_infer_environment_has_no_fallback() {
        let flow = Flow::new("f", "m::f");
        let resolved = resolve_metadata(&flow, &OptionMap::new());
        assert!(resolved.environment.is_none());

        let resolved = resolve_metadata(&flow, &overrides(&[("environment", "dev")]));
        assert_eq!(resolved.environment.as_deref(), Some("dev"));
    }

    #[test]
    fn test_infer_tags_built_from_name_and_version() {
        let flow = Flow::new("f", "m::f");
        let resolved = resolve_metadata(&flow, &OptionMap::new());
        assert_eq!(resolved.tags, vec!["f"]);

        let resolved = resolve_metadata(&flow, &overrides(&[("version", "2.1.0")]));
        assert_eq!(resolved.tags, vec!["f", "2.1.0"]);
    }

    #[test]
    fn test_infer_explicit_tags_win() {
        let flow = Flow::new("f", "m::f");
        let mut map = overrides(&[("version", "2.1.0")]);
        map.insert(
            "tags".to_string(),
            serde_yaml_ng::Value::Sequence(vec!["nightly".into(), "gpu".into()]),
        );
        let resolved = resolve_metadata(&flow, &map);
        assert_eq!(resolved.tags, vec!["nightly", "gpu"]);
    }

    #[test]
    fn test_infer_build_tags() {
        assert_eq!(build_tags("f", None), vec!["f"]);
        assert_eq!(build_tags("f", Some("1.0")), vec!["f", "1.0"]);
    }
}
