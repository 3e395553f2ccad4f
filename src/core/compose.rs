//! Composition engine — merge the ordered fragment list on a flow handle
//! into one deployment specification.
//!
//! Fragments are grouped by category. Within a category, later-applied
//! (outer) fragments override earlier field values field-by-field; a field
//! set only by an earlier fragment survives unchanged. Categories land in
//! disjoint sections, so no cross-category override occurs. Composition is
//! a pure function of the fragment list: same input, bit-identical output.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::core::error::DeployError;
use crate::core::handle::FlowHandle;
use crate::core::infer;
use crate::core::types::{DeploymentSpec, FragmentCategory, OptionMap};

/// Explicit merge-strategy registry, constructed by the caller.
///
/// Declares which fields are strictly non-mergeable (differing values
/// conflict instead of the outer one winning) and which must be resolvable
/// after merge and inference.
#[derive(Debug, Clone)]
pub struct ComposeRules {
    strict: BTreeSet<(FragmentCategory, String)>,
    required: BTreeSet<(FragmentCategory, String)>,
}

impl Default for ComposeRules {
    /// Platform defaults: outer wins everywhere, `metadata.environment`
    /// must be set.
    fn default() -> Self {
        Self::empty().require(FragmentCategory::Metadata, "environment")
    }
}

impl ComposeRules {
    /// Rules with no strict fields and no required fields.
    pub fn empty() -> Self {
        Self {
            strict: BTreeSet::new(),
            required: BTreeSet::new(),
        }
    }

    /// Declare a field non-mergeable: same-category fragments that disagree
    /// on it fail composition with a conflict instead of silently
    /// overriding.
    pub fn strict(mut self, category: FragmentCategory, field: impl Into<String>) -> Self {
        self.strict.insert((category, field.into()));
        self
    }

    /// Declare a field that must be set once merge and inference finish.
    pub fn require(mut self, category: FragmentCategory, field: impl Into<String>) -> Self {
        self.required.insert((category, field.into()));
        self
    }

    fn is_strict(&self, category: FragmentCategory, field: &str) -> bool {
        self.strict.contains(&(category, field.to_string()))
    }

    fn required_fields(&self) -> impl Iterator<Item = &(FragmentCategory, String)> {
        self.required.iter()
    }
}

/// Merge the handle's fragments into a deployment specification.
pub fn compose(handle: &FlowHandle, rules: &ComposeRules) -> Result<DeploymentSpec, DeployError> {
    let mut sections: IndexMap<FragmentCategory, OptionMap> = IndexMap::new();

    for fragment in handle.fragments() {
        let category = fragment.category();
        let section = sections.entry(category).or_default();
        for (field, value) in fragment.options() {
            if rules.is_strict(category, field) {
                if let Some(existing) = section.get(field) {
                    if existing != value {
                        return Err(DeployError::Conflict {
                            category,
                            field: field.clone(),
                        });
                    }
                }
            }
            // Replaces the value but keeps the field's original position,
            // so merge output order is stable across runs.
            section.insert(field.clone(), value.clone());
        }
    }

    let metadata = sections
        .swap_remove(&FragmentCategory::Metadata)
        .unwrap_or_default();
    let resolved = infer::resolve_metadata(handle.flow(), &metadata);

    let mut infrastructure = sections
        .swap_remove(&FragmentCategory::Infrastructure)
        .unwrap_or_default();
    // An infrastructure block without an explicit namespace lands in a
    // namespace named after the deployment.
    if !infrastructure.is_empty() && !infrastructure.contains_key("namespace") {
        infrastructure.insert(
            "namespace".to_string(),
            serde_yaml_ng::Value::from(resolved.name.clone()),
        );
    }

    let task_runner = sections
        .swap_remove(&FragmentCategory::TaskRunner)
        .unwrap_or_default();
    let storage = sections
        .swap_remove(&FragmentCategory::Storage)
        .unwrap_or_default();

    for (category, field) in rules.required_fields() {
        let satisfied = match category {
            FragmentCategory::Metadata => match field.as_str() {
                "name" => !resolved.name.is_empty(),
                "description" => !resolved.description.is_empty(),
                "version" => resolved.version.is_some(),
                "environment" => resolved.environment.is_some(),
                "flow_run_name" => resolved.flow_run_name.is_some(),
                "tags" => !resolved.tags.is_empty(),
                other => metadata.contains_key(other),
            },
            FragmentCategory::Infrastructure => infrastructure.contains_key(field),
            FragmentCategory::TaskRunner => task_runner.contains_key(field),
            FragmentCategory::Storage => storage.contains_key(field),
        };
        if !satisfied {
            return Err(DeployError::MissingRequiredField {
                category: *category,
                field: field.clone(),
            });
        }
    }

    Ok(DeploymentSpec {
        name: resolved.name,
        description: resolved.description,
        version: resolved.version,
        environment: resolved.environment,
        tags: resolved.tags,
        entrypoint: handle.flow().entrypoint().to_string(),
        parameters: handle.flow().parameters().to_vec(),
        flow_run_name: resolved.flow_run_name,
        infrastructure,
        task_runner,
        storage,
    })
}
