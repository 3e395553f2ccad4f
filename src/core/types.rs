//! Core types: flows, configuration fragments, and the resolved
//! deployment specification.
//!
//! A `Flow` is a descriptor for a user-defined unit of work; annotations
//! contribute `ConfigFragment`s, and composition resolves them into one
//! `DeploymentSpec` ready for submission.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::DeployError;
use crate::core::fingerprint;
use crate::platform::{ApplyReceipt, Orchestrator};

/// Ordered option name → value mapping carried by fragments and sections.
pub type OptionMap = IndexMap<String, serde_yaml_ng::Value>;

// ============================================================================
// Flow
// ============================================================================

/// A user-defined unit of work intended for deployment.
///
/// The core reads the flow's declared name, doc string, and parameter list
/// for inference; it never invokes the flow itself. The module-qualified
/// entrypoint travels in the built specification so the orchestration
/// platform can load the flow at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    name: String,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    parameters: Vec<String>,
    entrypoint: String,
}

impl Flow {
    /// Create a flow descriptor from its declared name and entrypoint.
    pub fn new(name: impl Into<String>, entrypoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            parameters: Vec::new(),
            entrypoint: entrypoint.into(),
        }
    }

    /// Attach the flow's documentation string.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Declare the flow's parameter names.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn entrypoint(&self) -> &str {
        &self.entrypoint
    }
}

// ============================================================================
// Fragments
// ============================================================================

/// Category of configuration a fragment contributes.
///
/// Categories are orthogonal: each lands in its own section of the built
/// specification and no cross-category override occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentCategory {
    Infrastructure,
    TaskRunner,
    Storage,
    Metadata,
}

impl fmt::Display for FragmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::TaskRunner => write!(f, "task_runner"),
            Self::Storage => write!(f, "storage"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

/// One annotation's contribution: a category plus its option values.
///
/// Constructed once by a builder and never mutated afterwards; ownership
/// passes to the flow handle that receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFragment {
    category: FragmentCategory,
    options: OptionMap,
}

impl ConfigFragment {
    pub fn new(category: FragmentCategory, options: OptionMap) -> Self {
        Self { category, options }
    }

    pub fn category(&self) -> FragmentCategory {
        self.category
    }

    pub fn options(&self) -> &OptionMap {
        &self.options
    }

    pub fn get(&self, field: &str) -> Option<&serde_yaml_ng::Value> {
        self.options.get(field)
    }
}

// ============================================================================
// Deployment specification
// ============================================================================

/// The fully merged configuration, ready for submission.
///
/// Produced once per composition; a pure function of the ordered fragment
/// list, so re-building without re-attaching fragments yields an equal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Module-qualified flow reference the platform loads at run time.
    pub entrypoint: String,

    #[serde(default)]
    pub parameters: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_run_name: Option<String>,

    #[serde(default)]
    pub infrastructure: OptionMap,

    #[serde(default)]
    pub task_runner: OptionMap,

    #[serde(default)]
    pub storage: OptionMap,
}

impl DeploymentSpec {
    /// Render the specification as YAML for display.
    pub fn to_yaml(&self) -> Result<String, DeployError> {
        serde_yaml_ng::to_string(self).map_err(|e| DeployError::Encode(e.to_string()))
    }

    /// JSON payload handed to the orchestration platform.
    pub fn payload(&self) -> Result<serde_json::Value, DeployError> {
        serde_json::to_value(self).map_err(|e| DeployError::Encode(e.to_string()))
    }

    /// Canonical BLAKE3 fingerprint of this specification.
    pub fn fingerprint(&self) -> Result<String, DeployError> {
        fingerprint::spec_fingerprint(self)
    }

    /// Hand the specification to the orchestration platform.
    ///
    /// The single side-effecting operation in the crate. Platform failures
    /// surface unmodified as the apply error's source; no retry here.
    pub fn apply(&self, api: &dyn Orchestrator) -> Result<ApplyReceipt, DeployError> {
        Ok(api.register(self)?)
    }
}

/// Convert a YAML value to a display string.
pub fn value_to_string(val: &serde_yaml_ng::Value) -> String {
    match val {
        serde_yaml_ng::Value::String(s) => s.clone(),
        serde_yaml_ng::Value::Number(n) => n.to_string(),
        serde_yaml_ng::Value::Bool(b) => b.to_string(),
        serde_yaml_ng::Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}
