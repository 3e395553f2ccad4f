//! Flow handles and the builder contract annotations implement.
//!
//! A `FlowHandle` accumulates one fragment per annotation application.
//! `attach` consumes and returns the handle, so composition order is fully
//! determined by the call chain and no handle is mutated behind the
//! caller's back.

use crate::core::compose::{self, ComposeRules};
use crate::core::error::DeployError;
use crate::core::types::{ConfigFragment, DeploymentSpec, Flow, FragmentCategory};

/// A flow plus the configuration fragments attached to it so far.
///
/// Fragments are held in application order: index 0 is the innermost
/// (first-applied) annotation, the last index the outermost.
#[derive(Debug, Clone)]
pub struct FlowHandle {
    flow: Flow,
    fragments: Vec<ConfigFragment>,
}

impl FlowHandle {
    /// Wrap a flow with an empty fragment list.
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            fragments: Vec::new(),
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn fragments(&self) -> &[ConfigFragment] {
        &self.fragments
    }

    /// Return a handle extended with one more fragment.
    pub fn with_fragment(mut self, fragment: ConfigFragment) -> Self {
        self.fragments.push(fragment);
        self
    }

    /// Compose the attached fragments into a deployment specification
    /// under the default merge rules.
    pub fn build_deployment(&self) -> Result<DeploymentSpec, DeployError> {
        compose::compose(self, &ComposeRules::default())
    }

    /// Compose under explicit merge rules.
    pub fn build_deployment_with(
        &self,
        rules: &ComposeRules,
    ) -> Result<DeploymentSpec, DeployError> {
        compose::compose(self, rules)
    }
}

/// Contract every annotation-producing object implements.
///
/// Implementors construct their fragment from their own parameters and
/// report malformed parameters as `InvalidConfiguration` before any
/// composition occurs.
pub trait DeploymentBuilder: std::fmt::Debug {
    /// Category this builder contributes to.
    fn category(&self) -> FragmentCategory;

    /// Construct this annotation's validated fragment.
    fn fragment(&self) -> Result<ConfigFragment, DeployError>;

    /// Append this annotation's fragment to the handle.
    fn attach(&self, handle: FlowHandle) -> Result<FlowHandle, DeployError> {
        Ok(handle.with_fragment(self.fragment()?))
    }
}
