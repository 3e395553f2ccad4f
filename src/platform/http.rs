//! HTTP orchestrator client.
//!
//! Synchronous, blocking submission of the JSON-encoded specification to
//! the platform's deployment endpoint. One request per apply; no retries.

use crate::core::types::DeploymentSpec;

use super::{ApplyReceipt, Orchestrator, PlatformError};

/// Client for a platform reachable over HTTP.
pub struct HttpOrchestrator {
    base_url: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpOrchestrator {
    /// Create a client for the platform at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Authenticate requests with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Deployment registration endpoint.
    pub fn deployments_url(&self) -> String {
        format!("{}/api/deployments", self.base_url)
    }
}

impl Orchestrator for HttpOrchestrator {
    fn register(&self, spec: &DeploymentSpec) -> Result<ApplyReceipt, PlatformError> {
        let mut request = self.client.post(self.deployments_url()).json(spec);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PlatformError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ApplyReceipt>()
            .map_err(|e| PlatformError::Malformed(e.to_string()))
    }
}
