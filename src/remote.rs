//! Blocking client for the HTTP backend
//!
//! Mirrors the two-step browser flow: `calculate` posts the form and gets
//! pillars back, `analyze` posts the pillars and gets narrative sections.
//! Every failure is a [`SajuError::Network`]; nothing is retried.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::{BirthForm, FourPillars, Narrative, Result, SajuConfig, SajuError};

/// Client for a saju backend
#[derive(Debug, Clone)]
pub struct RemoteCalculator {
    base_url: String,
    timeout: Duration,
}

impl RemoteCalculator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Client for `config.remote_url`, if one is configured
    pub fn from_config(config: &SajuConfig) -> Option<Self> {
        config
            .remote_url
            .as_ref()
            .map(|url| Self::new(url.clone(), Duration::from_secs(config.remote_timeout_secs)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/calculate`
    pub fn calculate(&self, form: &BirthForm) -> Result<FourPillars> {
        self.post("/api/calculate", form)
    }

    /// `POST /api/analysis`
    pub fn analyze(&self, pillars: &FourPillars) -> Result<Narrative> {
        self.post("/api/analysis", pillars)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "Posting to backend");

        let response = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let detail = resp
                        .into_json::<serde_json::Value>()
                        .ok()
                        .and_then(|v| v.get("error").and_then(|m| m.as_str()).map(str::to_string))
                        .unwrap_or_default();
                    SajuError::network(format!("{} returned status {}: {}", url, code, detail))
                }
                ureq::Error::Transport(t) => {
                    SajuError::network(format!("Transport error for {}: {}", url, t))
                }
            })?;

        response
            .into_json()
            .map_err(|e| SajuError::network(format!("Malformed response from {}: {}", url, e)))
    }
}
