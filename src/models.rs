use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::query::RequestLifecycle;
use crate::session::SessionState;

/// Onboarding payload, accepted as form or JSON
#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    #[serde(default)]
    pub agent_name: String,
}

/// Drug list payload, accepted as form or JSON
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub drugs: String,
}

/// Response payload for a completed analysis
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub count: usize,
    pub result: AnalysisResult,
}

/// Snapshot of the whole screen
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub session: SessionState,
    pub input: String,
    pub can_submit: bool,
    pub lifecycle: RequestLifecycle,
}

/// Response payload for the health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            message: "Service is healthy".to_string(),
        }
    }
}

impl OnboardingRequest {
    pub fn is_valid(&self) -> bool {
        !self.agent_name.trim().is_empty()
    }
}

impl AnalyzeRequest {
    /// Validates if the drug list is not empty or just whitespace
    pub fn is_valid(&self) -> bool {
        !self.drugs.trim().is_empty()
    }
}

impl AnalyzeResponse {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            count: result.count(),
            result,
        }
    }
}
