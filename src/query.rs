use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::analysis::{AnalysisResult, SeverityPolicy, parse_analysis};
use crate::interaction_service::{InteractionService, build_request};

/// The only message a failed query ever shows.
pub const GENERIC_ERROR: &str =
    "Failed to fetch interactions. Please ensure you enter valid drug names.";

/// Where the screen's single query currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum RequestLifecycle {
    #[default]
    Idle,
    Loading,
    Success(AnalysisResult),
    Failed(String),
}

impl RequestLifecycle {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Query failure as seen by the caller. The underlying cause has already been
/// logged and is deliberately not carried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}", message = GENERIC_ERROR)]
pub struct QueryFailure;

/// Run one analysis: build the request, call the service once, validate.
pub async fn analyze(
    service: &dyn InteractionService,
    model: &str,
    policy: SeverityPolicy,
    drug_text: &str,
    agent_name: &str,
) -> Result<AnalysisResult, QueryFailure> {
    let request = build_request(model, drug_text, agent_name);

    let text = service.analyze(&request).await.map_err(|e| {
        error!("Interaction service call failed: {}", e);
        QueryFailure
    })?;

    let result = parse_analysis(&text, policy).map_err(|e| {
        error!("Rejected interaction service response: {}", e);
        QueryFailure
    })?;

    info!(
        "Analysis returned {} interaction(s) for '{}'",
        result.count(),
        drug_text.trim()
    );
    Ok(result)
}

/// Proof that a query was started, redeemed by [`QueryController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    drug_text: String,
}

impl Ticket {
    pub fn drug_text(&self) -> &str {
        &self.drug_text
    }
}

/// Owns the drug input and the request lifecycle of the screen.
#[derive(Debug, Default)]
pub struct QueryController {
    input: String,
    lifecycle: RequestLifecycle,
    generation: u64,
}

impl QueryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Editing is allowed in every state, including while loading.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn lifecycle(&self) -> &RequestLifecycle {
        &self.lifecycle
    }

    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && !self.lifecycle.is_loading()
    }

    /// Start a query for `drug_text`.
    ///
    /// Returns `None` and leaves everything untouched when the trimmed text is
    /// empty or a query is already in flight. Otherwise any previous result or
    /// error is dropped and the controller enters `Loading`.
    pub fn begin(&mut self, drug_text: &str) -> Option<Ticket> {
        if self.lifecycle.is_loading() {
            warn!("Query already in flight, ignoring submission");
            return None;
        }
        if drug_text.trim().is_empty() {
            debug!("Ignoring empty drug list");
            return None;
        }

        self.input = drug_text.to_string();
        self.lifecycle = RequestLifecycle::Loading;
        self.generation += 1;
        Some(Ticket {
            generation: self.generation,
            drug_text: drug_text.trim().to_string(),
        })
    }

    /// Apply the outcome of a query. Returns `false` when the ticket is stale
    /// (the screen was reset meanwhile) and the outcome was discarded.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, QueryFailure>,
    ) -> bool {
        if ticket.generation != self.generation || !self.lifecycle.is_loading() {
            info!("Discarding result of superseded query");
            return false;
        }

        self.lifecycle = match outcome {
            Ok(result) => RequestLifecycle::Success(result),
            Err(failure) => RequestLifecycle::Failed(failure.to_string()),
        };
        true
    }

    /// Back to `Idle` with an empty input. Outstanding tickets become stale.
    pub fn reset(&mut self) {
        self.input.clear();
        self.lifecycle = RequestLifecycle::Idle;
        self.generation += 1;
    }
}
