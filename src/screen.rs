use std::sync::Arc;
use tracing::debug;

use crate::analysis::AnalysisResult;
use crate::query::{QueryController, QueryFailure, RequestLifecycle, Ticket};
use crate::render::{MainView, Renderer};
use crate::session::{SessionController, SessionState};
use crate::store::{StateStore, StoreError};

/// Why a submission did not start a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejection {
    #[error("onboarding has not been completed")]
    NotOnboarded,

    #[error("drug list cannot be empty or only whitespace")]
    EmptyInput,

    #[error("a query is already in progress")]
    InFlight,
}

/// The single screen: onboarding flags plus the query it owns.
pub struct Screen {
    session: SessionController,
    query: QueryController,
}

impl Screen {
    pub async fn load(store: Arc<dyn StateStore>) -> Result<Self, StoreError> {
        Ok(Self {
            session: SessionController::load(store).await?,
            query: QueryController::new(),
        })
    }

    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn query(&self) -> &QueryController {
        &self.query
    }

    pub fn lifecycle(&self) -> &RequestLifecycle {
        self.query.lifecycle()
    }

    /// Keep edited drug text even when it cannot be submitted yet.
    pub fn set_input(&mut self, text: &str) {
        self.query.set_input(text);
    }

    pub async fn submit_agent_name(&mut self, name: &str) -> Result<bool, StoreError> {
        self.session.submit_agent_name(name).await
    }

    /// Start a query if the main screen is reachable and the guard allows it.
    pub fn begin_query(&mut self, drug_text: &str) -> Result<Ticket, SubmitRejection> {
        if !self.session.is_onboarded() {
            return Err(SubmitRejection::NotOnboarded);
        }
        if drug_text.trim().is_empty() {
            return Err(SubmitRejection::EmptyInput);
        }
        self.query.begin(drug_text).ok_or(SubmitRejection::InFlight)
    }

    pub fn complete_query(
        &mut self,
        ticket: Ticket,
        outcome: Result<AnalysisResult, QueryFailure>,
    ) -> bool {
        self.query.complete(ticket, outcome)
    }

    /// Clear all persisted state and drop any query, including one in flight.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.session.reset().await?;
        self.query.reset();
        Ok(())
    }

    pub fn agent_name(&self) -> &str {
        self.session.agent_name()
    }

    pub fn render(&self, renderer: &Renderer) -> Result<String, minijinja::Error> {
        if !self.session.is_onboarded() {
            debug!("Rendering onboarding screen");
            return renderer.onboarding();
        }

        renderer.main(MainView {
            session: self.session.state(),
            input: self.query.input(),
            can_submit: self.query.can_submit(),
            lifecycle: self.query.lifecycle(),
        })
    }
}
