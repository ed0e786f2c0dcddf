use axum::Router;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::analysis::{AnalysisResult, SeverityPolicy};
use crate::config::Config;
use crate::interaction_service::{GeminiService, InteractionService};
use crate::query::{self, QueryFailure, Ticket};
use crate::render::Renderer;
use crate::routes::create_routes;
use crate::screen::{Screen, SubmitRejection};
use crate::store::{FileStore, StateStore};

/// Initialize tracing and logging for the application
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Shared state behind every handler: the one screen and its collaborators.
pub struct AppState {
    screen: Mutex<Screen>,
    service: Arc<dyn InteractionService>,
    renderer: Renderer,
    model: String,
    policy: SeverityPolicy,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub async fn new(
        store: Arc<dyn StateStore>,
        service: Arc<dyn InteractionService>,
        model: impl Into<String>,
        policy: SeverityPolicy,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            screen: Mutex::new(Screen::load(store).await?),
            service,
            renderer: Renderer::new()?,
            model: model.into(),
            policy,
        })
    }

    pub fn screen(&self) -> &Mutex<Screen> {
        &self.screen
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Move the screen into `Loading`. The lock is held only for the
    /// transition, never across the outbound call.
    pub async fn start_query(&self, drugs: &str) -> Result<(Ticket, String), SubmitRejection> {
        let mut screen = self.screen.lock().await;
        let ticket = screen.begin_query(drugs)?;
        Ok((ticket, screen.agent_name().to_string()))
    }

    /// Call the interaction service for a started query and record the
    /// outcome on the screen.
    pub async fn finish_query(
        &self,
        ticket: Ticket,
        agent_name: &str,
    ) -> Result<AnalysisResult, QueryFailure> {
        let outcome = query::analyze(
            self.service.as_ref(),
            &self.model,
            self.policy,
            ticket.drug_text(),
            agent_name,
        )
        .await;

        self.screen
            .lock()
            .await
            .complete_query(ticket, outcome.clone());
        outcome
    }
}

/// Router with all routes and middleware over the given state
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .merge(create_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Create and configure the Axum application from configuration
pub async fn create_app(config: &Config) -> anyhow::Result<Router> {
    info!("Initializing application router");

    let store: Arc<dyn StateStore> = Arc::new(FileStore::new(&config.state_file));
    info!("Using state file {}", config.state_file.display());

    let service: Arc<dyn InteractionService> = Arc::new(GeminiService::new(
        config.gemini_base_url.clone(),
        config.api_key.clone(),
    ));
    info!(
        "Interaction service: model '{}' at {}",
        config.model, config.gemini_base_url
    );

    let state = AppState::new(store, service, config.model.clone(), config.severity_policy).await?;
    Ok(build_router(Arc::new(state)))
}
