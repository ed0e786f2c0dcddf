use crate::app::SharedState;
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, HealthResponse, OnboardingRequest, StateResponse,
};
use crate::screen::SubmitRejection;
use crate::session::SessionState;
use axum::{
    Form,
    extract::{Json, State},
    response::{Html, Json as ResponseJson, Redirect},
};
use tracing::{debug, info};

/// Health check handler
/// Returns the service status and health information
pub async fn health_check() -> AppResult<ResponseJson<HealthResponse>> {
    debug!("Health check endpoint called");

    let response = HealthResponse::ok();

    info!("Health check successful");
    Ok(ResponseJson(response))
}

// -- HTML screen

/// Renders the onboarding form or the main screen
pub async fn index(State(state): State<SharedState>) -> AppResult<Html<String>> {
    let screen = state.screen().lock().await;
    Ok(Html(screen.render(state.renderer())?))
}

pub async fn onboarding_form(
    State(state): State<SharedState>,
    Form(payload): Form<OnboardingRequest>,
) -> AppResult<Redirect> {
    state
        .screen()
        .lock()
        .await
        .submit_agent_name(&payload.agent_name)
        .await?;
    Ok(Redirect::to("/"))
}

/// Starts the query and returns to the screen right away; the page shows the
/// loading state until the query settles.
pub async fn analyze_form(
    State(state): State<SharedState>,
    Form(payload): Form<AnalyzeRequest>,
) -> Redirect {
    match state.start_query(&payload.drugs).await {
        Ok((ticket, agent_name)) => {
            info!("Analyze form submitted with drugs: {}", ticket.drug_text());
            let state = state.clone();
            tokio::spawn(async move {
                let _ = state.finish_query(ticket, &agent_name).await;
            });
        }
        Err(SubmitRejection::InFlight) => {
            debug!("Query in flight, keeping edited drug list");
            state.screen().lock().await.set_input(&payload.drugs);
        }
        Err(rejection) => debug!("Submission ignored: {}", rejection),
    }
    Redirect::to("/")
}

pub async fn reset_form(State(state): State<SharedState>) -> AppResult<Redirect> {
    state.screen().lock().await.reset().await?;
    Ok(Redirect::to("/"))
}

// -- JSON API

pub async fn session_api(State(state): State<SharedState>) -> ResponseJson<SessionState> {
    ResponseJson(state.screen().lock().await.session().clone())
}

pub async fn state_api(State(state): State<SharedState>) -> ResponseJson<StateResponse> {
    let screen = state.screen().lock().await;
    ResponseJson(StateResponse {
        session: screen.session().clone(),
        input: screen.query().input().to_string(),
        can_submit: screen.session().onboarded && screen.query().can_submit(),
        lifecycle: screen.lifecycle().clone(),
    })
}

pub async fn onboarding_api(
    State(state): State<SharedState>,
    Json(payload): Json<OnboardingRequest>,
) -> AppResult<ResponseJson<StateResponse>> {
    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Agent name cannot be empty or only whitespace".to_string(),
        ));
    }

    let accepted = state
        .screen()
        .lock()
        .await
        .submit_agent_name(&payload.agent_name)
        .await?;
    if !accepted {
        return Err(AppError::Conflict(
            "Onboarding has already been completed".to_string(),
        ));
    }
    Ok(state_api(State(state)).await)
}

/// Runs a query to completion and returns the validated result
pub async fn analyze_api(
    State(state): State<SharedState>,
    Json(payload): Json<AnalyzeRequest>,
) -> AppResult<ResponseJson<AnalyzeResponse>> {
    info!("Analyze endpoint called with drugs: {}", payload.drugs);

    if !payload.is_valid() {
        return Err(AppError::ValidationError(
            "Drug list cannot be empty or only whitespace".to_string(),
        ));
    }

    let (ticket, agent_name) = state.start_query(&payload.drugs).await?;
    let result = state.finish_query(ticket, &agent_name).await?;

    info!("Successfully analyzed drug list, returning response");
    Ok(ResponseJson(AnalyzeResponse::new(result)))
}

pub async fn reset_api(State(state): State<SharedState>) -> AppResult<ResponseJson<StateResponse>> {
    state.screen().lock().await.reset().await?;
    Ok(state_api(State(state)).await)
}
