use crate::app::SharedState;
use crate::handlers::{
    analyze_api, analyze_form, health_check, index, onboarding_api, onboarding_form, reset_api,
    reset_form, session_api, state_api,
};
use axum::{Router, routing::get, routing::post};

/// Creates and configures all application routes
pub fn create_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/onboarding", post(onboarding_form))
        .route("/analyze", post(analyze_form))
        .route("/reset", post(reset_form))
        .route("/health", get(health_check))
        .route("/api/state", get(state_api))
        .route("/api/session", get(session_api))
        .route("/api/onboarding", post(onboarding_api))
        .route("/api/analyze", post(analyze_api))
        .route("/api/reset", post(reset_api))
}
