pub mod health;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::intake::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/request_cv") }))
        .route("/health", get(health::health_handler))
        .route("/request_cv", get(handlers::handle_request_cv_page))
        .route("/submit_cv", post(handlers::handle_submit_cv))
        .with_state(state)
}
