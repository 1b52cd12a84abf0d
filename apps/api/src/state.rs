use std::sync::Arc;

use crate::intake::IntakeService;

/// Shared application state injected into all route handlers via Axum extractors.
/// The store and mail clients inside `intake` are built once at startup and
/// only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeService>,
}
