use axum::{
    extract::{rejection::FormRejection, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use tracing::warn;

use crate::intake::flash::FlashStatus;
use crate::intake::form::CvRequestForm;
use crate::intake::page::RequestCvPage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FlashQuery {
    pub status: Option<String>,
}

/// GET /request_cv
pub async fn handle_request_cv_page(Query(query): Query<FlashQuery>) -> Html<String> {
    let flash = query.status.as_deref().and_then(FlashStatus::from_query_value);
    Html(RequestCvPage { flash }.to_string())
}

/// POST /submit_cv
/// Always answers with a redirect back to the form carrying the outcome,
/// including when the body cannot be decoded as a form.
pub async fn handle_submit_cv(
    State(state): State<AppState>,
    form: Result<Form<CvRequestForm>, FormRejection>,
) -> Redirect {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Rejected CV request form: {rejection}");
            return Redirect::to(&FlashStatus::InternalError.redirect_target());
        }
    };

    let status = match state.intake.submit(form.into_details()).await {
        Ok(_) => FlashStatus::Received,
        Err(e) => e.flash_status(),
    };
    Redirect::to(&status.redirect_target())
}
