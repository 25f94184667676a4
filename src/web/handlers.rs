use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::error::ErrorKind;
use crate::web::AppState;
use crate::web::flash::{self, Flash};
use crate::web::pages::render_index;

pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt describing the itinerary you want.";

#[derive(Debug, Deserialize)]
pub struct PlanForm {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self, "web: request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), WebError> {
    let (jar, flash) = flash::take(jar);
    let html = render_index(&state.pages, flash.as_ref(), "", None)?;
    Ok((jar, Html(html)))
}

pub async fn plan(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<PlanForm>,
) -> Result<Response, WebError> {
    let prompt = form.prompt.trim();
    if prompt.is_empty() {
        let jar = flash::set(jar, &Flash::warning(EMPTY_PROMPT_MESSAGE));
        return Ok((jar, Redirect::to("/")).into_response());
    }

    match state.itineraries.generate(prompt).await {
        Ok(itinerary) => {
            let html = render_index(&state.pages, None, prompt, Some(itinerary.as_str()))?;
            Ok(Html(html).into_response())
        }
        Err(e) => {
            match e.kind() {
                ErrorKind::ValidationError => info!(error = %e, "plan: rejected prompt"),
                ErrorKind::ConfigurationError => error!(error = %e, "plan: service misconfigured"),
                ErrorKind::GenerationError => warn!(error = %e, "plan: generation failed"),
            }
            let jar = flash::set(jar, &Flash::danger(format!("Error generating itinerary: {}", e)));
            Ok((jar, Redirect::to("/")).into_response())
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}
