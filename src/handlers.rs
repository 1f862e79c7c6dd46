use crate::config::Config;
use crate::dataset::ReferenceDataset;
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::services::EligibilityService;
use crate::templates::{FormTemplate, ResultTemplate};
use askama::Template;
use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Label encoders and classifiers.
    pub eligibility: EligibilityService,
    /// Source of the dropdown values.
    pub dataset: ReferenceDataset,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Renders the input form with the dropdown options from the dataset.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let template = FormTemplate::from(state.dataset.options());
    let html = template.render().context("rendering form page")?;
    Ok(Html(html))
}

/// POST /get_districts_and_regions
///
/// Districts and regions for the selected state. A missing state yields
/// empty lists.
pub async fn get_districts_and_regions(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StateQuery>, JsonRejection>,
) -> Result<Json<DistrictsAndRegions>, AppError> {
    let Json(query) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result = match query.state.as_deref() {
        Some(selected) => state.dataset.districts_and_regions(selected),
        None => DistrictsAndRegions {
            districts: Vec::new(),
            regions: Vec::new(),
        },
    };

    tracing::debug!(
        "State {:?}: {} districts, {} regions",
        query.state,
        result.districts.len(),
        result.regions.len()
    );
    Ok(Json(result))
}

/// POST /predict
///
/// Encodes the submitted form, runs every classifier and renders the
/// verdicts. Missing fields are a client error.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let record = RawRecord::from(form);

    let evaluation = state.eligibility.evaluate(&record);
    tracing::info!(
        "Predicted eligibility for {} schemes ({} encoding warnings)",
        evaluation.predictions.len(),
        evaluation.input.warnings.len()
    );

    let html = ResultTemplate::new(&evaluation.predictions)
        .render()
        .context("rendering result page")?;
    Ok(Html(html))
}

/// GET /api/v1/options
pub async fn options(State(state): State<Arc<AppState>>) -> Json<DropdownOptions> {
    Json(state.dataset.options())
}

/// POST /api/v1/predict
///
/// JSON counterpart of `/predict` that also reports probabilities,
/// thresholds and encoding warnings.
pub async fn predict_api(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(record) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let evaluation = state.eligibility.evaluate(&record);

    Ok(Json(PredictResponse {
        results: evaluation
            .predictions
            .into_iter()
            .map(|(category, prediction)| (category.key(), prediction))
            .collect(),
        warnings: evaluation
            .input
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect(),
    }))
}
