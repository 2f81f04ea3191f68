//! # API REST
//!
//! REST API for the Medical Tracker prediction service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON (de)serialization, status codes, CORS)
//!
//! Scoring itself is done by `medtracker-core`; this crate only adapts requests and responses.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use medtracker_core::{matcher, Catalog, Condition, ScoredCondition, SymptomToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Number of scored conditions returned by `/api/predict`.
pub const PREDICT_LIMIT: usize = 5;

const PREDICT_USAGE: &str = r#"Provide JSON: {"symptoms": ["fever","cough"]}"#;

/// Application state shared by all handlers.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// Request body for `/api/predict`. Non-string entries are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictReq {
    pub symptoms: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRes {
    pub condition_id: String,
    pub name: String,
    pub description: String,
    pub causes: String,
    pub symptoms: Vec<String>,
    pub meds: Vec<String>,
    /// Score rounded to two decimals.
    pub score: f64,
    pub match_count: usize,
}

impl From<ScoredCondition> for ScoredRes {
    fn from(scored: ScoredCondition) -> Self {
        Self {
            condition_id: scored.condition_id,
            name: scored.name,
            description: scored.description,
            causes: scored.causes,
            symptoms: scored.symptoms,
            meds: scored.meds,
            score: (scored.score * 100.0).round() / 100.0,
            match_count: scored.match_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictRes {
    /// The normalized symptoms, in request order.
    pub input: Vec<String>,
    pub scored: Vec<ScoredRes>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConditionRes {
    pub id: String,
    pub name: String,
    pub description: String,
    pub causes: String,
    pub symptoms: Vec<String>,
    pub meds: Vec<String>,
}

impl From<&Condition> for ConditionRes {
    fn from(condition: &Condition) -> Self {
        Self {
            id: condition.id.clone(),
            name: condition.name.clone(),
            description: condition.description.clone(),
            causes: condition.causes.clone(),
            symptoms: condition.symptoms.clone(),
            meds: condition.meds.clone(),
        }
    }
}

/// An error returned to the client as `{"error": "..."}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorRes {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, predict, list_catalog),
    components(schemas(
        HealthRes,
        ErrorRes,
        PredictReq,
        PredictRes,
        ScoredRes,
        ConditionRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `catalog`, including Swagger UI and permissive CORS.
pub fn router(catalog: Arc<Catalog>) -> Router {
    let state = AppState { catalog };

    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .route("/api/catalog", get(list_catalog))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Medical Tracker REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/predict",
    request_body = PredictReq,
    responses(
        (status = 200, description = "Best matching conditions", body = PredictRes),
        (status = 400, description = "Missing or empty symptom list", body = ErrorRes)
    )
)]
/// Scores the submitted symptoms against the catalog.
///
/// Each entry is normalized as a single symptom (no splitting on separators). The response
/// carries the best [`PREDICT_LIMIT`] conditions, zero scores included.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not JSON or has no non-empty `symptoms` list,
/// - no entry survives normalization.
#[axum::debug_handler]
async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictRes>, ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("rejected predict body: {}", e);
        ApiError::bad_request(PREDICT_USAGE)
    })?;

    let input = requested_symptoms(&body)?;
    let scored = matcher::score(&input, &state.catalog)
        .into_iter()
        .take(PREDICT_LIMIT)
        .map(ScoredRes::from)
        .collect();

    Ok(Json(PredictRes {
        input: input.into_iter().map(SymptomToken::into_string).collect(),
        scored,
    }))
}

fn requested_symptoms(body: &Value) -> Result<Vec<SymptomToken>, ApiError> {
    let items = body
        .get("symptoms")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::bad_request(PREDICT_USAGE))?;

    let tokens: Vec<SymptomToken> = items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| SymptomToken::new(s).ok())
        .collect();

    if tokens.is_empty() {
        return Err(ApiError::bad_request("No usable symptoms provided"));
    }
    Ok(tokens)
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    responses(
        (status = 200, description = "All known conditions", body = [ConditionRes])
    )
)]
#[axum::debug_handler]
async fn list_catalog(State(state): State<AppState>) -> Json<Vec<ConditionRes>> {
    Json(
        state
            .catalog
            .conditions()
            .iter()
            .map(ConditionRes::from)
            .collect(),
    )
}

async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        message: "Not found".into(),
    }
}
