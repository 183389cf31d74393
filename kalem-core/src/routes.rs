//! HTTP surface. Every route except `/health` needs an `x-user-id` header.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use kalem_common::models::{Analysis, Exercise, IdiomSummary, IdiomView, MistakeStat};

use crate::Error;
use crate::services::{AnalysisService, ExerciseService, IdiomLibrary, MistakeTracker};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<AnalysisService>,
    pub exercises: ExerciseService,
    pub mistakes: MistakeTracker,
    pub idioms: IdiomLibrary,
}

/// Error body sent to clients: `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: format!("Invalid request: {}", rejection.body_text()),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AlreadyAnalyzed(_) => StatusCode::CONFLICT,
            Error::AnalysisService(_)
            | Error::AnalysisFormat(_)
            | Error::MalformedAnalysis(_)
            | Error::Http(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", err);
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// The caller, taken from the `x-user-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("missing x-user-id header"))?;
        let raw = raw
            .to_str()
            .map_err(|_| ApiError::unauthorized("invalid x-user-id header"))?;
        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| ApiError::unauthorized("invalid x-user-id header"))?;
        Ok(UserId(id))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    #[serde(default)]
    pub exercise_id: Option<String>,
    #[serde(default)]
    pub user_text: String,
}

impl AnalyzeBody {
    /// A missing or blank id maps to nil, which the pipeline rejects.
    fn exercise_id(&self) -> Result<Uuid, Error> {
        match self.exercise_id.as_deref().map(str::trim) {
            None | Some("") => Ok(Uuid::nil()),
            Some(raw) => Uuid::parse_str(raw)
                .map_err(|_| Error::InvalidRequest(format!("exerciseId '{}' is not a valid id", raw))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub user_text: String,
}

#[derive(Debug, Deserialize)]
pub struct MasteryBody {
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct IdiomLibraryResponse {
    pub idioms: Vec<IdiomView>,
    pub summary: IdiomSummary,
}

async fn analyze_writing(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let Json(body) = body?;
    let exercise_id = body.exercise_id()?;
    let analysis = state
        .analysis
        .analyze_submission(exercise_id, &body.user_text, user_id)
        .await?;
    Ok(Json(analysis))
}

async fn random_prompt(UserId(_): UserId) -> Json<serde_json::Value> {
    Json(json!({ "prompt": ExerciseService::random_prompt() }))
}

async fn submit_exercise(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Exercise>), ApiError> {
    let Json(body) = body?;
    let exercise = state
        .exercises
        .submit(user_id, &body.prompt, &body.user_text)
        .await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn list_exercises(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let limit = query.limit.unwrap_or(ExerciseService::DEFAULT_LIST_LIMIT);
    Ok(Json(state.exercises.list(user_id, limit).await?))
}

async fn top_mistakes(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<MistakeStat>>, ApiError> {
    let limit = query.limit.unwrap_or(MistakeTracker::DEFAULT_TOP_LIMIT);
    Ok(Json(state.mistakes.top_mistakes(user_id, limit).await?))
}

async fn set_mastery(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(mistake_id): Path<Uuid>,
    body: Result<Json<MasteryBody>, JsonRejection>,
) -> Result<Json<MistakeStat>, ApiError> {
    let Json(body) = body?;
    let stat = state
        .mistakes
        .set_mastery(user_id, mistake_id, body.level)
        .await?;
    Ok(Json(stat))
}

async fn idiom_library(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<SearchQuery>,
) -> Result<Json<IdiomLibraryResponse>, ApiError> {
    let (idioms, summary) = state
        .idioms
        .library(user_id, query.search.as_deref())
        .await?;
    Ok(Json(IdiomLibraryResponse { idioms, summary }))
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze-writing", post(analyze_writing))
        .route("/prompt", get(random_prompt))
        .route("/exercises", post(submit_exercise).get(list_exercises))
        .route("/mistakes", get(top_mistakes))
        .route("/mistakes/{id}/mastery", put(set_mastery))
        .route("/idioms", get(idiom_library))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
