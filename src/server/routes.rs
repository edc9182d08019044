//! HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::KataError;
use crate::judge::Job;
use crate::leaderboard;
use crate::prompt;
use crate::questions::{self, Difficulty, Question};
use crate::storage::Submission;

use super::ServerState;

/// [`KataError`] rendered as an HTTP response.
pub struct ApiError(KataError);

impl From<KataError> for ApiError {
    fn from(err: KataError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            KataError::QuestionNotFound(_) | KataError::SubmissionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            KataError::Upstream(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct DifficultyParams {
    #[serde(default)]
    difficulty: Option<String>,
}

impl DifficultyParams {
    /// Unknown or missing values fall back to easy.
    fn resolve(&self) -> Difficulty {
        self.difficulty
            .as_deref()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// `GET /`
pub async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome to the kata API!" }))
}

/// `GET /api/daily-question?difficulty=`: today's question together with
/// its parsed statement blocks. Expected outputs never leave the server
/// on this route.
pub async fn daily_question(
    State(state): State<ServerState>,
    Query(params): Query<DifficultyParams>,
) -> ApiResult<Json<Value>> {
    let difficulty = params.resolve();
    let question = questions::daily_question(&state.store, &state.config, difficulty).await?;
    Ok(Json(daily_payload(&question, difficulty)))
}

fn daily_payload(question: &Question, difficulty: Difficulty) -> Value {
    json!({
        "problem_id": question.problem_id,
        "title": question.title,
        "difficulty": difficulty,
        "description": question.description,
        "starter_code": question.starter_code,
        "test_cases": question.test_cases.inputs,
        "prompt": prompt::parse(&question.description),
    })
}

/// `GET /api/get-test-cases?difficulty=`: display strings of today's
/// test-case inputs.
pub async fn get_test_cases(
    State(state): State<ServerState>,
    Query(params): Query<DifficultyParams>,
) -> ApiResult<Json<Value>> {
    let difficulty = params.resolve();
    let question = questions::daily_question(&state.store, &state.config, difficulty).await?;
    let cases: Vec<String> = question
        .test_cases
        .inputs
        .iter()
        .map(|input| render_case(input))
        .collect();
    Ok(Json(json!({ "testCases": cases })))
}

/// Single-argument calls render as the bare value, multi-argument calls as
/// the full argument array.
fn render_case(input: &[Value]) -> String {
    match input {
        [single] => single.to_string(),
        many => Value::Array(many.to_vec()).to_string(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitCodePayload {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub problem_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_submit: bool,
}

/// `POST /api/submit-code`: snapshot the question, persist a queued
/// submission, and hand the job to the judge worker. Replies 503 when the
/// queue is full.
pub async fn submit_code(
    State(state): State<ServerState>,
    Json(payload): Json<SubmitCodePayload>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let question = match payload.problem_id.as_deref() {
        Some(problem_id) => questions::find_question(&state.store, problem_id)?
            .ok_or_else(|| KataError::QuestionNotFound(problem_id.to_string()))?,
        None => questions::daily_question(&state.store, &state.config, Difficulty::Easy).await?,
    };

    let job_id = Uuid::new_v4().to_string();
    let submission = Submission::queued(
        &job_id,
        &question.problem_id,
        payload.user_id.as_deref(),
        &payload.language,
    );
    state.store.insert_submission(&submission)?;

    let job = Job {
        job_id: job_id.clone(),
        problem_id: question.problem_id,
        user_id: payload.user_id,
        language: payload.language,
        code: payload.code,
        is_submit: payload.is_submit,
        starter_code: question.starter_code,
        test_cases: question.test_cases,
    };

    if state.queue.try_send(job).is_err() {
        warn!(job_id = %job_id, "judge queue is full, rejecting submission");
        let reason = "judge queue is full, try again shortly";
        state
            .store
            .finish_submission(&job_id, &json!({ "error": reason }))?;
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": reason })),
        ));
    }

    info!(job_id = %job_id, "submission queued");
    Ok((
        StatusCode::OK,
        Json(json!({ "job_id": job_id, "status": "queued" })),
    ))
}

/// `GET /api/submission/:job_id`
pub async fn submission_status(
    State(state): State<ServerState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Submission>> {
    Ok(Json(state.store.get_submission(&job_id)?))
}

/// `GET /api/leaderboard`
pub async fn leaderboard(
    State(state): State<ServerState>,
) -> ApiResult<Json<leaderboard::Leaderboard>> {
    let board = leaderboard::current(&state.store, state.config.leaderboard.size)?;
    Ok(Json(board))
}

/// `GET /api/health`
pub async fn health(State(state): State<ServerState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now().naive_utc(),
    }))
}
