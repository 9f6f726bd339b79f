//! HTTP surface: `POST /train`, `POST /query`, and `GET /health`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use faqbot_agent::{AgentRuntime, ArticleIngestor, TrainingInput};
use faqbot_core::errors::{ApplicationError, InterfaceError};
use faqbot_db::TrainingRecordRepository;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{info, warn};

use crate::health;

pub const TRAIN_SUCCESS_MESSAGE: &str = "Article added successfully!";

#[derive(Clone)]
pub struct ApiState {
    pub runtime: Arc<AgentRuntime>,
    pub ingestor: Arc<ArticleIngestor>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrainRequest {
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainResponse {
    pub message: &'static str,
    pub user_id: String,
    pub article_summary: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.0.message().to_owned() })).into_response()
    }
}

pub fn router(state: ApiState, records: Arc<dyn TrainingRecordRepository>) -> Router {
    Router::new()
        .route("/train", post(train))
        .route("/query", post(query))
        .with_state(state)
        .merge(health::router(records))
}

pub async fn train(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TrainResponse>, ApiError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    let request: TrainRequest = body_or_default(&headers, &body, &correlation_id)?;
    let input = TrainingInput { article: request.article, url: request.url };

    let outcome = state
        .ingestor
        .ingest(&input)
        .await
        .map_err(|error| reject("/train", error, &correlation_id))?;

    info!(
        event_name = "http.train.completed",
        correlation_id = %correlation_id,
        user_id = %outcome.user_id.0,
        "training article accepted"
    );

    Ok(Json(TrainResponse {
        message: TRAIN_SUCCESS_MESSAGE,
        user_id: outcome.user_id.0,
        article_summary: outcome.summary,
    }))
}

pub async fn query(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<QueryResponse>, ApiError> {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    let request: QueryRequest = body_or_default(&headers, &body, &correlation_id)?;
    let question = request.question.unwrap_or_default();

    let answer = state
        .runtime
        .answer(&question)
        .await
        .map_err(|error| reject("/query", error, &correlation_id))?;

    info!(event_name = "http.query.completed", correlation_id = %correlation_id, "query answered");
    Ok(Json(QueryResponse { answer }))
}

/// A body that is blank or sent without a JSON content type is treated as `{}`.
fn body_or_default<T: DeserializeOwned + Default>(
    headers: &HeaderMap,
    body: &Bytes,
    correlation_id: &str,
) -> Result<T, ApiError> {
    if !has_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    match Json::<T>::from_bytes(body) {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            warn!(
                event_name = "http.request.malformed",
                correlation_id = %correlation_id,
                error = %rejection.body_text(),
                "rejecting malformed request body"
            );
            Err(ApiError(InterfaceError::BadRequest {
                message: rejection.body_text(),
                correlation_id: correlation_id.to_owned(),
            }))
        }
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn reject(route: &'static str, error: ApplicationError, correlation_id: &str) -> ApiError {
    warn!(
        event_name = "http.request.failed",
        correlation_id = %correlation_id,
        route,
        error_kind = error.kind(),
        error = %error,
        "request failed"
    );
    ApiError(error.into_interface(correlation_id))
}
