use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use faqbot_db::{TrainingRecordRepository, TRAINING_TABLE};
use serde::Serialize;
use tracing::warn;

#[derive(Clone)]
pub struct HealthState {
    pub records: Arc<dyn TrainingRecordRepository>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrainingStoreCheck {
    pub status: Readiness,
    pub table: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: Readiness,
    pub training_store: TrainingStoreCheck,
    pub checked_at: String,
}

pub fn router(records: Arc<dyn TrainingRecordRepository>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { records })
}

/// Ready only while the training table can be read.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let training_store = training_store_check(state.records.as_ref()).await;
    let status = training_store.status;
    let status_code = match status {
        Readiness::Ready => StatusCode::OK,
        Readiness::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(HealthResponse { status, training_store, checked_at: Utc::now().to_rfc3339() }))
}

async fn training_store_check(records: &dyn TrainingRecordRepository) -> TrainingStoreCheck {
    match records.count().await {
        Ok(count) => TrainingStoreCheck {
            status: Readiness::Ready,
            table: TRAINING_TABLE,
            record_count: Some(count),
            error: None,
        },
        Err(error) => {
            warn!(event_name = "http.health.degraded", error = %error, "training store unreadable");
            TrainingStoreCheck {
                status: Readiness::Degraded,
                table: TRAINING_TABLE,
                record_count: None,
                error: Some(error.to_string()),
            }
        }
    }
}
