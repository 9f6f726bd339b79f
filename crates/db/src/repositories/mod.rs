use async_trait::async_trait;
use thiserror::Error;

use faqbot_core::domain::training::TrainingRecord;

pub mod memory;
pub mod training;

pub use memory::InMemoryTrainingRecordRepository;
pub use training::{SqlTrainingRecordRepository, TRAINING_TABLE};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("duplicate training record `{user_id}/{question_id}`")]
    Duplicate { user_id: String, question_id: String },
}

/// Gateway over the table of stored question/answer records.
///
/// There is intentionally no update or delete: records are append-only.
#[async_trait]
pub trait TrainingRecordRepository: Send + Sync {
    /// Every stored record, in insertion order.
    async fn list_all(&self) -> Result<Vec<TrainingRecord>, RepositoryError>;
    async fn put(&self, record: TrainingRecord) -> Result<(), RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}
