use chrono::Utc;
use sqlx::Row;

use faqbot_core::domain::training::{QuestionId, TrainingRecord, UserId};

use super::{RepositoryError, TrainingRecordRepository};
use crate::DbPool;

pub const TRAINING_TABLE: &str = "bot_training_data";

pub struct SqlTrainingRecordRepository {
    pool: DbPool,
}

impl SqlTrainingRecordRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingRecord, RepositoryError> {
    let user_id: String =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let question_id: String =
        row.try_get("question_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let question: String =
        row.try_get("question").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let answer: String =
        row.try_get("answer").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(TrainingRecord {
        user_id: UserId(user_id),
        question_id: QuestionId(question_id),
        question,
        answer,
    })
}

#[async_trait::async_trait]
impl TrainingRecordRepository for SqlTrainingRecordRepository {
    async fn list_all(&self) -> Result<Vec<TrainingRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT user_id, question_id, question, answer
             FROM bot_training_data
             ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn put(&self, record: TrainingRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO bot_training_data (user_id, question_id, question, answer, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.user_id.0)
        .bind(&record.question_id.0)
        .bind(&record.question)
        .bind(&record.answer)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(RepositoryError::Duplicate {
                    user_id: record.user_id.0,
                    question_id: record.question_id.0,
                })
            }
            Err(error) => Err(RepositoryError::Database(error)),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bot_training_data")
            .fetch_one(&self.pool)
            .await?;
        u64::try_from(count).map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use faqbot_core::domain::training::{QuestionId, TrainingRecord, UserId};

    use super::SqlTrainingRecordRepository;
    use crate::repositories::{RepositoryError, TrainingRecordRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    fn sample_record(question: &str, answer: &str) -> TrainingRecord {
        TrainingRecord {
            user_id: UserId::generate(),
            question_id: QuestionId::generate(),
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_table_lists_nothing() {
        let repo = SqlTrainingRecordRepository::new(setup().await);

        let records = repo.list_all().await.expect("list");
        assert!(records.is_empty());
        assert_eq!(repo.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn put_then_list_returns_records_in_insertion_order() {
        let repo = SqlTrainingRecordRepository::new(setup().await);
        let first = sample_record("What is FailSafe?", "A monitoring tool.");
        let second = TrainingRecord::article("FailSafe prevents outages.");
        let third = sample_record("Who runs it?", "The platform team.");

        repo.put(first.clone()).await.expect("put first");
        repo.put(second.clone()).await.expect("put second");
        repo.put(third.clone()).await.expect("put third");

        let records = repo.list_all().await.expect("list");
        assert_eq!(records, vec![first, second, third]);
        assert_eq!(repo.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn count_without_table_is_database_error() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        let repo = SqlTrainingRecordRepository::new(pool);

        let error = repo.count().await.expect_err("missing table should fail");
        assert!(matches!(error, RepositoryError::Database(_)));
    }

    #[tokio::test]
    async fn duplicate_identifiers_are_rejected() {
        let repo = SqlTrainingRecordRepository::new(setup().await);
        let record = sample_record("q", "a");

        repo.put(record.clone()).await.expect("first put");
        let error = repo.put(record).await.expect_err("second put should fail");

        assert!(matches!(error, RepositoryError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn closed_pool_surfaces_database_error() {
        let pool = setup().await;
        let repo = SqlTrainingRecordRepository::new(pool.clone());
        pool.close().await;

        let error = repo.list_all().await.expect_err("closed pool should fail");
        assert!(matches!(error, RepositoryError::Database(_)));
    }
}
