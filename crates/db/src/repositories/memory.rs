use tokio::sync::RwLock;

use faqbot_core::domain::training::TrainingRecord;

use super::{RepositoryError, TrainingRecordRepository};

#[derive(Default)]
pub struct InMemoryTrainingRecordRepository {
    records: RwLock<Vec<TrainingRecord>>,
}

impl InMemoryTrainingRecordRepository {
    pub fn with_records(records: Vec<TrainingRecord>) -> Self {
        Self { records: RwLock::new(records) }
    }
}

#[async_trait::async_trait]
impl TrainingRecordRepository for InMemoryTrainingRecordRepository {
    async fn list_all(&self) -> Result<Vec<TrainingRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.clone())
    }

    async fn put(&self, record: TrainingRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let duplicate = records.iter().any(|existing| {
            existing.user_id == record.user_id && existing.question_id == record.question_id
        });
        if duplicate {
            return Err(RepositoryError::Duplicate {
                user_id: record.user_id.0,
                question_id: record.question_id.0,
            });
        }
        records.push(record);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use faqbot_core::domain::training::TrainingRecord;

    use crate::repositories::{
        InMemoryTrainingRecordRepository, RepositoryError, TrainingRecordRepository,
    };

    #[tokio::test]
    async fn in_memory_repo_preserves_append_order() {
        let repo = InMemoryTrainingRecordRepository::default();
        let first = TrainingRecord::article("first");
        let second = TrainingRecord::article("second");

        repo.put(first.clone()).await.expect("put first");
        repo.put(second.clone()).await.expect("put second");

        assert_eq!(repo.list_all().await.expect("list"), vec![first, second]);
        assert_eq!(repo.count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn in_memory_repo_rejects_duplicate_keys() {
        let record = TrainingRecord::article("only once");
        let repo = InMemoryTrainingRecordRepository::with_records(vec![record.clone()]);

        let error = repo.put(record).await.expect_err("duplicate should fail");
        assert!(matches!(error, RepositoryError::Duplicate { .. }));
    }
}
