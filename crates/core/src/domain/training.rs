use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Label stored in `question` for every record created from an ingested article.
pub const ARTICLE_QUESTION_LABEL: &str = "Article";

/// Number of characters of stored content echoed back in an ingestion summary.
pub const SUMMARY_CHAR_LIMIT: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// A stored question/answer pair used as context when answering new questions.
///
/// Records are append-only: the ingestion path creates them and nothing in the
/// system updates or deletes them afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub question: String,
    pub answer: String,
}

impl TrainingRecord {
    /// Builds a fresh article record with newly generated identifiers.
    pub fn article(content: impl Into<String>) -> Self {
        Self {
            user_id: UserId::generate(),
            question_id: QuestionId::generate(),
            question: ARTICLE_QUESTION_LABEL.to_owned(),
            answer: content.into(),
        }
    }
}

/// Descriptive summary returned to the caller after ingestion. Never parsed again.
pub fn article_summary(content: &str) -> String {
    let head: String = content.chars().take(SUMMARY_CHAR_LIMIT).collect();
    format!("Summary of article: {head}...")
}
