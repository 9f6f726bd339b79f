use std::sync::Arc;

use faqbot_core::errors::ApplicationError;
use faqbot_core::prompt::PromptAssembler;
use faqbot_db::TrainingRecordRepository;
use tracing::{info, warn};

use crate::llm::LlmClient;

/// Answers free-text questions from the full training store.
pub struct AgentRuntime {
    records: Arc<dyn TrainingRecordRepository>,
    llm: Arc<dyn LlmClient>,
    prompt: PromptAssembler,
}

impl AgentRuntime {
    pub fn new(
        records: Arc<dyn TrainingRecordRepository>,
        llm: Arc<dyn LlmClient>,
        prompt: PromptAssembler,
    ) -> Self {
        Self { records, llm, prompt }
    }

    pub async fn answer(&self, question: &str) -> Result<String, ApplicationError> {
        let records = self
            .records
            .list_all()
            .await
            .map_err(|error| ApplicationError::StoreUnavailable(error.to_string()))?;

        let context = self.prompt.assemble(&records, question);
        info!(
            event_name = "agent.answer.prompt_assembled",
            record_count = records.len(),
            context_chars = context.chars().count(),
            "assembled completion context"
        );

        self.llm.complete(&context, question).await.map_err(|error| {
            warn!(
                event_name = "agent.answer.completion_failed",
                error = %error,
                "completion request failed"
            );
            ApplicationError::CompletionUnavailable(error.to_string())
        })
    }
}
