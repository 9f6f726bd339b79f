use std::sync::Arc;

use async_trait::async_trait;
use faqbot_agent::AgentRuntime;
use faqbot_slack::events::{EventContext, EventHandlerError, MessageService};

/// Answers Slack messages with the same cycle as `/query`.
pub struct AgentMessageService {
    runtime: Arc<AgentRuntime>,
}

impl AgentMessageService {
    pub fn new(runtime: Arc<AgentRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl MessageService for AgentMessageService {
    async fn answer_message(
        &self,
        text: &str,
        _ctx: &EventContext,
    ) -> Result<String, EventHandlerError> {
        self.runtime
            .answer(text)
            .await
            .map_err(|error| EventHandlerError::Message(error.to_string()))
    }
}
