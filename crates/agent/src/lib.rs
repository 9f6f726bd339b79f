//! Answering and ingestion services for faqbot.
//!
//! - `llm` - chat-completion client (OpenAI-compatible wire format)
//! - `runtime` - `AgentRuntime`, which turns a question into an answer using every
//!   stored training record as context
//! - `ingest` - `ArticleIngestor`, which stores article text or scraped page content
//!
//! Both the HTTP API and the Slack surface call into these services; neither keeps
//! any state of its own.

pub mod ingest;
pub mod llm;
pub mod runtime;

pub use ingest::{ArticleFetcher, ArticleIngestor, HttpArticleFetcher, IngestOutcome, TrainingInput};
pub use llm::{LlmClient, LlmError, OpenAiChatClient};
pub use runtime::AgentRuntime;
