use std::sync::Arc;
use std::time::Duration;

use faqbot_agent::ingest::FetchError;
use faqbot_agent::{AgentRuntime, ArticleIngestor, HttpArticleFetcher, LlmError, OpenAiChatClient};
use faqbot_core::config::{AppConfig, ConfigError, LoadOptions};
use faqbot_core::PromptAssembler;
use faqbot_db::{
    connect_with_settings, migrations, DbPool, SqlTrainingRecordRepository, TrainingRecordRepository,
};
use faqbot_slack::events::message_dispatcher;
use faqbot_slack::runner::EventsApiRunner;
use faqbot_slack::signature::SignatureVerifier;
use faqbot_slack::web_api::{SlackWebClient, WebApiError};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;
use crate::messaging::AgentMessageService;
use crate::slack_events::SlackEventsState;

const SLACK_WEB_API_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub records: Arc<dyn TrainingRecordRepository>,
    pub api: ApiState,
    pub slack: SlackEventsState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("completion client setup failed: {0}")]
    Llm(#[from] LlmError),
    #[error("article fetcher setup failed: {0}")]
    Fetcher(#[from] FetchError),
    #[error("slack web api client setup failed: {0}")]
    SlackWebApi(#[from] WebApiError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let api_key = config.llm.api_key.clone().ok_or_else(|| {
        ConfigError::Validation("llm.api_key is required (set FAQBOT_LLM_API_KEY)".to_string())
    })?;
    let llm_timeout = Duration::from_secs(config.llm.timeout_secs);
    let llm = OpenAiChatClient::new(
        api_key,
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        llm_timeout,
    )?;

    let records: Arc<dyn TrainingRecordRepository> =
        Arc::new(SqlTrainingRecordRepository::new(db_pool.clone()));
    let runtime = Arc::new(AgentRuntime::new(
        records.clone(),
        Arc::new(llm),
        PromptAssembler::new(config.bot.product_name.clone()),
    ));
    let ingestor = Arc::new(ArticleIngestor::new(
        records.clone(),
        Arc::new(HttpArticleFetcher::new(llm_timeout)?),
    ));

    let poster = SlackWebClient::new(
        config.slack.bot_token.clone(),
        config.slack.api_base_url.clone(),
        SLACK_WEB_API_TIMEOUT,
    )?;
    let runner = EventsApiRunner::new(
        message_dispatcher(AgentMessageService::new(runtime.clone())),
        Arc::new(poster),
    );

    Ok(Application {
        slack: SlackEventsState {
            verifier: Arc::new(SignatureVerifier::new(config.slack.signing_secret.clone())),
            runner: Arc::new(runner),
        },
        api: ApiState { runtime, ingestor },
        config,
        db_pool,
        records,
    })
}
