//! Content ingestion for the training path.
//!
//! Accepts article text or a URL. A URL always wins when both are supplied; the page
//! is fetched and the text of every `<p>` element is concatenated, each followed by a
//! newline. The result is stored as a new `Article` record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use faqbot_core::domain::training::{article_summary, TrainingRecord, UserId};
use faqbot_core::errors::ApplicationError;
use faqbot_db::TrainingRecordRepository;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info};

pub const MISSING_INPUT_MESSAGE: &str = "No article or URL provided.";
pub const EXTRACTION_FAILED_MESSAGE: &str = "Failed to extract article content from the URL.";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("page returned status {0}")]
    Status(u16),
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpArticleFetcher {
    client: reqwest::Client,
}

impl HttpArticleFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("faqbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Text of every paragraph element, each followed by a newline.
pub fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };

    let mut content = String::new();
    for element in document.select(&selector) {
        content.extend(element.text());
        content.push('\n');
    }
    content
}

/// Raw `/train` input. Empty strings count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingInput {
    pub article: Option<String>,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ContentSource<'a> {
    Url(&'a str),
    Article(&'a str),
}

impl TrainingInput {
    fn source(&self) -> Option<ContentSource<'_>> {
        if let Some(url) = non_empty(&self.url) {
            return Some(ContentSource::Url(url));
        }
        non_empty(&self.article).map(ContentSource::Article)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestOutcome {
    pub user_id: UserId,
    pub record: TrainingRecord,
    pub summary: String,
}

pub struct ArticleIngestor {
    records: Arc<dyn TrainingRecordRepository>,
    fetcher: Arc<dyn ArticleFetcher>,
}

impl ArticleIngestor {
    pub fn new(
        records: Arc<dyn TrainingRecordRepository>,
        fetcher: Arc<dyn ArticleFetcher>,
    ) -> Self {
        Self { records, fetcher }
    }

    pub async fn ingest(&self, input: &TrainingInput) -> Result<IngestOutcome, ApplicationError> {
        let content = match input.source() {
            Some(ContentSource::Url(url)) => self.scrape(url).await?,
            Some(ContentSource::Article(article)) => article.to_owned(),
            None => return Err(ApplicationError::InvalidInput(MISSING_INPUT_MESSAGE.to_owned())),
        };

        let summary = article_summary(&content);
        let record = TrainingRecord::article(content);

        self.records
            .put(record.clone())
            .await
            .map_err(|error| ApplicationError::StoreUnavailable(error.to_string()))?;

        info!(
            event_name = "agent.ingest.stored",
            user_id = %record.user_id.0,
            question_id = %record.question_id.0,
            content_chars = record.answer.chars().count(),
            "training article stored"
        );

        Ok(IngestOutcome { user_id: record.user_id.clone(), record, summary })
    }

    async fn scrape(&self, url: &str) -> Result<String, ApplicationError> {
        debug!(event_name = "agent.ingest.fetch", url, "fetching article page");
        let html = self
            .fetcher
            .fetch_html(url)
            .await
            .map_err(|error| ApplicationError::FetchFailed(error.to_string()))?;

        let content = extract_paragraph_text(&html);
        if content.is_empty() {
            return Err(ApplicationError::ExtractionFailed(EXTRACTION_FAILED_MESSAGE.to_owned()));
        }
        Ok(content)
    }
}
