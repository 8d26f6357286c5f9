use std::sync::Mutex;

use super::submission::Submission;
use crate::{error::ExportError, settings::SinkSettings};

/// The default client useragent for submissions
static USERAGENT: &str = concat!("radar/", env!("CARGO_PKG_VERSION"));

/// Destination for location-fix submissions.
#[async_trait::async_trait]
pub trait ExportSink: Send + Sync + 'static {
    async fn submit(&self, submission: &Submission) -> Result<(), ExportError>;
}

/// Posts each submission as JSON to a geolocation API.
#[derive(Clone, Debug)]
pub struct HttpSink {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpSink {
    pub fn new(settings: &SinkSettings) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(USERAGENT)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            url: settings.url.clone(),
            token: settings.token.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ExportSink for HttpSink {
    async fn submit(&self, submission: &Submission) -> Result<(), ExportError> {
        let mut request = self.client.post(&self.url).json(submission);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            status => Err(ExportError::Rejected {
                status,
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Logs submissions instead of sending them anywhere.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

#[async_trait::async_trait]
impl ExportSink for LogSink {
    async fn submit(&self, submission: &Submission) -> Result<(), ExportError> {
        tracing::info!(
            timestamp = submission.timestamp,
            fixes = submission.gps.len(),
            cells = submission.cells.len(),
            wifi = submission.wifi.len(),
            "submission"
        );
        tracing::debug!(
            "{}",
            serde_json::to_string(submission).unwrap_or_default()
        );
        Ok(())
    }
}

/// Collects submissions in memory. Can be told to fail a number of calls.
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<MemorySinkInner>,
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    submissions: Vec<Submission>,
    failures: usize,
}

impl MemorySink {
    fn lock(&self) -> std::sync::MutexGuard<'_, MemorySinkInner> {
        match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }

    /// Fail the next `count` submissions.
    pub fn fail_next(&self, count: usize) {
        self.lock().failures = count;
    }
}

#[async_trait::async_trait]
impl ExportSink for MemorySink {
    async fn submit(&self, submission: &Submission) -> Result<(), ExportError> {
        let mut inner = self.lock();
        if inner.failures > 0 {
            inner.failures -= 1;
            return Err(ExportError::Unavailable("memory sink failure".to_string()));
        }
        inner.submissions.push(submission.clone());
        Ok(())
    }
}
