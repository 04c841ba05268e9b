// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Extracted page text keyed by the URL as it was submitted.
pub type PageMap = HashMap<String, String>;

/// Request to crawl a batch of URLs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CrawlRequest {
    /// URLs to fetch, in submission order. Duplicates are fetched again.
    pub urls: Vec<String>,
}

impl CrawlRequest {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Reject empty batches and anything that is not an absolute URL with a host.
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.urls.is_empty() {
            return Err(CrawlError::InvalidRequest(
                "at least one URL is required".to_string(),
            ));
        }

        for raw in &self.urls {
            let parsed = url::Url::parse(raw)
                .map_err(|e| CrawlError::InvalidRequest(format!("invalid URL '{raw}': {e}")))?;
            if parsed.host_str().is_none() {
                return Err(CrawlError::InvalidRequest(format!(
                    "URL '{raw}' has no host"
                )));
            }
        }

        Ok(())
    }
}

/// Successful `/scrape` response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScrapeResponse {
    pub data: PageMap,
}

/// Lifecycle of a crawl job. Once it leaves `Pending` it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Everything that can go wrong between submitting URLs and receiving text.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to start crawl engine: {0}")]
    StartupFailure(String),

    #[error("crawl engine is not accepting jobs")]
    EngineUnavailable,

    #[error("invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("failed to parse {url}: {reason}")]
    ParseFailure { url: String, reason: String },

    #[error("crawl job {job_id} failed: {source}")]
    JobFailure {
        job_id: Uuid,
        #[source]
        source: Box<CrawlError>,
    },

    #[error("crawl job {job_id} timed out after {timeout:?}")]
    JobTimeout { job_id: Uuid, timeout: Duration },

    #[error("crawl job {job_id} was dropped before it completed")]
    Aborted { job_id: Uuid },
}

impl CrawlError {
    /// True for failures of a single page, as opposed to the engine or the job.
    pub fn is_page_error(&self) -> bool {
        matches!(
            self,
            CrawlError::FetchFailure { .. } | CrawlError::ParseFailure { .. }
        )
    }

    /// The page-level failure behind a `JobFailure`, if any.
    pub fn page_error(&self) -> Option<&CrawlError> {
        match self {
            CrawlError::JobFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}
