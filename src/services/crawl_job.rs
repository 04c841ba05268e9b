// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::crawler::{CrawlError, JobStatus, PageMap};
use crate::services::page_processor::PageProcessor;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// One execution of a batch of URLs.
///
/// A job is mutated only by the task that runs it. After `run` returns it is
/// terminal and only its outcome can be taken out.
#[derive(Debug)]
pub struct CrawlJob {
    id: Uuid,
    urls: Vec<String>,
    results: PageMap,
    status: JobStatus,
    error: Option<CrawlError>,
}

impl CrawlJob {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            urls,
            results: PageMap::new(),
            status: JobStatus::Pending,
            error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Pages finished so far. Always empty once the job has failed.
    pub fn results(&self) -> &PageMap {
        &self.results
    }

    pub fn error(&self) -> Option<&CrawlError> {
        self.error.as_ref()
    }

    /// Process every URL with at most `concurrency` pages in flight.
    ///
    /// The first page error fails the whole job: pages still in flight are
    /// dropped and results already collected are discarded.
    pub async fn run(&mut self, processor: &PageProcessor, concurrency: usize) {
        if self.status != JobStatus::Pending {
            return;
        }

        let started = Instant::now();
        let mut pages = stream::iter(self.urls.clone())
            .map(move |url| async move {
                let outcome = processor.process(&url).await;
                (url, outcome)
            })
            .buffer_unordered(concurrency.max(1));

        while let Some((url, outcome)) = pages.next().await {
            match outcome {
                Ok(text) => {
                    self.results.insert(url, text);
                }
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        }

        self.status = JobStatus::Succeeded;
        info!(
            job_id = %self.id,
            pages = self.results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl job succeeded"
        );
    }

    /// Mark the job failed. Page-level errors are wrapped in `JobFailure`.
    pub fn fail(&mut self, err: CrawlError) {
        if self.status != JobStatus::Pending {
            return;
        }

        let error = if err.is_page_error() {
            CrawlError::JobFailure {
                job_id: self.id,
                source: Box::new(err),
            }
        } else {
            err
        };

        warn!(
            job_id = %self.id,
            discarded = self.results.len(),
            error = %error,
            "crawl job failed"
        );

        self.results.clear();
        self.status = JobStatus::Failed;
        self.error = Some(error);
    }

    /// Consume a finished job into what the caller receives.
    pub fn into_outcome(self) -> Result<PageMap, CrawlError> {
        match self.status {
            JobStatus::Succeeded => Ok(self.results),
            JobStatus::Failed => Err(self
                .error
                .unwrap_or(CrawlError::Aborted { job_id: self.id })),
            JobStatus::Pending => Err(CrawlError::Aborted { job_id: self.id }),
        }
    }
}
