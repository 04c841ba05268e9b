// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! One-shot handoff of a crawl job's outcome from the engine thread to
//! whichever task awaits it.
//!
//! The engine resolves a [`Completer`] exactly once; the caller awaits the
//! matching [`JobHandle`]. Dropping a handle does not cancel the job.

use crate::models::crawler::{CrawlError, PageMap};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::warn;
use uuid::Uuid;

pub type JobOutcome = Result<PageMap, CrawlError>;

/// Create a linked completer/handle pair for one job.
pub fn channel(job_id: Uuid) -> (Completer, JobHandle) {
    let (sender, receiver) = oneshot::channel();
    (
        Completer { job_id, sender },
        JobHandle {
            job_id,
            outcome: receiver,
        },
    )
}

/// Producer side, owned by the engine while the job runs.
#[derive(Debug)]
pub struct Completer {
    job_id: Uuid,
    sender: oneshot::Sender<JobOutcome>,
}

impl Completer {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Deliver the outcome. Consumes the completer so it can only happen once.
    pub fn resolve(self, outcome: JobOutcome) {
        if self.sender.send(outcome).is_err() {
            warn!(job_id = %self.job_id, "crawl job finished but nobody is waiting for it");
        }
    }
}

/// Awaitable result of a submitted crawl job.
#[derive(Debug)]
pub struct JobHandle {
    job_id: Uuid,
    outcome: oneshot::Receiver<JobOutcome>,
}

impl JobHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Wait for the job to finish.
    pub async fn wait(self) -> JobOutcome {
        self.await
    }
}

impl Future for JobHandle {
    type Output = JobOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let job_id = self.job_id;
        Pin::new(&mut self.outcome)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(CrawlError::Aborted { job_id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[tokio::test]
    async fn test_resolves_with_success() {
        let (completer, handle) = channel(Uuid::now_v7());
        let mut pages = PageMap::new();
        pages.insert("https://a.example/".to_string(), "text".to_string());

        completer.resolve(Ok(pages.clone()));

        assert_eq!(handle.await.unwrap(), pages);
    }

    #[tokio::test]
    async fn test_resolves_with_error() {
        let job_id = Uuid::now_v7();
        let (completer, handle) = channel(job_id);

        completer.resolve(Err(CrawlError::EngineUnavailable));

        assert!(matches!(handle.wait().await, Err(CrawlError::EngineUnavailable)));
    }

    #[tokio::test]
    async fn test_dropped_completer_aborts() {
        let job_id = Uuid::now_v7();
        let (completer, handle) = channel(job_id);

        drop(completer);

        match handle.await {
            Err(CrawlError::Aborted { job_id: id }) => assert_eq!(id, job_id),
            other => panic!("expected Aborted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolves_from_another_thread() {
        let (completer, handle) = channel(Uuid::now_v7());
        assert_eq!(completer.job_id(), handle.job_id());

        thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(20));
            completer.resolve(Ok(PageMap::new()));
        });

        assert!(handle.await.unwrap().is_empty());
    }

    #[test]
    fn test_resolve_without_waiter_does_not_panic() {
        let (completer, handle) = channel(Uuid::now_v7());
        drop(handle);
        completer.resolve(Ok(PageMap::new()));
    }
}
