// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Long-lived crawl engine.
//!
//! The engine owns one background thread running a current-thread tokio
//! runtime with a `LocalSet`. Callers never touch that loop directly: jobs are
//! handed over through an unbounded channel and their outcome comes back
//! through a [`JobHandle`]. The loop is started lazily on first use and a
//! dead loop is replaced on the next call to [`CrawlEngine::ensure_started`].

use crate::models::crawler::{CrawlError, CrawlRequest, PageMap};
use crate::services::completion::{self, Completer, JobHandle};
use crate::services::crawl_job::CrawlJob;
use crate::services::page_processor::{PageProcessor, DEFAULT_MAX_BODY_BYTES};
use anyhow::{bail, Context, Result};
use std::env;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::LocalSet;
use tracing::{debug, error, info};

const ENGINE_THREAD_NAME: &str = "crawl-engine";

/// Configuration for the crawl engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single page fetch, body included
    pub fetch_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Pages of one job fetched at the same time
    pub page_concurrency: usize,
    /// Optional limit on a whole job. Off unless configured.
    pub job_timeout: Option<Duration>,
    /// Responses larger than this fail as a fetch error
    pub max_body_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("autoposter-agent/{}", env!("AUTOPOSTER_VERSION")),
            page_concurrency: 8,
            job_timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let fetch_timeout = positive_var("CRAWL_FETCH_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);

        let connect_timeout = positive_var("CRAWL_CONNECT_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let page_concurrency = positive_var("CRAWL_PAGE_CONCURRENCY")?
            .map(usize::try_from)
            .transpose()
            .context("CRAWL_PAGE_CONCURRENCY is too large")?
            .unwrap_or(defaults.page_concurrency);

        let job_timeout = positive_var("CRAWL_JOB_TIMEOUT_SECS")?.map(Duration::from_secs);

        let max_body_bytes = positive_var("CRAWL_MAX_BODY_BYTES")?
            .map(usize::try_from)
            .transpose()
            .context("CRAWL_MAX_BODY_BYTES is too large")?
            .unwrap_or(defaults.max_body_bytes);

        Ok(Self {
            fetch_timeout,
            connect_timeout,
            user_agent: env::var("CRAWL_USER_AGENT").unwrap_or(defaults.user_agent),
            page_concurrency,
            job_timeout,
            max_body_bytes,
        })
    }
}

/// Read `name` as a number above zero, or `None` when unset.
fn positive_var(name: &str) -> Result<Option<u64>> {
    env::var(name)
        .ok()
        .map(|value| parse_positive(name, &value))
        .transpose()
}

fn parse_positive(name: &str, value: &str) -> Result<u64> {
    let parsed: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a number"))?;
    if parsed == 0 {
        bail!("{name} must be greater than zero");
    }
    Ok(parsed)
}

/// A job on its way to the engine loop.
struct Submission {
    job: CrawlJob,
    completer: Completer,
}

/// Caller-side view of a running loop.
struct EngineLoop {
    sender: mpsc::UnboundedSender<Submission>,
    thread: thread::JoinHandle<()>,
}

impl EngineLoop {
    fn is_alive(&self) -> bool {
        !self.sender.is_closed() && !self.thread.is_finished()
    }
}

/// Process-wide crawl engine. Build one at startup and share it.
pub struct CrawlEngine {
    config: EngineConfig,
    processor: PageProcessor,
    running: Mutex<Option<EngineLoop>>,
    loop_starts: AtomicUsize,
}

impl CrawlEngine {
    /// Create the engine. The background loop is not started yet.
    pub fn new(config: EngineConfig) -> Result<Self, CrawlError> {
        let processor = PageProcessor::new(
            config.fetch_timeout,
            config.connect_timeout,
            &config.user_agent,
        )?
        .with_max_body_bytes(config.max_body_bytes);

        Ok(Self {
            config,
            processor,
            running: Mutex::new(None),
            loop_starts: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of loops started over the engine's lifetime.
    pub fn loop_starts(&self) -> usize {
        self.loop_starts.load(Ordering::SeqCst)
    }

    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(EngineLoop::is_alive)
    }

    /// Start the background loop unless a live one already exists.
    pub async fn ensure_started(&self) -> Result<(), CrawlError> {
        self.dispatcher().await.map(|_| ())
    }

    /// Hand a request to the engine loop and return a handle to its outcome.
    pub async fn submit(&self, request: CrawlRequest) -> Result<JobHandle, CrawlError> {
        request.validate()?;

        let sender = self.dispatcher().await?;
        let job = CrawlJob::new(request.urls);
        let (completer, handle) = completion::channel(job.id());
        debug!(job_id = %job.id(), urls = job.urls().len(), "submitting crawl job");

        sender
            .send(Submission { job, completer })
            .map_err(|_| CrawlError::EngineUnavailable)?;

        Ok(handle)
    }

    /// Submit a request and wait for its pages.
    pub async fn crawl(&self, request: CrawlRequest) -> Result<PageMap, CrawlError> {
        self.submit(request).await?.await
    }

    /// Sender of the live loop, starting one first if needed.
    async fn dispatcher(&self) -> Result<mpsc::UnboundedSender<Submission>, CrawlError> {
        let mut running = self.running.lock().await;

        if let Some(engine_loop) = running.as_ref() {
            if engine_loop.is_alive() {
                return Ok(engine_loop.sender.clone());
            }
            info!("crawl engine loop has stopped, starting a new one");
        }

        let engine_loop = self.start_loop().await?;
        let sender = engine_loop.sender.clone();
        *running = Some(engine_loop);
        Ok(sender)
    }

    async fn start_loop(&self) -> Result<EngineLoop, CrawlError> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let processor = self.processor.clone();
        let concurrency = self.config.page_concurrency;
        let job_timeout = self.config.job_timeout;

        let thread = thread::Builder::new()
            .name(ENGINE_THREAD_NAME.to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };

                let local = LocalSet::new();
                local.spawn_local(dispatch_loop(
                    receiver,
                    Rc::new(processor),
                    concurrency,
                    job_timeout,
                ));
                let _ = ready_tx.send(Ok(()));

                // Runs until the queue closes and every job has finished.
                runtime.block_on(local);
                debug!("crawl engine loop exited");
            })
            .map_err(|e| CrawlError::StartupFailure(format!("failed to spawn thread: {e}")))?;

        match ready_rx.await {
            Ok(Ok(())) => {
                let starts = self.loop_starts.fetch_add(1, Ordering::SeqCst) + 1;
                info!(starts, "crawl engine loop started");
                Ok(EngineLoop { sender, thread })
            }
            Ok(Err(reason)) => {
                error!(%reason, "crawl engine runtime failed to build");
                Err(CrawlError::StartupFailure(reason))
            }
            Err(_) => Err(CrawlError::StartupFailure(
                "engine thread exited before it was ready".to_string(),
            )),
        }
    }
}

/// Receive submissions and run each one as a local task.
async fn dispatch_loop(
    mut receiver: mpsc::UnboundedReceiver<Submission>,
    processor: Rc<PageProcessor>,
    concurrency: usize,
    job_timeout: Option<Duration>,
) {
    while let Some(Submission { job, completer }) = receiver.recv().await {
        let processor = Rc::clone(&processor);
        tokio::task::spawn_local(async move {
            #[cfg(test)]
            tests::record_job_thread(job.id());

            let job = execute(job, &processor, concurrency, job_timeout).await;
            completer.resolve(job.into_outcome());
        });
    }
}

async fn execute(
    mut job: CrawlJob,
    processor: &PageProcessor,
    concurrency: usize,
    job_timeout: Option<Duration>,
) -> CrawlJob {
    match job_timeout {
        Some(timeout) => {
            if tokio::time::timeout(timeout, job.run(processor, concurrency))
                .await
                .is_err()
            {
                let job_id = job.id();
                job.fail(CrawlError::JobTimeout { job_id, timeout });
            }
        }
        None => job.run(processor, concurrency).await,
    }
    job
}
