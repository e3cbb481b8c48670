//! Request Dispatcher - Fire-and-Forget Load Generation
//!
//! **Core Responsibility:**
//! Post job payloads to the compile service as concurrent, independent requests.
//!
//! **Properties:**
//! - One tokio task per request, spawned through a single `dispatch` entry point
//! - In-flight requests bounded by a semaphore sized to the configured concurrency
//! - Spawning never blocks: tasks wait for their permit after they start
//! - Responses are never inspected; failures are logged at debug and dropped
//! - `drain` waits for stragglers so the process does not exit mid-request

use anyhow::{Context, Result};
use injector_common::config::InjectorConfig;
use injector_common::types::CompileRequest;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of a complete load run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Requests actually handed to the HTTP client
    pub attempted: usize,
    pub elapsed: Duration,
}

/// Headers sent with every request
pub fn request_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
    headers
}

pub struct Dispatcher {
    client: reqwest::Client,
    target_url: Arc<str>,
    limiter: Arc<Semaphore>,
    attempted: Arc<AtomicUsize>,
    tasks: JoinSet<()>,
    started: Instant,
}

impl Dispatcher {
    pub fn new(target_url: &str, concurrency: usize) -> Result<Self> {
        // No client-side timeout: timeLimit is for the server to enforce
        let client = reqwest::Client::builder()
            .default_headers(request_headers())
            .pool_max_idle_per_host(concurrency)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            target_url: Arc::from(target_url),
            limiter: Arc::new(Semaphore::new(concurrency)),
            attempted: Arc::new(AtomicUsize::new(0)),
            tasks: JoinSet::new(),
            started: Instant::now(),
        })
    }

    /// Tasks spawned but not yet reaped
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Release finished tasks so retained state tracks in-flight work, not run length
    fn reap_finished(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                warn!(error = %e, "Request task did not complete");
            }
        }
    }

    /// Spawn one task that posts `payload` once and discards the response
    pub fn dispatch(&mut self, payload: Arc<CompileRequest>) {
        self.reap_finished();

        let client = self.client.clone();
        let url = self.target_url.clone();
        let limiter = self.limiter.clone();
        let attempted = self.attempted.clone();

        self.tasks.spawn(async move {
            // Semaphore is never closed while the dispatcher is alive
            let Ok(_permit) = limiter.acquire_owned().await else {
                return;
            };

            attempted.fetch_add(1, Ordering::Relaxed);
            match client.post(&*url).json(&*payload).send().await {
                Ok(response) => {
                    debug!(
                        language = %payload.language,
                        status = response.status().as_u16(),
                        "Request completed"
                    );
                }
                Err(e) => {
                    debug!(language = %payload.language, error = %e, "Request failed");
                }
            }
        });
    }

    /// Wait for every spawned request and report totals
    pub async fn drain(mut self) -> DispatchReport {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Request task did not complete");
            }
        }

        DispatchReport {
            attempted: self.attempted.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

/// Run the load profile: `iterations` rounds, one request per payload per round.
/// Rounds do not wait on each other; only the final drain does.
pub async fn run(config: &InjectorConfig, payloads: Vec<CompileRequest>) -> Result<DispatchReport> {
    let payloads: Vec<Arc<CompileRequest>> = payloads.into_iter().map(Arc::new).collect();
    let mut dispatcher = Dispatcher::new(&config.target_url, config.concurrency)?;

    for iteration in 1..=config.iterations {
        info!(
            iteration,
            of = config.iterations,
            requests = payloads.len(),
            "Dispatching iteration"
        );
        for payload in &payloads {
            dispatcher.dispatch(payload.clone());
        }
    }

    let report = dispatcher.drain().await;
    info!(
        attempted = report.attempted,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Load run finished"
    );
    Ok(report)
}
