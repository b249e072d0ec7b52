use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{HarvestError, Result};
use crate::types::{RepoPage, StarRecord};

/// One paginated request against the remote search interface.
#[allow(async_fn_in_trait)]
pub trait PageFetch {
    async fn fetch_page(&self, after: Option<&str>, page_size: u32) -> Result<RepoPage>;
}

/// Merges a batch of observations into durable storage. The batch must be
/// durable when this returns, so the driver can safely advance the cursor.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    async fn upsert_batch(&self, records: &[StarRecord]) -> Result<usize>;
}

impl<T: PageFetch> PageFetch for &T {
    async fn fetch_page(&self, after: Option<&str>, page_size: u32) -> Result<RepoPage> {
        (**self).fetch_page(after, page_size).await
    }
}

impl<T: RecordSink> RecordSink for &T {
    async fn upsert_batch(&self, records: &[StarRecord]) -> Result<usize> {
        (**self).upsert_batch(records).await
    }
}

/// Tuning knobs for the pagination loop.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub target_repos: u64,
    pub page_size: u32,
    pub page_delay: Duration,
    pub retry_delay: Duration,
    pub max_fetch_retries: u32,
}

/// How a run ended. Fatal errors are reported through `Result` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    TargetReached { fetched: u64 },
    SourceExhausted { fetched: u64 },
    Cancelled { fetched: u64 },
}

impl HarvestOutcome {
    pub fn fetched(&self) -> u64 {
        match *self {
            HarvestOutcome::TargetReached { fetched }
            | HarvestOutcome::SourceExhausted { fetched }
            | HarvestOutcome::Cancelled { fetched } => fetched,
        }
    }
}

/// Driver states. `RetryWait` always returns to `Fetching` with the cursor
/// that failed, so the page is retried rather than skipped.
#[derive(Debug)]
enum DriverState {
    Fetching,
    RetryWait,
    Done(HarvestOutcome),
    Aborted(HarvestError),
}

/// Walks the paginated search front to back, feeding every page to the
/// sink, until the target count is reached or the source runs dry.
pub struct Harvester<F, S> {
    fetcher: F,
    sink: S,
    config: HarvestConfig,
    shutdown: watch::Receiver<bool>,
}

impl<F: PageFetch, S: RecordSink> Harvester<F, S> {
    pub fn new(fetcher: F, sink: S, config: HarvestConfig, shutdown: watch::Receiver<bool>) -> Self {
        Harvester {
            fetcher,
            sink,
            config,
            shutdown,
        }
    }

    pub async fn run(&mut self) -> Result<HarvestOutcome> {
        let mut cursor: Option<String> = None;
        let mut fetched: u64 = 0;
        let mut attempts: u32 = 0;
        let mut state = DriverState::Fetching;

        loop {
            state = match state {
                DriverState::Fetching => {
                    if *self.shutdown.borrow() {
                        DriverState::Done(HarvestOutcome::Cancelled { fetched })
                    } else {
                        match self
                            .fetcher
                            .fetch_page(cursor.as_deref(), self.config.page_size)
                            .await
                        {
                            Ok(page) => {
                                attempts = 0;
                                self.ingest(page, &mut cursor, &mut fetched).await
                            }
                            Err(err) if err.is_transient() => {
                                attempts += 1;
                                if attempts > self.config.max_fetch_retries {
                                    DriverState::Aborted(HarvestError::FetchFailed(format!(
                                        "giving up after {} failed attempts: {}",
                                        attempts, err
                                    )))
                                } else {
                                    warn!(
                                        attempt = attempts,
                                        max = self.config.max_fetch_retries,
                                        error = %err,
                                        "page fetch failed, backing off"
                                    );
                                    DriverState::RetryWait
                                }
                            }
                            Err(err) => DriverState::Aborted(err),
                        }
                    }
                }
                DriverState::RetryWait => {
                    if self.pause(self.config.retry_delay).await {
                        DriverState::Done(HarvestOutcome::Cancelled { fetched })
                    } else {
                        DriverState::Fetching
                    }
                }
                DriverState::Done(outcome) => {
                    info!(fetched = outcome.fetched(), ?outcome, "harvest finished");
                    return Ok(outcome);
                }
                DriverState::Aborted(err) => return Err(err),
            };
        }
    }

    /// Store one fetched page and decide the next state. The batch is
    /// committed before the cursor advances.
    async fn ingest(
        &mut self,
        page: RepoPage,
        cursor: &mut Option<String>,
        fetched: &mut u64,
    ) -> DriverState {
        let batch = page.records.len() as u64;

        if let Err(err) = self.sink.upsert_batch(&page.records).await {
            return DriverState::Aborted(err);
        }

        *fetched += batch;
        println!("Fetched {}/{} repos", fetched, self.config.target_repos);

        // A short page ends the run even when hasNextPage was still true.
        let short_page = batch < u64::from(self.config.page_size);

        if *fetched >= self.config.target_repos {
            DriverState::Done(HarvestOutcome::TargetReached { fetched: *fetched })
        } else if !page.has_next_page || short_page {
            DriverState::Done(HarvestOutcome::SourceExhausted { fetched: *fetched })
        } else {
            *cursor = page.end_cursor;
            if self.pause(self.config.page_delay).await {
                DriverState::Done(HarvestOutcome::Cancelled { fetched: *fetched })
            } else {
                DriverState::Fetching
            }
        }
    }

    /// Timed pause that ends early when shutdown is signalled. Returns true
    /// if the run should stop.
    async fn pause(&mut self, duration: Duration) -> bool {
        if duration.is_zero() {
            return *self.shutdown.borrow();
        }
        tokio::select! {
            _ = sleep(duration) => *self.shutdown.borrow(),
            _ = self.shutdown.changed() => true,
        }
    }
}
