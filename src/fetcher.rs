//! Concurrent detail-page fetching.
//!
//! URLs are processed in batches of at most `batch_size`. Inside a batch a
//! semaphore of `workers` permits caps the number of requests in flight; a
//! permit is taken before a task is spawned and released when it finishes.
//! Outcomes are reconciled on the calling task once the whole batch settles.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::{ParseResult, SkipReason};
use crate::network::{FetchError, Transport};
use crate::parser::{extract_description, job_id_from_url};
use crate::registry::Registry;

/// Called for every request that fails at the transport level.
pub type ErrorHandler = Arc<dyn Fn(&str, &FetchError) + Send + Sync>;

/// Per-URL result of one detail fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page fetched and description extracted
    Success { job_id: String, description: String },
    /// Non-200 status, transport error or lost task; eligible for retry
    Failed { url: String },
    /// Page fetched but unusable; not retried
    Skipped { url: String, reason: SkipReason },
}

/// Aggregated result of one pass over a URL list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRound {
    pub updates: Vec<(String, String)>,
    pub failures: Vec<String>,
    pub skipped: usize,
}

impl FetchRound {
    fn absorb(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Success {
                job_id,
                description,
            } => self.updates.push((job_id, description)),
            FetchOutcome::Failed { url } => self.failures.push(url),
            FetchOutcome::Skipped { url, reason } => {
                tracing::info!(url = %url, reason = %reason, "detail page skipped");
                self.skipped += 1;
            }
        }
    }

    /// Write successful descriptions into the registry. Returns how many landed.
    pub fn apply_to(&self, registry: &mut Registry) -> usize {
        let mut applied = 0;
        for (job_id, text) in &self.updates {
            if registry.set_description(job_id, text.clone()) {
                applied += 1;
            }
        }
        applied
    }
}

fn log_request_failure(url: &str, error: &FetchError) {
    tracing::info!(url = %url, error = %error, "request failed");
}

pub struct DescriptionFetcher {
    transport: Arc<dyn Transport>,
    workers: usize,
    batch_size: usize,
    on_error: ErrorHandler,
}

impl DescriptionFetcher {
    pub fn new(transport: Arc<dyn Transport>, workers: usize, batch_size: usize) -> Self {
        Self {
            transport,
            workers: workers.max(1),
            batch_size: batch_size.max(1),
            on_error: Arc::new(log_request_failure),
        }
    }

    /// Replace the default transport-error logger
    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.on_error = handler;
        self
    }

    /// Fetch every URL once and collect the outcomes.
    #[tracing::instrument(skip(self, urls), fields(urls = urls.len()))]
    pub async fn fetch_descriptions(&self, urls: &[String]) -> FetchRound {
        let mut round = FetchRound::default();

        for (index, batch) in urls.chunks(self.batch_size).enumerate() {
            tracing::debug!(batch = index, size = batch.len(), "dispatching batch");
            for outcome in self.fetch_batch(batch).await {
                round.absorb(outcome);
            }
        }

        tracing::info!(
            fetched = round.updates.len(),
            failed = round.failures.len(),
            skipped = round.skipped,
            "description pass finished"
        );
        round
    }

    /// Fetch, write results into the registry and return the URLs worth retrying.
    pub async fn fetch_into(&self, registry: &mut Registry, urls: &[String]) -> Vec<String> {
        let round = self.fetch_descriptions(urls).await;
        round.apply_to(registry);
        round.failures
    }

    /// Run one batch to completion. Outcomes come back in input order.
    async fn fetch_batch(&self, batch: &[String]) -> Vec<FetchOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (position, url) in batch.iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "worker pool closed");
                    break;
                }
            };
            let transport = Arc::clone(&self.transport);
            let on_error = Arc::clone(&self.on_error);
            let url = url.clone();

            tasks.spawn(async move {
                let outcome = fetch_one(transport.as_ref(), &url, on_error.as_ref()).await;
                drop(permit);
                (position, outcome)
            });
        }

        let mut slots: Vec<Option<FetchOutcome>> = vec![None; batch.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, outcome)) => slots[position] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "fetch task aborted"),
            }
        }

        // A slot left empty belongs to a task that never reported; retry it.
        slots
            .into_iter()
            .zip(batch)
            .map(|(slot, url)| slot.unwrap_or_else(|| FetchOutcome::Failed { url: url.clone() }))
            .collect()
    }
}

async fn fetch_one(
    transport: &dyn Transport,
    url: &str,
    on_error: &(dyn Fn(&str, &FetchError) + Send + Sync),
) -> FetchOutcome {
    let response = match transport.get(url).await {
        Ok(response) => response,
        Err(e) => {
            on_error(url, &e);
            return FetchOutcome::Failed {
                url: url.to_string(),
            };
        }
    };

    if !response.is_success() {
        tracing::debug!(url = %url, status = response.status_code, "detail page not available");
        return FetchOutcome::Failed {
            url: url.to_string(),
        };
    }

    let Some(job_id) = job_id_from_url(url) else {
        return FetchOutcome::Skipped {
            url: url.to_string(),
            reason: SkipReason::MissingJobId(url.to_string()),
        };
    };

    match extract_description(&response.content) {
        ParseResult::Ok(description) => FetchOutcome::Success {
            job_id,
            description,
        },
        ParseResult::Skip(reason) => FetchOutcome::Skipped {
            url: url.to_string(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VacancyRecord;
    use crate::network::FetchResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn page(text: &str) -> String {
        format!(
            "<html><body><div class=\"box-spacing-md\"><div class=\"col-sm-4\">x</div><div class=\"col-sm-8\">{}</div></div></body></html>",
            text
        )
    }

    fn detail_url(id: usize) -> String {
        format!("https://site.test/job-detail.html?jobId={}", id)
    }

    /// Serves a description for every job id, failing ids divisible by `fail_every`.
    struct PagesWithGaps {
        fail_every: usize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl PagesWithGaps {
        fn new(fail_every: usize) -> Self {
            Self {
                fail_every,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for PagesWithGaps {
        async fn get(&self, url: &str) -> Result<FetchResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let id: usize = job_id_from_url(url).and_then(|id| id.parse().ok()).unwrap_or(1);
            if self.fail_every > 0 && id % self.fail_every == 0 {
                return Ok(FetchResult {
                    status_code: 503,
                    content: String::new(),
                    final_url: url.to_string(),
                });
            }
            Ok(FetchResult {
                status_code: 200,
                content: page(&format!("Beschreibung {}", id)),
                final_url: url.to_string(),
            })
        }

        async fn post_form(&self, _url: &str, _form: &[(&str, &str)]) -> Result<FetchResult, FetchError> {
            unreachable!("fetcher only gets")
        }
    }

    struct Refused;

    #[async_trait]
    impl Transport for Refused {
        async fn get(&self, _url: &str) -> Result<FetchResult, FetchError> {
            Err(FetchError::ConnectionRefused)
        }

        async fn post_form(&self, _url: &str, _form: &[(&str, &str)]) -> Result<FetchResult, FetchError> {
            Err(FetchError::ConnectionRefused)
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_worker_width() {
        let transport = Arc::new(PagesWithGaps::new(0));
        let fetcher = DescriptionFetcher::new(transport.clone(), 30, 100);
        let urls: Vec<String> = (1..=250).map(detail_url).collect();

        let round = fetcher.fetch_descriptions(&urls).await;

        assert_eq!(round.updates.len(), 250);
        assert!(round.failures.is_empty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 250);
        let peak = transport.peak.load(Ordering::SeqCst);
        assert!(peak <= 30, "peak concurrency was {}", peak);
        assert!(peak > 1, "requests never overlapped");
    }

    #[tokio::test]
    async fn test_failures_returned_in_input_order() {
        let fetcher = DescriptionFetcher::new(Arc::new(PagesWithGaps::new(4)), 8, 5);
        let urls: Vec<String> = (1..=12).map(detail_url).collect();

        let round = fetcher.fetch_descriptions(&urls).await;

        assert_eq!(round.failures, vec![detail_url(4), detail_url(8), detail_url(12)]);
        assert_eq!(round.updates.len(), 9);
        assert_eq!(round.updates[0], ("1".to_string(), "Beschreibung 1".to_string()));
    }

    #[tokio::test]
    async fn test_transport_errors_reach_handler_and_are_retryable() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let fetcher = DescriptionFetcher::new(Arc::new(Refused), 4, 10)
            .with_error_handler(Arc::new(move |_url: &str, _e: &FetchError| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        let urls: Vec<String> = (1..=3).map(detail_url).collect();

        let round = fetcher.fetch_descriptions(&urls).await;

        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert_eq!(round.failures, urls);
        assert!(round.updates.is_empty());
    }

    #[tokio::test]
    async fn test_unusable_pages_are_skipped_not_retried() {
        struct Blank;

        #[async_trait]
        impl Transport for Blank {
            async fn get(&self, url: &str) -> Result<FetchResult, FetchError> {
                Ok(FetchResult {
                    status_code: 200,
                    content: "<html><body>Wartungsarbeiten</body></html>".to_string(),
                    final_url: url.to_string(),
                })
            }

            async fn post_form(&self, _url: &str, _form: &[(&str, &str)]) -> Result<FetchResult, FetchError> {
                unreachable!()
            }
        }

        let fetcher = DescriptionFetcher::new(Arc::new(Blank), 4, 10);
        let urls = vec![detail_url(1), "https://site.test/job-detail.html".to_string()];

        let round = fetcher.fetch_descriptions(&urls).await;

        assert_eq!(round.skipped, 2);
        assert!(round.failures.is_empty());
        assert!(round.updates.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_into_updates_registry() {
        let mut registry = Registry::new();
        for id in 1..=5 {
            registry.upsert(VacancyRecord {
                job_id: id.to_string(),
                detail_url: detail_url(id),
                title_raw: "Crew (Vollzeit)".to_string(),
                ..Default::default()
            });
        }
        let fetcher = DescriptionFetcher::new(Arc::new(PagesWithGaps::new(5)), 2, 2);

        let urls = registry.detail_urls();
        let failures = fetcher.fetch_into(&mut registry, &urls).await;

        assert_eq!(failures, vec![detail_url(5)]);
        assert_eq!(registry.get("3").unwrap().description, "Beschreibung 3");
        assert_eq!(registry.get("5").unwrap().description, "");
        assert_eq!(registry.described(), 4);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let fetcher = DescriptionFetcher::new(Arc::new(Refused), 30, 100);
        assert_eq!(fetcher.fetch_descriptions(&[]).await, FetchRound::default());
    }
}
