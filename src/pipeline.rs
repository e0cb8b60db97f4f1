//! One harvesting run: search → registry → descriptions (with retry rounds) → feed.
//!
//! Every failure short of writing the output document is logged and absorbed;
//! an unreachable search API still yields an (empty) feed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::HarvestConfig;
use crate::export::{export_to_file, ExportError};
use crate::fetcher::DescriptionFetcher;
use crate::harvester::SearchHarvester;
use crate::network::{FetchError, HttpClient, Transport};
use crate::queries::{generate_queries, QuerySpec};
use crate::registry::Registry;
use crate::retry::run_rounds;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] FetchError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub queries: usize,
    pub failed_queries: usize,
    pub vacancies: usize,
    pub described: usize,
    pub unresolved: usize,
    pub rounds: u32,
    pub duration_secs: u64,
    pub output_path: PathBuf,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Queries: {} ({} failed) | Vacancies: {} ({} described, {} unresolved after {} rounds) | {}s -> {}",
            self.queries,
            self.failed_queries,
            self.vacancies,
            self.described,
            self.unresolved,
            self.rounds,
            self.duration_secs,
            self.output_path.display()
        )
    }
}

pub struct Pipeline {
    config: HarvestConfig,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Build a pipeline backed by a real HTTP client
    pub fn new(config: HarvestConfig) -> Result<Self, PipelineError> {
        let http = HttpClient::new(config.timeout_secs, config.verify_tls)?;
        Ok(Self::with_transport(config, Arc::new(http)))
    }

    pub fn with_transport(config: HarvestConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Run over the full fixed query set
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        self.run_queries(&generate_queries()).await
    }

    #[tracing::instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn run_queries(&self, queries: &[QuerySpec]) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        let mut registry = Registry::new();

        let harvester = SearchHarvester::new(
            Arc::clone(&self.transport),
            self.config.search_url.clone(),
            self.config.site_base_url.clone(),
            self.config.attempts,
        );
        let summary = harvester.harvest_all(&mut registry, queries).await;
        tracing::info!(vacancies = registry.len(), "main urls collected");

        let fetcher = DescriptionFetcher::new(
            Arc::clone(&self.transport),
            self.config.workers,
            self.config.batch_size,
        );
        let urls = registry.detail_urls();
        let retry = run_rounds(&fetcher, &mut registry, urls, self.config.attempts).await;

        let output_path = export_to_file(&registry, &self.config.output_path)?;

        let report = RunReport {
            queries: summary.queries,
            failed_queries: summary.failed_queries,
            vacancies: registry.len(),
            described: registry.described(),
            unresolved: retry.unresolved.len(),
            rounds: retry.rounds,
            duration_secs: started.elapsed().as_secs(),
            output_path,
        };
        tracing::info!(%report, "run finished");
        Ok(report)
    }
}
