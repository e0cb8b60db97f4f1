//! Sequential search harvesting: one query in flight at a time, bounded
//! retries per query, results merged into the registry.

use std::sync::Arc;

use crate::models::{parse_search_body, LocationBlock, ParseResult, SkipReason, VacancyRecord};
use crate::network::Transport;
use crate::queries::QuerySpec;
use crate::registry::Registry;

/// Counters for one harvesting pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub queries: usize,
    pub failed_queries: usize,
    pub jobs_merged: usize,
}

pub struct SearchHarvester {
    transport: Arc<dyn Transport>,
    search_url: String,
    site_base_url: String,
    attempts: u32,
}

impl SearchHarvester {
    pub fn new(
        transport: Arc<dyn Transport>,
        search_url: impl Into<String>,
        site_base_url: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            transport,
            search_url: search_url.into(),
            site_base_url: site_base_url.into(),
            attempts: attempts.max(1),
        }
    }

    /// Issue one search query. Non-success statuses and transport errors are
    /// retried with a fresh request up to the attempt ceiling; a body that
    /// does not parse is skipped without retrying, and a single malformed
    /// block only drops that block.
    #[tracing::instrument(skip(self, query), fields(query = %query))]
    pub async fn harvest(&self, query: &QuerySpec) -> ParseResult<Vec<LocationBlock>> {
        let form = query.form_params();
        let mut last_failure = SkipReason::Transport("no attempt made".to_string());

        for attempt in 1..=self.attempts {
            if attempt > 1 {
                tracing::info!(attempt, "retrying search query");
            }

            match self.transport.post_form(&self.search_url, &form).await {
                Ok(response) if response.is_success() => {
                    let parsed = parse_search_body(&response.content);
                    if let ParseResult::Skip(reason) = &parsed {
                        tracing::warn!(
                            url = %response.final_url,
                            status = response.status_code,
                            reason = %reason,
                            "cannot parse search response"
                        );
                    }
                    return parsed;
                }
                Ok(response) => {
                    tracing::debug!(attempt, status = response.status_code, "search returned non-success status");
                    last_failure = SkipReason::Status(response.status_code);
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "search request failed");
                    last_failure = SkipReason::Transport(e.to_string());
                }
            }
        }

        tracing::warn!(attempts = self.attempts, reason = %last_failure, "search query dropped");
        ParseResult::Skip(last_failure)
    }

    /// Merge every job of every block into the registry. Returns the number of jobs merged.
    pub fn merge_blocks(&self, registry: &mut Registry, blocks: &[LocationBlock]) -> usize {
        let mut merged = 0;
        for block in blocks {
            for job in &block.location_jobs {
                registry.upsert(VacancyRecord::from_search(block, job, &self.site_base_url));
                merged += 1;
            }
        }
        tracing::info!(merged, total = registry.len(), "vacancies merged");
        merged
    }

    /// Run every query in order and merge the results.
    pub async fn harvest_all(&self, registry: &mut Registry, queries: &[QuerySpec]) -> HarvestSummary {
        let mut summary = HarvestSummary::default();

        for query in queries {
            summary.queries += 1;
            match self.harvest(query).await {
                ParseResult::Ok(blocks) => {
                    summary.jobs_merged += self.merge_blocks(registry, &blocks);
                }
                ParseResult::Skip(_) => summary.failed_queries += 1,
            }
        }

        tracing::info!(
            queries = summary.queries,
            failed = summary.failed_queries,
            vacancies = registry.len(),
            "search harvesting finished"
        );
        summary
    }
}
