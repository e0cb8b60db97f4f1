pub mod cli;
pub mod config;
pub mod export;
pub mod fetcher;
pub mod harvester;
pub mod logging;
pub mod models;
pub mod network;
pub mod parser;
pub mod pipeline;
pub mod queries;
pub mod registry;
pub mod retry;

// Re-export main types for library usage
pub use config::{Config, HarvestConfig};
pub use export::{export_to_file, write_feed, ExportError, JobKind};
pub use fetcher::{DescriptionFetcher, FetchOutcome, FetchRound};
pub use harvester::{HarvestSummary, SearchHarvester};
pub use models::{ParseResult, SkipReason, VacancyRecord};
pub use network::{FetchError, FetchResult, HttpClient, Transport};
pub use pipeline::{Pipeline, PipelineError, RunReport};
pub use queries::{generate_queries, QuerySpec, Shard};
pub use registry::Registry;
pub use retry::{run_rounds, RetryReport, RoundState};
