use chrono::DateTime;
use chrono_tz::Europe::Berlin;
use serde::{Deserialize, Deserializer};

/// One vacancy as accumulated during a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VacancyRecord {
    /// Primary key; also present as the `jobId` query parameter of `detail_url`
    pub job_id: String,

    pub location_name: String,
    pub location_city: String,
    pub location_address: String,

    /// Detail page the description is fetched from
    pub detail_url: String,

    /// Title and kind as received, e.g. "Crew Member (Vollzeit)"
    pub title_raw: String,

    /// dd.mm.yyyy or empty
    pub start_date: String,

    /// Empty until the detail page has been fetched
    pub description: String,
}

impl VacancyRecord {
    /// Build a record from one job entry of a search response block
    pub fn from_search(block: &LocationBlock, job: &LocationJob, site_base_url: &str) -> Self {
        Self {
            job_id: job.job_id.clone(),
            location_name: block.location_name.clone(),
            location_city: block.location_address.municipality.clone(),
            location_address: block.location_address.address_line.clone(),
            detail_url: format!("{}{}", site_base_url, job.application_url),
            title_raw: job.label.clone(),
            start_date: format_start_date(job.start_date),
            description: String::new(),
        }
    }
}

/// Location block as returned by the search API. Location fields may be
/// `null` on the wire; they deserialize to empty values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_address: LocationAddress,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_jobs: Vec<LocationJob>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    #[serde(default, deserialize_with = "null_as_default")]
    pub municipality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationJob {
    pub job_id: String,
    pub application_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default)]
    pub start_date: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a search response body block by block.
///
/// A body that is not a JSON array is a `Skip`. Inside the array, a block
/// that does not fit the expected shape is logged and dropped on its own.
pub fn parse_search_body(body: &str) -> ParseResult<Vec<LocationBlock>> {
    let raw_blocks: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(values) => values,
        Err(e) => return ParseResult::Skip(SkipReason::MalformedJson(e.to_string())),
    };

    let mut blocks = Vec::with_capacity(raw_blocks.len());
    for (index, raw) in raw_blocks.into_iter().enumerate() {
        match serde_json::from_value::<LocationBlock>(raw) {
            Ok(block) => blocks.push(block),
            Err(e) => tracing::warn!(block = index, error = %e, "location block skipped"),
        }
    }
    ParseResult::Ok(blocks)
}

/// Outcome of one parse step. Skips carry their reason instead of unwinding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult<T> {
    Ok(T),
    Skip(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("search returned status {0} after all attempts")]
    Status(u16),

    #[error("search request failed after all attempts: {0}")]
    Transport(String),

    #[error("malformed search body: {0}")]
    MalformedJson(String),

    #[error("detail url has no jobId: {0}")]
    MissingJobId(String),

    #[error("description container not found")]
    MissingDescription,
}

/// Epoch milliseconds to dd.mm.yyyy in German local time (`Europe/Berlin`).
/// Absent or zero yields an empty string.
pub fn format_start_date(timestamp_ms: Option<i64>) -> String {
    match timestamp_ms {
        None | Some(0) => String::new(),
        Some(ms) => match DateTime::from_timestamp_millis(ms) {
            Some(dt) => dt.with_timezone(&Berlin).format("%d.%m.%Y").to_string(),
            None => {
                tracing::warn!(timestamp_ms = ms, "start date out of range");
                String::new()
            }
        },
    }
}
