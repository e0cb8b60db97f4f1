//! In-memory vacancy store for one run, keyed by job id and iterated in
//! insertion order.

use indexmap::IndexMap;

use crate::models::VacancyRecord;

#[derive(Debug, Default)]
pub struct Registry {
    records: IndexMap<String, VacancyRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the record for `record.job_id`.
    ///
    /// A replaced record keeps the position where its job id was first seen.
    /// Returns `true` when an existing record was overwritten.
    pub fn upsert(&mut self, record: VacancyRecord) -> bool {
        let job_id = record.job_id.clone();
        let replaced = self.records.insert(job_id.clone(), record).is_some();
        if replaced {
            tracing::debug!(job_id = %job_id, "overwrote existing vacancy");
        }
        replaced
    }

    /// Patch only the description. Unknown job ids and empty text are no-ops.
    pub fn set_description(&mut self, job_id: &str, text: String) -> bool {
        if text.is_empty() {
            return false;
        }
        match self.records.get_mut(job_id) {
            Some(record) => {
                record.description = text;
                true
            }
            None => {
                tracing::warn!(job_id = %job_id, "description for unknown job id ignored");
                false
            }
        }
    }

    pub fn get(&self, job_id: &str) -> Option<&VacancyRecord> {
        self.records.get(job_id)
    }

    /// Detail URLs of all records, in insertion order
    pub fn detail_urls(&self) -> Vec<String> {
        self.records.values().map(|r| r.detail_url.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VacancyRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that already carry a description
    pub fn described(&self) -> usize {
        self.records
            .values()
            .filter(|r| !r.description.is_empty())
            .count()
    }
}
