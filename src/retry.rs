//! Bounded retry rounds over the description fetcher.
//!
//! Each round consumes the pending URL set and produces the next one from
//! the round's failures. The machine stops when nothing is pending or when
//! the attempt ceiling is reached; the ceiling counts the first pass, so no
//! URL is fetched more than `attempts` times.

use crate::fetcher::DescriptionFetcher;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundState {
    Pending {
        pending: Vec<String>,
        attempts_remaining: u32,
    },
    Done {
        unresolved: Vec<String>,
    },
}

impl RoundState {
    pub fn new(urls: Vec<String>, attempts: u32) -> Self {
        if urls.is_empty() || attempts == 0 {
            RoundState::Done { unresolved: urls }
        } else {
            RoundState::Pending {
                pending: urls,
                attempts_remaining: attempts,
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RoundState::Done { .. })
    }

    /// Run one round. A finished state is returned unchanged.
    pub async fn advance(self, fetcher: &DescriptionFetcher, registry: &mut Registry) -> Self {
        let (pending, attempts_remaining) = match self {
            RoundState::Done { .. } => return self,
            RoundState::Pending {
                pending,
                attempts_remaining,
            } => (pending, attempts_remaining),
        };

        let failures = fetcher.fetch_into(registry, &pending).await;
        let attempts_remaining = attempts_remaining.saturating_sub(1);

        if failures.is_empty() || attempts_remaining == 0 {
            RoundState::Done {
                unresolved: failures,
            }
        } else {
            RoundState::Pending {
                pending: failures,
                attempts_remaining,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryReport {
    pub rounds: u32,
    pub unresolved: Vec<String>,
}

/// Drive the fetcher over `urls` until every URL resolved or the ceiling is hit.
pub async fn run_rounds(
    fetcher: &DescriptionFetcher,
    registry: &mut Registry,
    urls: Vec<String>,
    attempts: u32,
) -> RetryReport {
    let mut state = RoundState::new(urls, attempts);
    let mut rounds = 0;

    while !state.is_done() {
        rounds += 1;
        if rounds > 1 {
            if let RoundState::Pending { pending, .. } = &state {
                tracing::info!(round = rounds, urls = pending.len(), "retrying failed detail pages");
            }
        }
        state = state.advance(fetcher, registry).await;
    }

    let unresolved = match state {
        RoundState::Done { unresolved } => unresolved,
        RoundState::Pending { pending, .. } => pending,
    };

    if !unresolved.is_empty() {
        tracing::warn!(
            unresolved = unresolved.len(),
            rounds,
            "detail pages left without description"
        );
    }

    RetryReport { rounds, unresolved }
}
