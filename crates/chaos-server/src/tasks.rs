//! Background tasks.
//!
//! Two independent loops run beside the request handlers: the hourly
//! rollup persister and the external indexer refresher. Neither blocks
//! request handling, and each pass tolerates being skipped; the live
//! score never depends on them having run.

use std::sync::Arc;
use std::time::Duration;

use chaos_engine::{
    truncate_to_hour, ExternalCounts, HourlyStat, RollupError, SharedSource, WindowCategory,
};
use serde::Deserialize;

use crate::AppState;

/// Fetch the pizza count every Nth refresher pass; the backing query is
/// heavier than the counts query and its TTL is longer.
const PIZZA_FETCH_EVERY: u64 = 6;

/// Periodically aggregates the current hour and persists the rollup file.
pub async fn rollup_loop(state: AppState, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(e) = run_rollup_pass(&state) {
            tracing::warn!("Rollup pass failed, will retry next interval: {}", e);
        }
    }
}

/// One aggregation pass: counts over the last hour plus the current score.
pub fn run_rollup_pass(state: &AppState) -> Result<(), RollupError> {
    let now = state.clock.now();
    let (message_count, door_opens) = {
        let metrics = state.metrics.lock().unwrap();
        (
            metrics
                .windows
                .count_since(WindowCategory::Chat, now, chrono::Duration::hours(1)) as u64,
            metrics
                .windows
                .count_since(WindowCategory::Door, now, chrono::Duration::hours(1)) as u64,
        )
    };
    let chaos_score = state.engine.raw_score(now);

    let stat = HourlyStat {
        hour: truncate_to_hour(now),
        message_count,
        door_opens,
        chaos_score,
    };

    let mut rollups = state.rollups.lock().unwrap();
    rollups.upsert(stat);
    rollups.persist()
}

#[derive(Debug, Deserialize)]
struct PizzaPayload {
    pizza_count: u64,
}

/// HTTP client for the external message indexer.
pub struct IndexerClient {
    client: reqwest::Client,
    base_url: String,
}

impl IndexerClient {
    /// Builds a client with a hard request timeout. The indexer is an
    /// optional enrichment; a slow one must not add latency anywhere.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetches recent message counts (5min/10min/hour).
    pub async fn fetch_counts(&self) -> Result<ExternalCounts, reqwest::Error> {
        self.client
            .get(format!("{}/api/counts", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<ExternalCounts>()
            .await
    }

    /// Fetches the authoritative pizza mention count.
    pub async fn fetch_pizza(&self) -> Result<u64, reqwest::Error> {
        let payload = self
            .client
            .get(format!("{}/api/pizza", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<PizzaPayload>()
            .await?;
        Ok(payload.pizza_count)
    }
}

/// Polls the indexer and publishes fresh values into the shared source
/// slot. Failures downgrade to the in-memory fallback via TTL expiry;
/// they are logged, never surfaced.
pub async fn indexer_loop(
    client: IndexerClient,
    source: Arc<SharedSource>,
    clock: chaos_engine::Clock,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut passes: u64 = 0;
    loop {
        ticker.tick().await;

        match client.fetch_counts().await {
            Ok(counts) => source.publish_counts(counts, clock.now()),
            Err(e) => tracing::warn!("Indexer counts fetch failed, falling back: {}", e),
        }

        if passes % PIZZA_FETCH_EVERY == 0 {
            match client.fetch_pizza().await {
                Ok(count) => source.publish_pizza(count, clock.now()),
                Err(e) => tracing::warn!("Indexer pizza fetch failed, falling back: {}", e),
            }
        }
        passes += 1;
    }
}
