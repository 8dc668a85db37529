use crate::app::ports::HttpClientPort;
use crate::clock::build_clock_document;
use crate::error::{ClockError, Result};
use crate::merge::merge_incidents;
use crate::registry::{ClockDefinition, FeedSpec};
use crate::relevance::RelevanceClassifier;
use crate::storage::DocumentStore;
use crate::types::{ClockDocument, Incident};
use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// What one feed contributed to a run.
#[derive(Debug, Clone, Serialize)]
pub struct FeedReport {
    pub feed: String,
    pub url: String,
    pub bytes: usize,
    pub sha256: String,
    pub records: usize,
    pub kept: usize,
    pub skipped: BTreeMap<&'static str, usize>,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub clock_id: String,
    pub feeds: Vec<FeedReport>,
    pub prior_incidents: usize,
    pub new_incidents: usize,
    pub total_incidents: usize,
    pub output_file: PathBuf,
    pub last_incident: Option<Incident>,
}

/// One fetch, parse, merge, save pass for a clock.
///
/// Any fetch failure or undecodable payload aborts the run before anything is
/// written. Individual bad records are skipped inside the parsers.
pub struct Pipeline<'a> {
    http: &'a dyn HttpClientPort,
    store: &'a dyn DocumentStore,
    classifier: &'a RelevanceClassifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        http: &'a dyn HttpClientPort,
        store: &'a dyn DocumentStore,
        classifier: &'a RelevanceClassifier,
    ) -> Self {
        Self {
            http,
            store,
            classifier,
        }
    }

    pub async fn run(&self, clock: &ClockDefinition, output: &Path) -> Result<PipelineResult> {
        self.run_at(clock, output, Utc::now()).await
    }

    /// Run with an explicit `last_updated` instant.
    #[instrument(
        skip_all,
        fields(clock = %clock.id(), run_id = %uuid::Uuid::new_v4(), output = %output.display())
    )]
    pub async fn run_at(
        &self,
        clock: &ClockDefinition,
        output: &Path,
        now: DateTime<Utc>,
    ) -> Result<PipelineResult> {
        let clock_id = clock.id().to_string();
        info!("Starting pipeline for {}", clock_id);
        counter!("clock_runs_total", "clock" => clock_id.clone()).increment(1);
        let t_run = std::time::Instant::now();

        // Step 1: Prior history
        let existing = self
            .store
            .load(output)
            .map(ClockDocument::into_incidents)
            .unwrap_or_default();
        info!("Loaded {} prior incidents", existing.len());

        // Step 2: Fetch and parse every feed
        let mut new_incidents = Vec::new();
        let mut feeds = Vec::with_capacity(clock.feeds.len());
        for feed in &clock.feeds {
            let (incidents, report) = self.ingest_feed(&clock_id, feed).await?;
            new_incidents.extend(incidents);
            feeds.push(report);
        }

        // Step 3: Merge and rebuild
        let prior_incidents = existing.len();
        let new_count = new_incidents.len();
        let merged = merge_incidents(existing, new_incidents);
        let total_incidents = merged.len();
        let document = build_clock_document(&clock.meta, merged, now);
        info!(
            "Merged {} prior and {} new incidents into {}",
            prior_incidents, new_count, total_incidents
        );

        // Step 4: Persist
        self.store.save(&document, output)?;
        info!("Saved clock document to {}", output.display());

        gauge!("clock_incidents", "clock" => clock_id.clone()).set(total_incidents as f64);
        histogram!("clock_run_duration_seconds", "clock" => clock_id.clone())
            .record(t_run.elapsed().as_secs_f64());

        Ok(PipelineResult {
            clock_id,
            feeds,
            prior_incidents,
            new_incidents: new_count,
            total_incidents,
            output_file: output.to_path_buf(),
            last_incident: document.last_incident,
        })
    }

    async fn ingest_feed(
        &self,
        clock_id: &str,
        feed: &FeedSpec,
    ) -> Result<(Vec<Incident>, FeedReport)> {
        info!("Fetching {} from {}", feed.name, feed.url);
        let response = self.http.get(&feed.url).await?;
        let sha256 = hex::encode(Sha256::digest(&response.bytes));
        debug!(
            "Fetched {} bytes (HTTP {}, {}) sha256={}",
            response.bytes.len(),
            response.status,
            response.content_type,
            sha256
        );

        let outcome = feed
            .parser
            .parse(&feed.url, &response.bytes, self.classifier)
            .map_err(|e| ClockError::Feed {
                url: feed.url.clone(),
                message: format!("{:#}", e),
            })?;

        counter!("clock_feed_records_total", "clock" => clock_id.to_string(), "feed" => feed.name.clone())
            .increment(outcome.total_records as u64);
        for (reason, count) in &outcome.skipped {
            counter!(
                "clock_feed_skipped_total",
                "clock" => clock_id.to_string(),
                "feed" => feed.name.clone(),
                "reason" => *reason
            )
            .increment(*count as u64);
        }
        info!(
            "Feed {}: {} records, {} kept, {} skipped",
            feed.name,
            outcome.total_records,
            outcome.incidents.len(),
            outcome.skipped_total()
        );

        let report = FeedReport {
            feed: feed.name.clone(),
            url: feed.url.clone(),
            bytes: response.bytes.len(),
            sha256,
            records: outcome.total_records,
            kept: outcome.incidents.len(),
            skipped: outcome.skipped,
        };
        Ok((outcome.incidents, report))
    }
}
