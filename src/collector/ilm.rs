use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::future::BoxFuture;
use log::{debug, warn};

use super::{projector, CollectError, Collector};
use crate::parsers::ilm::{self, IlmExplain};
use crate::sink::{fq_name, Desc, MetricKind, Observation, Sink};
use crate::targets::Target;

const SUBSYSTEM: &str = "indices_ilm_errors";

/// Result of a single scrape cycle.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub observations: Vec<Observation>,
    pub parse_failures: u64,
}

/// Reports indices whose lifecycle policy is stuck on a failed step.
pub struct IlmCollector {
    target: Target,
    up: Desc,
    total_scrapes: Desc,
    json_parse_failures: Desc,
    failed_step: Desc,
    state: Counters,
}

#[derive(Debug, Default)]
struct Counters {
    up: AtomicBool,
    total_scrapes: AtomicU64,
    json_parse_failures: AtomicU64,
}

impl IlmCollector {
    pub fn new(namespace: &str, target: Target) -> Self {
        IlmCollector {
            target,
            up: Desc::new(
                fq_name(namespace, SUBSYSTEM, "up"),
                "Was the last scrape of the ElasticSearch Indices ILM endpoint successful.",
                MetricKind::Gauge,
            ),
            total_scrapes: Desc::new(
                fq_name(namespace, SUBSYSTEM, "total_scrapes"),
                "Current total ElasticSearch Indices ILM scrapes.",
                MetricKind::Counter,
            ),
            json_parse_failures: Desc::new(
                fq_name(namespace, SUBSYSTEM, "json_parse_failures"),
                "Number of errors while parsing JSON.",
                MetricKind::Counter,
            ),
            failed_step: Desc::new(
                fq_name(namespace, SUBSYSTEM, "failed_step"),
                "Index lifecycle step that failed for the index, with its reason. Always 1.",
                MetricKind::Gauge,
            ),
            state: Counters::default(),
        }
    }

    /// Outcome of the most recently finished scrape.
    pub fn is_up(&self) -> bool {
        self.state.up.load(Ordering::Relaxed)
    }

    /// Name of the per-index series.
    pub fn failed_step_name(&self) -> &str {
        &self.failed_step.name
    }

    async fn fetch_and_decode(&self) -> Result<IlmExplain, CollectError> {
        let body = self
            .target
            .fetch(ilm::EXPLAIN_PATH, Some(ilm::FILTER_PATH))
            .await?;

        Ok(ilm::decode(&body)?)
    }

    /// Runs one fetch, decode and project cycle and updates the counters.
    pub async fn scrape(&self) -> ScrapeOutcome {
        self.state.total_scrapes.fetch_add(1, Ordering::Relaxed);

        match self.fetch_and_decode().await {
            Ok(explain) => {
                self.state.up.store(true, Ordering::Relaxed);
                debug!(
                    "Scraped ILM state from {}, {} indices with failed steps",
                    self.target.describe(),
                    explain.indices.len()
                );

                ScrapeOutcome {
                    success: true,
                    observations: projector::project(&self.failed_step.name, &explain),
                    parse_failures: 0,
                }
            }
            Err(err) => {
                let parse_failures = match err {
                    CollectError::Parse(_) => {
                        self.state.json_parse_failures.fetch_add(1, Ordering::Relaxed);
                        1
                    }
                    CollectError::Target(_) => 0,
                };
                self.state.up.store(false, Ordering::Relaxed);
                warn!(
                    "Failed to fetch and decode index ILM stats from {}, error: {}",
                    self.target.describe(),
                    err
                );

                ScrapeOutcome {
                    success: false,
                    observations: Vec::new(),
                    parse_failures,
                }
            }
        }
    }

    // `up` comes from this cycle's outcome, not from the shared flag, which an
    // overlapping pull may already have overwritten.
    fn bookkeeping(&self, success: bool) -> [Observation; 3] {
        let up = if success { 1.0 } else { 0.0 };

        [
            Observation::gauge(&self.up.name, up),
            Observation::counter(
                &self.total_scrapes.name,
                self.state.total_scrapes.load(Ordering::Relaxed),
            ),
            Observation::counter(
                &self.json_parse_failures.name,
                self.state.json_parse_failures.load(Ordering::Relaxed),
            ),
        ]
    }
}

impl Collector for IlmCollector {
    fn describe(&self) -> Vec<Desc> {
        vec![
            self.up.clone(),
            self.total_scrapes.clone(),
            self.json_parse_failures.clone(),
        ]
    }

    fn describe_series(&self) -> Vec<Desc> {
        vec![self.failed_step.clone()]
    }

    fn collect<'a>(&'a self, sink: &'a mut (dyn Sink + Send)) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let outcome = self.scrape().await;

            for observation in outcome.observations {
                sink.emit(observation);
            }
            for observation in self.bookkeeping(outcome.success) {
                sink.emit(observation);
            }
        })
    }
}
