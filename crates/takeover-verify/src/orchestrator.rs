//! Verification orchestrator.
//!
//! Each record moves `Pending -> Ineligible` or `Pending -> Verifying ->
//! Verified | Exhausted`. Records run concurrently, bounded by
//! [`VerifyConfig::workers`]; probes of one record race each other, bounded by
//! [`VerifyConfig::probe_concurrency`], and the first success wins.

use chrono::{DateTime, Utc};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use takeover_client::Executor;
use takeover_core::{sort_results, FingerprintRecord, ProbeOutcome, VerificationResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::classifier::classify;
use crate::planner::ProbePlan;

/// Verification settings
#[derive(Debug, Clone, Copy)]
pub struct VerifyConfig {
    /// Records verified at the same time
    pub workers: usize,
    /// Probes in flight per record
    pub probe_concurrency: usize,
    /// Whole-run deadline
    pub deadline: Option<Duration>,
    /// Failure reasons shown per record in progress lines
    pub reason_limit: usize,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            workers: 20,
            probe_concurrency: 4,
            deadline: None,
            reason_limit: 4,
        }
    }
}

impl VerifyConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool size (at least 1)
    #[must_use]
    pub const fn workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { 1 } else { workers };
        self
    }

    /// Set the per-record probe concurrency (at least 1)
    #[must_use]
    pub const fn probe_concurrency(mut self, probes: usize) -> Self {
        self.probe_concurrency = if probes == 0 { 1 } else { probes };
        self
    }

    /// Set the whole-run deadline
    #[must_use]
    pub const fn deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set how many failure reasons progress lines show
    #[must_use]
    pub const fn reason_limit(mut self, limit: usize) -> Self {
        self.reason_limit = limit;
        self
    }
}

/// Outcome of racing a record's probes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Race {
    /// A probe succeeded
    Won {
        /// The winning outcome
        outcome: ProbeOutcome,
        /// Probes started before the race ended
        attempted: usize,
    },
    /// Every probe failed; outcomes in submission order
    Lost(Vec<ProbeOutcome>),
}

/// Run probes with at most `concurrency` in flight and stop at the first success.
///
/// Probes still in flight when one succeeds are dropped. When all fail, the
/// outcomes are returned in the order the probes were submitted, not the
/// order they finished.
pub async fn first_success<I, F>(probes: I, concurrency: usize) -> Race
where
    I: IntoIterator<Item = F>,
    F: Future<Output = ProbeOutcome>,
{
    let limit = concurrency.max(1);
    let mut pending = probes.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();
    let mut failures: Vec<(usize, ProbeOutcome)> = Vec::new();
    let mut attempted = 0;

    loop {
        while in_flight.len() < limit {
            let Some((index, probe)) = pending.next() else {
                break;
            };
            attempted += 1;
            in_flight.push(async move { (index, probe.await) });
        }

        match in_flight.next().await {
            Some((_, outcome)) if outcome.success => return Race::Won { outcome, attempted },
            Some((index, outcome)) => failures.push((index, outcome)),
            None => break,
        }
    }

    failures.sort_by_key(|(index, _)| *index);
    Race::Lost(failures.into_iter().map(|(_, outcome)| outcome).collect())
}

/// A finished verification run
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// One result per record, sorted by engine
    pub results: Vec<VerificationResult>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the last record finished
    pub finished_at: DateTime<Utc>,
}

impl VerifyReport {
    /// Number of verified fingerprints
    #[must_use]
    pub fn verified_count(&self) -> usize {
        self.results.iter().filter(|r| r.verified).count()
    }

    /// Wall-clock duration of the run
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Fingerprint verifier
pub struct Verifier<E> {
    executor: Arc<E>,
    config: VerifyConfig,
}

impl<E> Clone for Verifier<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            config: self.config,
        }
    }
}

impl<E: Executor + 'static> Verifier<E> {
    /// Create a verifier with default settings
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, VerifyConfig::default())
    }

    /// Create a verifier with custom settings
    pub fn with_config(executor: E, config: VerifyConfig) -> Self {
        Self {
            executor: Arc::new(executor),
            config,
        }
    }

    /// Current settings
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Verify a single record
    pub async fn verify_record(&self, record: FingerprintRecord) -> VerificationResult {
        if let Err(why) = record.eligibility() {
            debug!(engine = %record.engine, reason = %why, "skipping ineligible record");
            return VerificationResult::ineligible(record, why);
        }

        let plan = ProbePlan::new(&record);
        debug!(engine = %record.engine, probes = plan.len_hint(), "verifying");

        let executor = &self.executor;
        let signal = &record.signal;
        let probes = plan.map(|spec| async move {
            let outcome = executor.execute(&spec).await;
            let verdict = classify(signal, &spec, &outcome);
            debug!(url = %spec.url, success = verdict.success, reason = %verdict.reason, "probe finished");
            verdict
        });

        let race = first_success(probes, self.config.probe_concurrency).await;
        match race {
            Race::Won { outcome, attempted } => {
                VerificationResult::verified(record, outcome.reason, attempted)
            }
            Race::Lost(outcomes) => {
                let failures = outcomes.into_iter().map(|o| o.reason).collect();
                VerificationResult::exhausted(record, failures)
            }
        }
    }

    /// Verify every record and return the sorted results
    pub async fn verify_all(&self, records: Vec<FingerprintRecord>) -> VerifyReport {
        self.verify_all_with(records, |_| {}).await
    }

    /// Verify every record, calling `on_result` as each one finishes.
    ///
    /// Results arrive at the callback in completion order.
    pub async fn verify_all_with<F>(&self, records: Vec<FingerprintRecord>, mut on_result: F) -> VerifyReport
    where
        F: FnMut(&VerificationResult),
    {
        let started_at = Utc::now();
        let deadline = self
            .config
            .deadline
            .map(|d| tokio::time::Instant::now() + d);
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));

        info!(
            records = records.len(),
            workers = self.config.workers,
            "starting verification"
        );

        let mut results = Vec::with_capacity(records.len());
        let mut tasks = JoinSet::new();
        for record in records {
            // Ineligible records never take a worker slot
            if let Err(why) = record.eligibility() {
                let result = VerificationResult::ineligible(record, why);
                self.finished(&result, &mut on_result);
                results.push(result);
                continue;
            }

            let verifier = self.clone();
            let sem = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let Some(at) = deadline else {
                    let _permit = sem.acquire_owned().await;
                    return verifier.verify_record(record).await;
                };
                let fallback = record.clone();
                let work = async move {
                    let _permit = sem.acquire_owned().await;
                    verifier.verify_record(record).await
                };
                tokio::time::timeout_at(at, work)
                    .await
                    .unwrap_or_else(|_| VerificationResult::deadline_exceeded(fallback))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => {
                    self.finished(&result, &mut on_result);
                    results.push(result);
                }
                Err(e) => warn!(error = %e, "verification task failed"),
            }
        }

        sort_results(&mut results);
        let report = VerifyReport {
            results,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            verified = report.verified_count(),
            total = report.results.len(),
            "verification finished"
        );
        report
    }

    fn finished<F>(&self, result: &VerificationResult, on_result: &mut F)
    where
        F: FnMut(&VerificationResult),
    {
        info!(
            engine = %result.record.engine,
            verified = result.verified,
            reason = %result.reason_summary(self.config.reason_limit),
            "fingerprint checked"
        );
        on_result(result);
    }
}
