//! Concurrent per-character enrichment.
//!
//! Each call builds a short-lived pool of workers that pull roster entries
//! from one bounded queue. For every entry a worker acquires a rate-limit
//! token and fetches the character detail, acquires another token and
//! fetches the mythic score, then merges the three into a
//! [`CharacterRecord`]. Lookup failures degrade that one character to
//! defaults; only cancellation or a crashed worker fails the call.

use std::sync::Arc;

use armory_battlenet::rate_limit::{AcquireError, RateLimiter};
use armory_core::roster::{
    CharacterDetail, CharacterRecord, CharacterSummary, EnrichedCharacter, MythicScore, Owner,
};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::source::GameApi;

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 3;

/// Capacity of the job queue shared by the workers.
const QUEUE_CAPACITY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("Enrichment cancelled")]
    Cancelled,

    #[error("Enrichment worker failed: {0}")]
    WorkerFailed(String),
}

/// Fans a roster out over `workers` tasks and collects the merged records.
pub struct EnrichmentPipeline<A> {
    api: Arc<A>,
    limiter: Arc<RateLimiter>,
    workers: usize,
}

impl<A: GameApi> EnrichmentPipeline<A> {
    /// `workers` is clamped to at least one.
    pub fn new(api: Arc<A>, limiter: Arc<RateLimiter>, workers: usize) -> Self {
        Self {
            api,
            limiter,
            workers: workers.max(1),
        }
    }

    /// Enrich every summary on behalf of `owner`.
    ///
    /// Returns exactly one [`EnrichedCharacter`] per input summary, in no
    /// particular order, or an error and no characters at all.
    pub async fn enrich(
        &self,
        summaries: Vec<CharacterSummary>,
        access_token: &str,
        owner: &Owner,
        cancel: &CancellationToken,
    ) -> Result<Vec<EnrichedCharacter>, EnrichError> {
        if summaries.is_empty() {
            return Ok(Vec::new());
        }
        if cancel.is_cancelled() {
            return Err(EnrichError::Cancelled);
        }

        let expected = summaries.len();
        let (job_tx, job_rx) = mpsc::channel::<CharacterSummary>(QUEUE_CAPACITY);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<EnrichedCharacter>(expected);

        let ctx = Arc::new(WorkerContext {
            api: Arc::clone(&self.api),
            limiter: Arc::clone(&self.limiter),
            access_token: access_token.to_string(),
            owner: owner.clone(),
            cancel: cancel.clone(),
        });

        let worker_count = self.workers.min(expected);
        let mut workers = JoinSet::new();
        for worker_id in 0..worker_count {
            let ctx = Arc::clone(&ctx);
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            workers.spawn(run_worker(worker_id, ctx, jobs, results));
        }
        drop(job_rx);
        drop(result_tx);

        tracing::debug!(
            owner_id = %owner.id,
            characters = expected,
            workers = worker_count,
            "Enrichment started",
        );

        let dispatch = async move {
            for summary in summaries {
                if job_tx.send(summary).await.is_err() {
                    // Every worker has exited.
                    break;
                }
            }
        };
        let collect = async {
            let mut out = Vec::with_capacity(expected);
            while let Some(character) = result_rx.recv().await {
                out.push(character);
            }
            out
        };

        let collected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            (_, out) = async { tokio::join!(dispatch, collect) } => Some(out),
        };

        let Some(enriched) = collected else {
            workers.abort_all();
            tracing::info!(owner_id = %owner.id, "Enrichment cancelled");
            return Err(EnrichError::Cancelled);
        };

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(owner_id = %owner.id, error = %e, "Enrichment worker crashed");
                return Err(EnrichError::WorkerFailed(e.to_string()));
            }
        }

        if cancel.is_cancelled() {
            return Err(EnrichError::Cancelled);
        }
        if enriched.len() != expected {
            return Err(EnrichError::WorkerFailed(format!(
                "expected {expected} characters, got {}",
                enriched.len()
            )));
        }

        tracing::debug!(owner_id = %owner.id, characters = expected, "Enrichment finished");
        Ok(enriched)
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

struct WorkerContext<A> {
    api: Arc<A>,
    limiter: Arc<RateLimiter>,
    access_token: String,
    owner: Owner,
    cancel: CancellationToken,
}

async fn run_worker<A: GameApi>(
    worker_id: usize,
    ctx: Arc<WorkerContext<A>>,
    jobs: Arc<Mutex<mpsc::Receiver<CharacterSummary>>>,
    results: mpsc::Sender<EnrichedCharacter>,
) {
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(summary) = next else {
            break;
        };

        match ctx.enrich_one(&summary).await {
            Ok(character) => {
                if results.send(character).await.is_err() {
                    break;
                }
            }
            Err(EnrichError::Cancelled) | Err(EnrichError::WorkerFailed(_)) => {
                tracing::debug!(worker_id, "Enrichment worker stopping");
                break;
            }
        }
    }
}

impl<A: GameApi> WorkerContext<A> {
    async fn enrich_one(&self, summary: &CharacterSummary) -> Result<EnrichedCharacter, EnrichError> {
        let detail = self.detail(summary).await?;
        let score = self.mythic_score(summary).await?;

        let record = CharacterRecord::merge(&self.owner, summary, &detail, score);
        Ok(EnrichedCharacter {
            record,
            guild: detail.guild,
        })
    }

    async fn detail(&self, summary: &CharacterSummary) -> Result<CharacterDetail, EnrichError> {
        if !self.acquire(summary, "detail").await? {
            return Ok(CharacterDetail::default());
        }

        let lookup = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(EnrichError::Cancelled),
            lookup = self.api.fetch_detail(&self.access_token, &summary.realm.slug, &summary.name) => lookup,
        };

        Ok(lookup.unwrap_or_else(|e| {
            tracing::warn!(
                character = %summary.name,
                realm = %summary.realm.slug,
                error = %e,
                "Character detail lookup failed, using defaults",
            );
            CharacterDetail::default()
        }))
    }

    async fn mythic_score(&self, summary: &CharacterSummary) -> Result<MythicScore, EnrichError> {
        if !self.acquire(summary, "mythic score").await? {
            return Ok(MythicScore::default());
        }

        let lookup = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(EnrichError::Cancelled),
            lookup = self.api.fetch_mythic_score(&self.access_token, &summary.realm.slug, &summary.name) => lookup,
        };

        match lookup {
            Ok(Some(score)) => Ok(score),
            Ok(None) => Ok(MythicScore::default()),
            Err(e) => {
                tracing::warn!(
                    character = %summary.name,
                    realm = %summary.realm.slug,
                    error = %e,
                    "Mythic score lookup failed, using 0",
                );
                Ok(MythicScore::default())
            }
        }
    }

    /// `Ok(false)` when the limiter deadline passed and the lookup should
    /// be skipped.
    async fn acquire(&self, summary: &CharacterSummary, lookup: &str) -> Result<bool, EnrichError> {
        match self.limiter.acquire(&self.cancel).await {
            Ok(()) => Ok(true),
            Err(AcquireError::Cancelled) => Err(EnrichError::Cancelled),
            Err(e @ AcquireError::Exceeded { .. }) => {
                tracing::warn!(
                    character = %summary.name,
                    realm = %summary.realm.slug,
                    lookup,
                    error = %e,
                    "Rate limit wait exceeded, using defaults",
                );
                Ok(false)
            }
        }
    }
}
