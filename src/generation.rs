//! Batch lead generation workflow.
//!
//! This module provides the end-to-end pipeline for one generation request:
//! 1. Acquire candidates from the configured source
//! 2. Sanitize contact fields and reject malformed candidates
//! 3. Assemble leads concurrently under a bounded semaphore
//! 4. Cache every completed lead and report per-candidate failures

use crate::assembler::{AssembledLead, AssemblyOptions, LeadAssembler};
use crate::cache_validator::ValidatedCacheEntry;
use crate::config::Config;
use crate::errors::LeadGenError;
use crate::models::{
    CandidateFailure, CandidateRecord, GenerationOutcome, GenerationRequest, Lead,
    TargetingCriteria,
};
use crate::sanitize::{is_malformed, sanitize_candidate};
use crate::services::CandidateSource;
use chrono::Utc;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Upper bound on a single batch, from the original request contract.
pub const MAX_BATCH_SIZE: usize = 200;

/// Cooperative cancellation for a running batch.
///
/// Cancellation stops admission of new candidates; in-flight assemblies
/// complete and are cached rather than being discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Batch generation engine: candidate source + assembler + lead cache.
pub struct GenerationEngine {
    source: Arc<dyn CandidateSource>,
    assembler: LeadAssembler,
    max_concurrency: usize,
    lead_cache: Cache<String, String>,
}

impl GenerationEngine {
    pub fn new(source: Arc<dyn CandidateSource>, assembler: LeadAssembler, config: &Config) -> Self {
        Self {
            source,
            assembler,
            max_concurrency: config.max_concurrency,
            lead_cache: Cache::builder()
                .max_capacity(config.lead_cache_capacity)
                .time_to_live(Duration::from_secs(config.lead_cache_ttl_secs))
                .build(),
        }
    }

    /// Runs one batch to completion.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, LeadGenError> {
        self.generate_with_cancel(request, &CancelHandle::new())
            .await
    }

    /// Runs one batch, observing `cancel` between candidate admissions.
    ///
    /// Candidate-source errors abort the whole batch; everything after that
    /// point degrades per candidate.
    pub async fn generate_with_cancel(
        &self,
        request: &GenerationRequest,
        cancel: &CancelHandle,
    ) -> Result<GenerationOutcome, LeadGenError> {
        let count = request.count.clamp(1, MAX_BATCH_SIZE);
        if count != request.count {
            tracing::warn!(
                "Requested count {} clamped to {}",
                request.count,
                count
            );
        }

        let batch_id = Uuid::new_v4();
        tracing::info!(
            "Starting generation batch {} ({} candidates requested)",
            batch_id,
            count
        );

        // Step 1: acquire candidates. Classified source errors are batch-fatal.
        let candidates = self.source.generate(&request.criteria, count).await?;
        tracing::info!(
            "Batch {}: candidate source returned {} candidates",
            batch_id,
            candidates.len()
        );

        let options = AssemblyOptions {
            include_enrichment: request.include_enrichment,
            generate_messages: request.generate_messages,
        };
        let fingerprint = request_fingerprint(&request.criteria, options);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set: JoinSet<AssembledLead> = JoinSet::new();
        let mut leads: Vec<Lead> = Vec::new();
        let mut failures: Vec<CandidateFailure> = Vec::new();
        let mut discarded = 0usize;
        let mut cancelled = false;

        // Steps 2-3: sanitize, reject malformed, admit the rest concurrently.
        for mut candidate in candidates {
            if cancel.is_cancelled() {
                tracing::warn!("Batch {} cancelled, stopping candidate admission", batch_id);
                cancelled = true;
                break;
            }

            sanitize_candidate(&mut candidate);

            if is_malformed(&candidate) {
                tracing::warn!(
                    "Batch {}: discarding malformed candidate (company: '{}', stakeholder: '{}')",
                    batch_id,
                    candidate.company.name,
                    candidate.stakeholder.name
                );
                failures.push(malformed_failure(&candidate));
                discarded += 1;
                continue;
            }

            let key = cache_key(&candidate, &fingerprint);
            if let Some(serialized) = self.lead_cache.get(&key).await {
                match ValidatedCacheEntry::deserialize_and_validate(&serialized)
                    .and_then(|json| serde_json::from_str::<Lead>(&json).ok())
                {
                    Some(lead) => {
                        tracing::debug!("Batch {}: lead cache hit for '{}'", batch_id, key);
                        leads.push(lead);
                        continue;
                    }
                    None => {
                        // Corrupted entry: drop it and reassemble from scratch.
                        self.lead_cache.invalidate(&key).await;
                    }
                }
            }

            // Admission holds the permit, so once the batch is cancelled no
            // further upstream work can start.
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            if cancel.is_cancelled() {
                tracing::warn!("Batch {} cancelled, stopping candidate admission", batch_id);
                cancelled = true;
                break;
            }

            let assembler = self.assembler.clone();
            let criteria = request.criteria.clone();
            let cache = self.lead_cache.clone();
            join_set.spawn(async move {
                let _permit = permit;
                let assembled = assembler.assemble(candidate, &criteria, options).await;
                // Completed work is cached even if the batch was cancelled
                // meanwhile, so a re-run reuses it.
                if let Ok(json) = serde_json::to_string(&assembled.lead) {
                    cache
                        .insert(key, ValidatedCacheEntry::new(json).serialize())
                        .await;
                }
                assembled
            });
        }

        // Step 4: collect in-flight assemblies; these always run to completion.
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(AssembledLead {
                    lead,
                    failures: collaborator_failures,
                }) => {
                    for failure in collaborator_failures {
                        failures.push(CandidateFailure {
                            company: Some(lead.company.name.clone()),
                            stakeholder: Some(lead.stakeholder.name.clone()),
                            code: failure.error.code().to_string(),
                            message: format!("{}: {}", failure.stage.as_str(), failure.error),
                        });
                    }
                    leads.push(lead);
                }
                Err(e) => {
                    tracing::error!("Batch {}: assembly task failed: {}", batch_id, e);
                    failures.push(CandidateFailure {
                        company: None,
                        stakeholder: None,
                        code: "internal".to_string(),
                        message: format!("assembly task failed: {}", e),
                    });
                    discarded += 1;
                }
            }
        }

        let generated = leads.len();
        tracing::info!(
            "Batch {} finished: {} leads, {} candidates discarded, {} failures recorded{}",
            batch_id,
            generated,
            discarded,
            failures.len(),
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(GenerationOutcome {
            batch_id,
            leads,
            failures,
            requested: count,
            generated,
            failed: discarded,
            cancelled,
            generated_at: Utc::now(),
        })
    }
}

/// Cache key: case-folded company + stakeholder identity, scoped by the
/// request fingerprint so a lead scored under one set of criteria is never
/// served for another.
fn cache_key(candidate: &CandidateRecord, fingerprint: &str) -> String {
    format!(
        "{}|{}|{}",
        candidate.company.name.trim().to_lowercase(),
        candidate.stakeholder.name.trim().to_lowercase(),
        fingerprint
    )
}

/// Digest of the targeting criteria and assembly options that shape a lead.
fn request_fingerprint(criteria: &TargetingCriteria, options: AssemblyOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_string(criteria).unwrap_or_default().as_bytes());
    hasher.update([
        u8::from(options.include_enrichment),
        u8::from(options.generate_messages),
    ]);
    hex::encode(&hasher.finalize()[..8])
}

fn malformed_failure(candidate: &CandidateRecord) -> CandidateFailure {
    let missing = if candidate.company.name.trim().is_empty() {
        "company name"
    } else {
        "stakeholder name"
    };
    CandidateFailure {
        company: non_empty(&candidate.company.name),
        stakeholder: non_empty(&candidate.stakeholder.name),
        code: LeadGenError::MalformedCandidate(String::new()).code().to_string(),
        message: format!("candidate missing {}", missing),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
