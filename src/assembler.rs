//! Per-candidate lead assembly.
//!
//! Scoring and explanation are pure and always succeed; collaborator calls
//! (match reason, outreach message, enrichment) are the only fallible steps.
//! A collaborator failure never discards the scored lead: the affected field
//! stays `None` and the failure is recorded for the batch report.

use crate::errors::LeadGenError;
use crate::explain::build_match_details;
use crate::models::{CandidateRecord, Lead, LeadStatus, TargetingCriteria};
use crate::scoring::{fit_score, score_dimensions};
use crate::services::{EnrichmentSource, TextGenerator};
use std::sync::Arc;

/// What the assembler should request from collaborators beyond the score.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub include_enrichment: bool,
    pub generate_messages: bool,
}

/// Which collaborator step failed during assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    MatchReason,
    OutreachMessage,
    Enrichment,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::MatchReason => "match_reason",
            FailureStage::OutreachMessage => "outreach_message",
            FailureStage::Enrichment => "enrichment",
        }
    }
}

/// A classified, non-fatal collaborator failure.
#[derive(Debug, Clone)]
pub struct CollaboratorFailure {
    pub stage: FailureStage,
    pub error: LeadGenError,
}

/// A fully scored lead plus any collaborator failures met along the way.
#[derive(Debug, Clone)]
pub struct AssembledLead {
    pub lead: Lead,
    pub failures: Vec<CollaboratorFailure>,
}

/// Orchestrates scorers, explainer and collaborators into one `Lead` per
/// candidate. Infallible: scoring always survives text-generation failure.
#[derive(Clone)]
pub struct LeadAssembler {
    text: Arc<dyn TextGenerator>,
    enrichment: Arc<dyn EnrichmentSource>,
}

impl LeadAssembler {
    pub fn new(text: Arc<dyn TextGenerator>, enrichment: Arc<dyn EnrichmentSource>) -> Self {
        Self { text, enrichment }
    }

    /// Assembles one lead. Steps:
    /// 1. dimension scores + composite fit score (pure)
    /// 2. match details with criteria text (pure)
    /// 3. collaborator calls per `options`, each isolated
    /// 4. the immutable lead, `status = new`, `id` unassigned
    pub async fn assemble(
        &self,
        candidate: CandidateRecord,
        criteria: &TargetingCriteria,
        options: AssemblyOptions,
    ) -> AssembledLead {
        let scores = score_dimensions(&candidate, criteria);
        let composite = fit_score(&scores);
        let details = build_match_details(&candidate, &scores);

        let mut failures = Vec::new();

        let match_reason = match self
            .text
            .match_reason(&candidate, criteria, &details)
            .await
        {
            Ok(reason) => Some(reason),
            Err(e) => {
                tracing::warn!(
                    "Match reason generation failed for '{}' ({}): {}",
                    candidate.company.name,
                    e.code(),
                    e
                );
                failures.push(CollaboratorFailure {
                    stage: FailureStage::MatchReason,
                    error: e,
                });
                None
            }
        };

        let outreach_message = if options.generate_messages {
            match self
                .text
                .outreach_message(
                    &candidate,
                    criteria,
                    match_reason.as_deref().unwrap_or(""),
                )
                .await
            {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!(
                        "Outreach generation failed for '{}' ({}): {}",
                        candidate.company.name,
                        e.code(),
                        e
                    );
                    failures.push(CollaboratorFailure {
                        stage: FailureStage::OutreachMessage,
                        error: e,
                    });
                    None
                }
            }
        } else {
            None
        };

        let enrichment_data = if options.include_enrichment {
            match self.enrichment.enrich(&candidate.company).await {
                Ok(data) => Some(data),
                Err(e) => {
                    // Enrichment is best-effort by contract.
                    tracing::warn!(
                        "Enrichment failed for '{}' ({}): {}",
                        candidate.company.name,
                        e.code(),
                        e
                    );
                    failures.push(CollaboratorFailure {
                        stage: FailureStage::Enrichment,
                        error: e,
                    });
                    None
                }
            }
        } else {
            None
        };

        tracing::debug!(
            "Assembled lead '{}' / '{}' with fit score {}",
            candidate.company.name,
            candidate.stakeholder.name,
            composite
        );

        AssembledLead {
            lead: Lead {
                id: None,
                company: candidate.company,
                stakeholder: candidate.stakeholder,
                fit_score: composite,
                match_details: details,
                match_reason,
                status: LeadStatus::New,
                outreach_message,
                enrichment_data,
            },
            failures,
        }
    }
}
