//! Human-readable matching criteria, derived from the same fields that feed
//! the scorers so the explanation can never contradict the score.
//!
//! The entry order is fixed. Entries for specialties and technologies are
//! omitted when their source set is empty; every other entry is always
//! emitted, rendering "not specified" for missing scalar fields so the list
//! length stays predictable for a given candidate shape.

use crate::buckets::company_size_label;
use crate::models::{CandidateRecord, MatchDetails};
use crate::scoring::DimensionScores;

const NOT_SPECIFIED: &str = "not specified";

fn scalar(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

fn join_set(values: &[String]) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the ordered justification list for one candidate.
///
/// Length is 6 when specialties and technologies are both empty, 7 when
/// exactly one is non-empty, 8 when both are.
pub fn matching_criteria(candidate: &CandidateRecord) -> Vec<String> {
    let company = &candidate.company;
    let stakeholder = &candidate.stakeholder;

    let specialties = join_set(&company.specialties);
    let technologies = join_set(&company.technologies);

    let mut entries = Vec::with_capacity(8);

    entries.push(format!(
        "Industry Fit – {} company with {} expertise",
        scalar(company.industry.as_deref()),
        if specialties.is_empty() {
            NOT_SPECIFIED
        } else {
            specialties.as_str()
        },
    ));

    entries.push(format!(
        "Size & Revenue – {} company with {} annual revenue",
        scalar(company.size.as_deref()),
        scalar(company.revenue.as_deref()),
    ));

    entries.push(format!(
        "Strategic Relevance – {}",
        company.description.as_deref().map(str::trim).unwrap_or(""),
    ));

    if !specialties.is_empty() {
        entries.push(format!("Industry Engagement – Active in {}", specialties));
    }

    if !technologies.is_empty() {
        entries.push(format!("Technology Usage – Uses {}", technologies));
    }

    entries.push(format!(
        "Decision Making – {} level position in {}",
        stakeholder.seniority.as_str(),
        scalar(stakeholder.department.as_deref()),
    ));

    entries.push("Budget Alignment – Revenue and size match target criteria".to_string());

    entries.push(format!(
        "Geographic Match – Located in {}",
        scalar(company.location.as_deref()),
    ));

    entries
}

/// Bundles the sub-scores, size tier and criteria text into the
/// `matchDetails` record carried on every lead.
pub fn build_match_details(candidate: &CandidateRecord, scores: &DimensionScores) -> MatchDetails {
    MatchDetails {
        industry_relevance: scores.industry_relevance,
        product_fit: scores.product_fit,
        decision_making_authority: scores.decision_making_authority,
        budget_alignment: scores.budget_alignment,
        geographic_match: scores.geographic_match,
        company_size: company_size_label(candidate.company.size.as_deref()).to_string(),
        matching_criteria: matching_criteria(candidate),
    }
}
