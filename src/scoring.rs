//! Dimension scorers and the composite fit-score aggregator.
//!
//! Every scorer is a pure function `(candidate, criteria) -> score in [0,100]`
//! with no I/O and no shared state, total over arbitrarily sparse input.
//! Matching signals are additive bonuses capped at 100, so adding a signal
//! never lowers a score and no combination of bonuses can exceed the cap.

use crate::buckets::within_range;
use crate::models::{CandidateRecord, Seniority, TargetingCriteria};

/// Fixed aggregation weights in hundredths, summing to 100. Kept as integers
/// so the half-up rounding of the weighted average is exact.
pub const WEIGHT_INDUSTRY_RELEVANCE: u32 = 30;
pub const WEIGHT_PRODUCT_FIT: u32 = 20;
pub const WEIGHT_DECISION_AUTHORITY: u32 = 20;
pub const WEIGHT_BUDGET_ALIGNMENT: u32 = 15;
pub const WEIGHT_GEOGRAPHIC_MATCH: u32 = 15;

/// Industry relevance: 90 on an exact (case-insensitive, trimmed) industry
/// match, 70 otherwise. Upstream candidates are assumed roughly pre-filtered
/// on industry, so a mismatch still reads "related", never 0. A configured
/// sub-industry found among the company's specialties adds 10, capped at 100.
pub fn industry_relevance(candidate: &CandidateRecord, criteria: &TargetingCriteria) -> u8 {
    let target = criteria.icp.industry.trim();
    let exact = candidate
        .company
        .industry
        .as_deref()
        .map(|i| !target.is_empty() && i.trim().eq_ignore_ascii_case(target))
        .unwrap_or(false);

    let mut score: u8 = if exact { 90 } else { 70 };

    if let Some(ref sub) = criteria.icp.sub_industry {
        let sub = sub.trim();
        if !sub.is_empty()
            && candidate
                .company
                .specialties
                .iter()
                .any(|s| s.trim().eq_ignore_ascii_case(sub))
        {
            score = (score + 10).min(100);
        }
    }

    score
}

/// Product fit: base 80 (upstream candidates are assumed plausible), +10
/// capped at 100 when the company's technologies intersect the requested
/// filter technologies, case-insensitively.
pub fn product_fit(candidate: &CandidateRecord, criteria: &TargetingCriteria) -> u8 {
    let mut score: u8 = 80;

    if let Some(ref filters) = criteria.filters {
        let overlap = candidate.company.technologies.iter().any(|t| {
            filters
                .technologies
                .iter()
                .any(|wanted| wanted.trim().eq_ignore_ascii_case(t.trim()))
        });
        if overlap {
            score = (score + 10).min(100);
        }
    }

    score
}

/// Decision-making authority from the stakeholder's seniority tier.
/// Exhaustive over the closed enum; `Unknown` gets a conservative 60.
pub fn decision_making_authority(candidate: &CandidateRecord) -> u8 {
    match candidate.stakeholder.seniority {
        Seniority::CLevel => 95,
        Seniority::Vp => 90,
        Seniority::Director => 85,
        Seniority::Senior => 80,
        Seniority::Manager => 75,
        Seniority::Lead => 70,
        Seniority::Unknown => 60,
    }
}

/// Budget alignment: base 80, +10 capped at 100 when the company's employee
/// bucket falls within the ICP's employee range in bucket order. Missing or
/// unparseable labels on either side mean the bonus is simply not applied.
pub fn budget_alignment(candidate: &CandidateRecord, criteria: &TargetingCriteria) -> u8 {
    let mut score: u8 = 80;

    if let Some(ref size) = candidate.company.size {
        if within_range(size, &criteria.icp.min_employees, &criteria.icp.max_employees) {
            score = (score + 10).min(100);
        }
    }

    score
}

/// Geographic match: 95 when the company location contains the target
/// geography as a case-insensitive substring, else 70.
pub fn geographic_match(candidate: &CandidateRecord, criteria: &TargetingCriteria) -> u8 {
    let geography = criteria.icp.geography.trim().to_lowercase();
    if geography.is_empty() {
        return 70;
    }
    let matched = candidate
        .company
        .location
        .as_deref()
        .map(|loc| loc.to_lowercase().contains(&geography))
        .unwrap_or(false);
    if matched {
        95
    } else {
        70
    }
}

/// The five sub-scores for one candidate, in aggregation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionScores {
    pub industry_relevance: u8,
    pub product_fit: u8,
    pub decision_making_authority: u8,
    pub budget_alignment: u8,
    pub geographic_match: u8,
}

/// Computes all five dimension scores for a candidate.
pub fn score_dimensions(
    candidate: &CandidateRecord,
    criteria: &TargetingCriteria,
) -> DimensionScores {
    DimensionScores {
        industry_relevance: industry_relevance(candidate, criteria),
        product_fit: product_fit(candidate, criteria),
        decision_making_authority: decision_making_authority(candidate),
        budget_alignment: budget_alignment(candidate, criteria),
        geographic_match: geographic_match(candidate, criteria),
    }
}

/// Combines the five sub-scores into the composite 0-100 fit score:
/// `round(0.30*IR + 0.20*PF + 0.20*DMA + 0.15*BA + 0.15*GM)`, half-up.
///
/// Computed in integer hundredths so the rounding rule is exact. Inputs are
/// already clamped to [0,100], so the result is provably in [0,100].
pub fn fit_score(scores: &DimensionScores) -> u8 {
    let weighted = WEIGHT_INDUSTRY_RELEVANCE * scores.industry_relevance as u32
        + WEIGHT_PRODUCT_FIT * scores.product_fit as u32
        + WEIGHT_DECISION_AUTHORITY * scores.decision_making_authority as u32
        + WEIGHT_BUDGET_ALIGNMENT * scores.budget_alignment as u32
        + WEIGHT_GEOGRAPHIC_MATCH * scores.geographic_match as u32;

    ((weighted + 50) / 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyProfile, IcpProfile, StakeholderProfile, StrategicFilters};

    fn candidate() -> CandidateRecord {
        CandidateRecord {
            company: CompanyProfile {
                name: "Acme Signage".to_string(),
                industry: Some("Graphics & Signage".to_string()),
                specialties: vec!["Architectural Graphics".to_string()],
                technologies: vec!["Large Format Printing".to_string()],
                size: Some("201-500".to_string()),
                location: Some("Austin, Texas, United States".to_string()),
                ..Default::default()
            },
            stakeholder: StakeholderProfile {
                name: "Jane Roe".to_string(),
                seniority: Seniority::Vp,
                ..Default::default()
            },
        }
    }

    fn criteria() -> TargetingCriteria {
        TargetingCriteria {
            icp: IcpProfile {
                industry: "Graphics & Signage".to_string(),
                sub_industry: Some("Architectural Graphics".to_string()),
                geography: "United States".to_string(),
                min_employees: "51".to_string(),
                max_employees: "1,000".to_string(),
                ..Default::default()
            },
            filters: Some(StrategicFilters {
                technologies: vec!["large format printing".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn weights_sum_to_one() {
        assert_eq!(
            WEIGHT_INDUSTRY_RELEVANCE
                + WEIGHT_PRODUCT_FIT
                + WEIGHT_DECISION_AUTHORITY
                + WEIGHT_BUDGET_ALIGNMENT
                + WEIGHT_GEOGRAPHIC_MATCH,
            100
        );
    }

    #[test]
    fn full_match_scores() {
        let scores = score_dimensions(&candidate(), &criteria());
        assert_eq!(scores.industry_relevance, 100);
        assert_eq!(scores.product_fit, 90);
        assert_eq!(scores.decision_making_authority, 90);
        assert_eq!(scores.budget_alignment, 90);
        assert_eq!(scores.geographic_match, 95);
        assert_eq!(fit_score(&scores), 94);
    }

    #[test]
    fn bare_candidate_scores() {
        let candidate = CandidateRecord {
            company: CompanyProfile {
                name: "Ghost Co".to_string(),
                ..Default::default()
            },
            stakeholder: StakeholderProfile {
                name: "Nobody Known".to_string(),
                ..Default::default()
            },
        };
        let criteria = criteria();
        let scores = score_dimensions(&candidate, &criteria);
        assert_eq!(scores.industry_relevance, 70);
        assert_eq!(scores.product_fit, 80);
        assert_eq!(scores.decision_making_authority, 60);
        assert_eq!(scores.budget_alignment, 80);
        assert_eq!(scores.geographic_match, 70);
        // 21 + 16 + 12 + 12 + 10.5 = 71.5 rounds half-up to 72.
        assert_eq!(fit_score(&scores), 72);
    }

    #[test]
    fn inverted_employee_bounds_skip_bonus() {
        let mut criteria = criteria();
        criteria.icp.min_employees = "1,000".to_string();
        criteria.icp.max_employees = "51".to_string();
        assert_eq!(budget_alignment(&candidate(), &criteria), 80);
    }

    #[test]
    fn tech_match_is_case_insensitive() {
        let mut criteria = criteria();
        criteria.filters.as_mut().unwrap().technologies =
            vec!["LARGE FORMAT PRINTING".to_string()];
        assert_eq!(product_fit(&candidate(), &criteria), 90);
    }

    #[test]
    fn empty_geography_is_neutral() {
        let mut criteria = criteria();
        criteria.icp.geography = String::new();
        assert_eq!(geographic_match(&candidate(), &criteria), 70);
    }

    #[test]
    fn authority_table_is_monotone() {
        let tiers = [
            Seniority::Unknown,
            Seniority::Lead,
            Seniority::Manager,
            Seniority::Senior,
            Seniority::Director,
            Seniority::Vp,
            Seniority::CLevel,
        ];
        let mut candidate = candidate();
        let mut last = 0;
        for tier in tiers {
            candidate.stakeholder.seniority = tier;
            let score = decision_making_authority(&candidate);
            assert!(score > last, "{:?} should outrank the previous tier", tier);
            last = score;
        }
    }
}
