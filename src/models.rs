use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============ Targeting Criteria ============

/// Ideal Customer Profile: the target-company criteria a user defines to
/// constrain lead search.
///
/// Revenue and employee bounds are free-text bucket labels ("$10M", "1,000+",
/// "201-500") ordered by the shared parser in [`crate::buckets`]. Bounds that
/// fail to parse, or an inverted range, simply mean no range constraint is
/// satisfied; they are never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcpProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_industry: Option<String>,
    #[serde(default)]
    pub min_revenue: String,
    #[serde(default)]
    pub max_revenue: String,
    #[serde(default)]
    pub geography: String,
    #[serde(default)]
    pub min_employees: String,
    #[serde(default)]
    pub max_employees: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_criteria: Option<String>,
}

/// The event whose attendees are being targeted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProfile {
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
}

/// A target-stakeholder archetype: job titles plus a department.
///
/// `titles` is comma-separated free text; semantically it is a set, exposed
/// parsed via [`Persona::title_set`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    #[serde(rename = "type")]
    pub persona_type: String,
    #[serde(default)]
    pub titles: String,
    #[serde(default)]
    pub department: String,
}

impl Persona {
    /// Parses the comma-separated `titles` field into a trimmed, non-empty set.
    pub fn title_set(&self) -> Vec<String> {
        self.titles
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Optional strategic filters narrowing the search beyond the ICP.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicFilters {
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<String>,
    #[serde(default)]
    pub recent_events: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Everything the scoring core consumes: ICP, event, personas and filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetingCriteria {
    pub icp: IcpProfile,
    pub event: EventProfile,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<StrategicFilters>,
}

// ============ Candidate Records ============

/// Company facts as returned by upstream generators/lookups. Best-effort:
/// every non-identity field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_industry: Option<String>,
    /// Employee-count bucket label, e.g. "201-500" or "1,000+".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Revenue bucket label, e.g. "$10M-$50M".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<String>,
    #[serde(
        default,
        rename = "linkedInUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Stakeholder seniority tier.
///
/// Upstream sources report this as free text; modelling it as a closed enum
/// with an explicit `Unknown` keeps the decision-authority table exhaustive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seniority {
    #[serde(
        rename = "C-Level",
        alias = "CLevel",
        alias = "c-level",
        alias = "C-level"
    )]
    CLevel,
    #[serde(rename = "VP", alias = "vp", alias = "Vp")]
    Vp,
    #[serde(alias = "director")]
    Director,
    #[serde(alias = "senior")]
    Senior,
    #[serde(alias = "manager")]
    Manager,
    #[serde(alias = "lead")]
    Lead,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Seniority {
    /// Parses an upstream free-text seniority label. Unrecognized labels map
    /// to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "c-level" | "clevel" | "c level" | "c-suite" | "cxo" | "executive" => {
                Seniority::CLevel
            }
            "vp" | "vice president" | "vice-president" => Seniority::Vp,
            "director" => Seniority::Director,
            "senior" => Seniority::Senior,
            "manager" => Seniority::Manager,
            "lead" => Seniority::Lead,
            _ => Seniority::Unknown,
        }
    }

    /// Infers a tier from a job title when the upstream seniority field is
    /// absent. Conservative: anything unrecognized stays `Unknown`.
    pub fn infer_from_title(title: &str) -> Self {
        let t = title.trim().to_lowercase();
        if t.is_empty() {
            return Seniority::Unknown;
        }
        let c_suite = ["ceo", "cto", "cfo", "coo", "cmo", "cio", "cro"];
        if t.contains("chief")
            || c_suite.iter().any(|c| t == *c || t.starts_with(&format!("{} ", c)))
            || (t.contains("president") && !t.contains("vice"))
            || t.contains("founder")
            || t.contains("owner")
        {
            Seniority::CLevel
        } else if t.contains("vice president") || t.starts_with("vp") || t.contains(" vp ") {
            Seniority::Vp
        } else if t.contains("director") || t.contains("head of") {
            Seniority::Director
        } else if t.contains("senior") {
            Seniority::Senior
        } else if t.contains("manager") {
            Seniority::Manager
        } else if t.contains("lead") {
            Seniority::Lead
        } else {
            Seniority::Unknown
        }
    }

    /// Display label, matching the upstream wire vocabulary.
    pub fn as_str(&self) -> &'static str {
        match self {
            Seniority::CLevel => "C-Level",
            Seniority::Vp => "VP",
            Seniority::Director => "Director",
            Seniority::Senior => "Senior",
            Seniority::Manager => "Manager",
            Seniority::Lead => "Lead",
            Seniority::Unknown => "Unknown",
        }
    }
}

/// Stakeholder facts as returned by upstream generators/lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub seniority: Seniority,
    #[serde(
        default,
        rename = "linkedInUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// An unscored company + stakeholder pair proposed by an upstream generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub company: CompanyProfile,
    pub stakeholder: StakeholderProfile,
}

impl CandidateRecord {
    /// Normalizes a freshly deserialized candidate: when the upstream
    /// seniority field was absent, infer the tier from the job title.
    pub fn normalize(&mut self) {
        if self.stakeholder.seniority == Seniority::Unknown {
            if let Some(ref title) = self.stakeholder.title {
                self.stakeholder.seniority = Seniority::infer_from_title(title);
            }
        }
    }
}

// ============ Scored Leads ============

/// Lead lifecycle status. Owned by the surrounding application; the core
/// always emits `New`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Approved,
    Rejected,
}

/// Per-dimension breakdown underlying the fit score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub industry_relevance: u8,
    pub product_fit: u8,
    pub decision_making_authority: u8,
    pub budget_alignment: u8,
    pub geographic_match: u8,
    pub company_size: String,
    pub matching_criteria: Vec<String>,
}

/// Supplementary company facts attached to a lead but never used in scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentData {
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_info: Option<String>,
    #[serde(default)]
    pub recent_news: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

/// A scored, assembled lead.
///
/// Scoring fields are write-once: constructed by the assembler, never
/// recomputed by later status or message edits. `id` is assigned by the
/// storage layer, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub company: CompanyProfile,
    pub stakeholder: StakeholderProfile,
    pub fit_score: u8,
    pub match_details: MatchDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outreach_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_data: Option<EnrichmentData>,
}

// ============ Generation Requests & Outcomes ============

/// A single batch generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub criteria: TargetingCriteria,
    pub count: usize,
    #[serde(default)]
    pub include_enrichment: bool,
    #[serde(default)]
    pub generate_messages: bool,
}

/// A per-candidate failure recorded in the batch outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stakeholder: Option<String>,
    pub code: String,
    pub message: String,
}

/// Aggregate result of a generation batch. Leads carry no ordering guarantee;
/// callers sort/filter by score afterward.
///
/// `failed` counts candidates that produced no lead. `failures` additionally
/// records non-fatal collaborator errors for leads that were still produced,
/// so partial success is always reportable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub batch_id: Uuid,
    pub leads: Vec<Lead>,
    pub failures: Vec<CandidateFailure>,
    pub requested: usize,
    pub generated: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub generated_at: DateTime<Utc>,
}
