use crate::circuit_breaker::{create_llm_circuit_breaker, LlmCircuitBreaker};
use crate::config::Config;
use crate::errors::{LeadGenError, ResultExt};
use crate::models::{
    CandidateRecord, CompanyProfile, EnrichmentData, MatchDetails, Seniority, StakeholderProfile,
    TargetingCriteria,
};
use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as _;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Upstream generator of candidate company + stakeholder pairs.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Returns up to `count` candidates matching the criteria. Errors are
    /// batch-level and classified (invalid key, quota, rate limit, transient).
    async fn generate(
        &self,
        criteria: &TargetingCriteria,
        count: usize,
    ) -> Result<Vec<CandidateRecord>, LeadGenError>;
}

/// Narrative text generation, grounded on the locally computed match details.
/// The numbers are the system of record; this collaborator only writes prose.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn match_reason(
        &self,
        candidate: &CandidateRecord,
        criteria: &TargetingCriteria,
        details: &MatchDetails,
    ) -> Result<String, LeadGenError>;

    async fn outreach_message(
        &self,
        candidate: &CandidateRecord,
        criteria: &TargetingCriteria,
        match_reason: &str,
    ) -> Result<String, LeadGenError>;
}

/// Best-effort company enrichment. Failures are non-fatal to assembly.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    async fn enrich(&self, company: &CompanyProfile) -> Result<EnrichmentData, LeadGenError>;
}

// ============ OpenAI ============

const MAX_ATTEMPTS: u32 = 3;

/// OpenAI chat-completions client implementing all three collaborator
/// contracts. Calls are gated by a circuit breaker and retried with
/// exponential backoff on rate-limit/transient classifications.
pub struct OpenAiService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    breaker: LlmCircuitBreaker,
}

impl OpenAiService {
    pub fn new(config: &Config) -> Result<Self, LeadGenError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                LeadGenError::Internal(format!("Failed to create OpenAI client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            breaker: create_llm_circuit_breaker(),
        })
    }

    /// Issues one chat completion with retry and circuit breaking.
    async fn chat(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<String, LeadGenError> {
        let mut delay = Duration::from_millis(500);
        let mut attempt = 1;

        loop {
            match self.breaker.call(self.send_chat(system, user, json_mode)).await {
                Ok(content) => return Ok(content),
                Err(failsafe::Error::Rejected) => {
                    tracing::warn!("LLM circuit breaker open, failing fast");
                    return Err(LeadGenError::TransientUpstream(
                        "LLM circuit breaker open".to_string(),
                    ));
                }
                Err(failsafe::Error::Inner(e)) => {
                    if e.is_transient() && attempt < MAX_ATTEMPTS {
                        tracing::warn!(
                            "OpenAI call failed (attempt {}/{}), retrying in {:?}: {}",
                            attempt,
                            MAX_ATTEMPTS,
                            delay,
                            e
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                        attempt += 1;
                    } else {
                        return Err(e);
                    }
                }
            }
        }
    }

    async fn send_chat(
        &self,
        system: &str,
        user: &str,
        json_mode: bool,
    ) -> Result<String, LeadGenError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": 0.7,
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("OpenAI returned error {}: {}", status, error_text);
            return Err(classify_openai_error(status, &error_text));
        }

        let payload: Value = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                LeadGenError::TransientUpstream(
                    "OpenAI response missing message content".to_string(),
                )
            })
    }
}

/// Maps an OpenAI HTTP error onto the shared taxonomy. A 429 splits on the
/// `insufficient_quota` body code: quota problems are terminal, plain rate
/// limits are retriable.
pub fn classify_openai_error(status: StatusCode, body: &str) -> LeadGenError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LeadGenError::InvalidApiKey(
            "OpenAI rejected the API key; check OPENAI_API_KEY".to_string(),
        ),
        StatusCode::TOO_MANY_REQUESTS => {
            if body.contains("insufficient_quota") {
                LeadGenError::QuotaExceeded(
                    "OpenAI API quota exceeded; check billing details".to_string(),
                )
            } else {
                LeadGenError::RateLimitExceeded(
                    "OpenAI rate limit exceeded; retry after a few minutes".to_string(),
                )
            }
        }
        s if s.is_server_error() => {
            LeadGenError::TransientUpstream(format!("OpenAI returned {}", s))
        }
        s => LeadGenError::Internal(format!("OpenAI returned unexpected status {}: {}", s, body)),
    }
}

#[async_trait]
impl CandidateSource for OpenAiService {
    async fn generate(
        &self,
        criteria: &TargetingCriteria,
        count: usize,
    ) -> Result<Vec<CandidateRecord>, LeadGenError> {
        tracing::info!(
            "Requesting {} candidates from OpenAI for event '{}'",
            count,
            criteria.event.name
        );

        let prompt = build_candidate_prompt(criteria, count);
        let content = self
            .chat(
                "You are an assistant that researches B2B sales candidates. You return factual \
                 company and stakeholder profiles matching the provided criteria. You never \
                 invent scores or assessments; you report facts only.",
                &prompt,
                true,
            )
            .await?;

        let payload: Value = serde_json::from_str(&content).map_err(|e| {
            LeadGenError::TransientUpstream(format!(
                "OpenAI candidate payload was not valid JSON: {}",
                e
            ))
        })?;

        let raw = payload
            .get("candidates")
            .cloned()
            .unwrap_or(Value::Array(vec![]));

        let mut candidates: Vec<CandidateRecord> =
            serde_json::from_value(raw).map_err(|e| {
                LeadGenError::TransientUpstream(format!(
                    "OpenAI candidate payload had unexpected shape: {}",
                    e
                ))
            })?;

        candidates.truncate(count);
        for candidate in &mut candidates {
            candidate.normalize();
        }

        tracing::info!("✓ OpenAI returned {} candidates", candidates.len());
        Ok(candidates)
    }
}

#[async_trait]
impl TextGenerator for OpenAiService {
    async fn match_reason(
        &self,
        candidate: &CandidateRecord,
        criteria: &TargetingCriteria,
        details: &MatchDetails,
    ) -> Result<String, LeadGenError> {
        let prompt = build_match_reason_prompt(candidate, criteria, details);
        let reason = self
            .chat(
                "You are an assistant that summarizes why a sales lead matches an ideal \
                 customer profile. You ground every claim in the assessment you are given.",
                &prompt,
                false,
            )
            .await?;
        Ok(reason.trim().to_string())
    }

    async fn outreach_message(
        &self,
        candidate: &CandidateRecord,
        criteria: &TargetingCriteria,
        match_reason: &str,
    ) -> Result<String, LeadGenError> {
        let prompt = build_outreach_prompt(candidate, criteria, match_reason);
        let message = self
            .chat(
                "You are an assistant that writes personalized, professional, and effective \
                 outreach messages for sales teams.",
                &prompt,
                false,
            )
            .await?;
        Ok(message.trim().to_string())
    }
}

#[async_trait]
impl EnrichmentSource for OpenAiService {
    async fn enrich(&self, company: &CompanyProfile) -> Result<EnrichmentData, LeadGenError> {
        let prompt = build_enrichment_prompt(company);
        let content = self
            .chat(
                "You are an assistant that provides realistic company enrichment data based \
                 on limited information.",
                &prompt,
                true,
            )
            .await?;

        let data: EnrichmentData = serde_json::from_str(&content).map_err(|e| {
            LeadGenError::TransientUpstream(format!(
                "OpenAI enrichment payload had unexpected shape: {}",
                e
            ))
        })?;
        Ok(data)
    }
}

// ============ Prompt builders ============

fn build_candidate_prompt(criteria: &TargetingCriteria, count: usize) -> String {
    let icp = &criteria.icp;
    let event = &criteria.event;

    let mut prompt = format!(
        "I need you to identify {count} candidate companies and stakeholders for B2B outreach \
         based on the following criteria:\n\n\
         ## Event Information\n\
         - Event Name: {}\n\
         - Event Date: {}\n\
         - Event Location: {}\n\n\
         ## Ideal Customer Profile\n\
         - Industry: {}\n",
        event.name, event.date, event.location, icp.industry,
    );

    if let Some(ref sub) = icp.sub_industry {
        prompt.push_str(&format!("- Sub-Industry: {}\n", sub));
    }
    prompt.push_str(&format!(
        "- Revenue Range: {} to {}\n- Geography: {}\n- Employee Count: {} to {}\n",
        icp.min_revenue, icp.max_revenue, icp.geography, icp.min_employees, icp.max_employees,
    ));
    if let Some(ref extra) = icp.additional_criteria {
        prompt.push_str(&format!("- Additional Criteria: {}\n", extra));
    }

    prompt.push_str("\n## Target Personas\n");
    for persona in &criteria.personas {
        prompt.push_str(&format!(
            "- {}: {} ({})\n",
            persona.persona_type, persona.titles, persona.department
        ));
    }

    if let Some(ref filters) = criteria.filters {
        prompt.push_str("\n## Additional Filters\n");
        if !filters.technologies.is_empty() {
            prompt.push_str(&format!(
                "- Technologies: {}\n",
                filters.technologies.join(", ")
            ));
        }
        if let Some(ref funding) = filters.funding_status {
            prompt.push_str(&format!("- Funding Status: {}\n", funding));
        }
        if let Some(ref growth) = filters.growth {
            prompt.push_str(&format!("- Growth Rate: {}\n", growth));
        }
        if !filters.recent_events.is_empty() {
            prompt.push_str(&format!(
                "- Recent Events: {}\n",
                filters.recent_events.join(", ")
            ));
        }
        if !filters.keywords.is_empty() {
            prompt.push_str(&format!("- Keywords: {}\n", filters.keywords.join(", ")));
        }
    }

    prompt.push_str(
        r#"
Please provide the results in the following JSON format:
{
  "candidates": [
    {
      "company": {
        "name": "Company Name",
        "website": "company-website.com",
        "description": "Brief company description",
        "industry": "Specific industry",
        "subIndustry": "Sub-industry if applicable",
        "size": "Employee count range",
        "revenue": "Revenue range",
        "location": "Headquarters location",
        "founded": "Year founded",
        "linkedInUrl": "https://linkedin.com/company/companyname",
        "specialties": ["Specialty 1", "Specialty 2"],
        "technologies": ["Technology 1", "Technology 2"]
      },
      "stakeholder": {
        "name": "Full Name",
        "title": "Job Title",
        "department": "Department",
        "seniority": "C-Level | VP | Director | Senior | Manager | Lead",
        "linkedInUrl": "https://linkedin.com/in/firstname-lastname-123abc",
        "email": "email@domain.com (only if known)",
        "phone": "phone number (only if known)"
      }
    }
  ]
}

Please ensure:
1. All data is realistic and plausible
2. Companies chosen would likely attend this type of event
3. Stakeholders have appropriate titles based on the requested personas
4. Location info is consistent with the specified geography
5. Company details match the specified industry or sub-industry
6. Company sizes and revenues are within the specified ranges
7. Report facts only: no scores, ratings, or fit assessments of any kind
8. Omit contact fields entirely rather than inventing placeholder values
"#,
    );

    prompt
}

fn build_match_reason_prompt(
    candidate: &CandidateRecord,
    criteria: &TargetingCriteria,
    details: &MatchDetails,
) -> String {
    format!(
        "Write a 1-2 sentence explanation of why this company matches our ideal customer \
         profile, grounded strictly in the computed assessment below.\n\n\
         Company: {}\n\
         Industry: {}\n\
         Stakeholder: {} ({})\n\
         Target ICP industry: {}\n\n\
         Computed assessment (0-100):\n\
         - Industry relevance: {}\n\
         - Product fit: {}\n\
         - Decision-making authority: {}\n\
         - Budget alignment: {}\n\
         - Geographic match: {}\n\
         Matching criteria:\n{}\n\n\
         Do not invent facts beyond the assessment. Do not quote the numbers verbatim; \
         describe what they imply.",
        candidate.company.name,
        candidate.company.industry.as_deref().unwrap_or("unknown"),
        candidate.stakeholder.name,
        candidate.stakeholder.title.as_deref().unwrap_or("unknown title"),
        criteria.icp.industry,
        details.industry_relevance,
        details.product_fit,
        details.decision_making_authority,
        details.budget_alignment,
        details.geographic_match,
        details
            .matching_criteria
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn build_outreach_prompt(
    candidate: &CandidateRecord,
    criteria: &TargetingCriteria,
    match_reason: &str,
) -> String {
    format!(
        "Generate a personalized outreach message for a potential lead with the following \
         details:\n\
         - Event: {} on {} in {}\n\
         - Company Name: {}\n\
         - Stakeholder Name: {}\n\
         - Stakeholder Title: {}\n\
         - Industry: {}\n\
         - Why this company fits our ICP: {}\n\n\
         The message should:\n\
         1. Reference the upcoming event\n\
         2. Be personalized to the stakeholder's role and industry\n\
         3. Include a clear call to action to schedule a meeting at the event\n\
         4. Be brief (3-4 sentences), professional, and direct\n\
         5. Not sound like generic marketing language\n\
         6. Avoid phrases like \"I hope this email finds you well\"\n\n\
         Message:",
        criteria.event.name,
        criteria.event.date,
        criteria.event.location,
        candidate.company.name,
        candidate.stakeholder.name,
        candidate.stakeholder.title.as_deref().unwrap_or("unknown"),
        candidate
            .company
            .industry
            .as_deref()
            .unwrap_or(&criteria.icp.industry),
        match_reason,
    )
}

fn build_enrichment_prompt(company: &CompanyProfile) -> String {
    format!(
        "Provide enrichment data for the following company:\n\
         - Company Name: {}\n\
         - Industry: {}\n\
         - Description: {}\n\n\
         Please return data in this JSON format:\n\
         {{\n\
           \"technologies\": [\"technology1\", \"technology2\", \"technology3\"],\n\
           \"fundingInfo\": \"Brief description of recent funding rounds or financial status\",\n\
           \"recentNews\": [\"News item 1\", \"News item 2\"],\n\
           \"competitors\": [\"Competitor 1\", \"Competitor 2\", \"Competitor 3\"]\n\
         }}\n\n\
         All data should be realistic and contextually appropriate for a company in this \
         industry. If you don't have enough information, make educated guesses based on \
         typical companies in this space.",
        company.name,
        company.industry.as_deref().unwrap_or("Unknown"),
        company.description.as_deref().unwrap_or(""),
    )
}

// ============ Professional network ============

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProNetCompany {
    #[serde(default)]
    name: String,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    revenue: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    founded: Option<String>,
    #[serde(default, rename = "linkedInUrl")]
    linkedin_url: Option<String>,
    #[serde(default)]
    specialties: Vec<String>,
    #[serde(default)]
    technologies: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProNetPerson {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    company: String,
    #[serde(default, rename = "linkedInUrl")]
    linkedin_url: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    seniority: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProNetSearchResponse<T> {
    #[serde(default)]
    elements: Vec<T>,
}

/// Professional-network candidate source with the fixed company/people search
/// contract. Constructed only when a network API key is configured; the
/// OpenAI source is the default.
pub struct ProNetService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ProNetService {
    /// Returns `None` when no network key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>, LeadGenError> {
        let api_key = match config.pronet_api_key {
            Some(ref key) => key.clone(),
            None => return Ok(None),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                LeadGenError::Internal(format!("Failed to create network client: {}", e))
            })?;

        Ok(Some(Self {
            client,
            base_url: config.pronet_base_url.clone(),
            api_key,
        }))
    }

    // The `Default` bound comes from `#[serde(default)]` on the response
    // envelope's `elements` field.
    async fn post_search<T: serde::de::DeserializeOwned + Default>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<Vec<T>, LeadGenError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Network API request to {} failed", path))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Network API returned error {}: {}", status, error_text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LeadGenError::InvalidApiKey(
                    "Network API rejected the API key; check PRONET_API_KEY".to_string(),
                ),
                StatusCode::TOO_MANY_REQUESTS => LeadGenError::RateLimitExceeded(
                    "Network API rate limit exceeded".to_string(),
                ),
                s if s.is_server_error() => {
                    LeadGenError::TransientUpstream(format!("Network API returned {}", s))
                }
                s => LeadGenError::Internal(format!(
                    "Network API returned unexpected status {}: {}",
                    s, error_text
                )),
            });
        }

        let payload: ProNetSearchResponse<T> = response
            .json()
            .await
            .context("Failed to parse network search response")?;

        Ok(payload.elements)
    }

    /// Matches a person against the requested personas by title keyword or
    /// department, case-insensitively. With no personas, everyone matches.
    fn matches_persona(person: &ProNetPerson, criteria: &TargetingCriteria) -> bool {
        if criteria.personas.is_empty() {
            return true;
        }
        let title = person
            .title
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let department = person
            .department
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        criteria.personas.iter().any(|persona| {
            let dept_match = !persona.department.trim().is_empty()
                && department.contains(&persona.department.trim().to_lowercase());
            let title_match = persona
                .title_set()
                .iter()
                .any(|t| title.contains(&t.to_lowercase()));
            dept_match || title_match
        })
    }
}

#[async_trait]
impl CandidateSource for ProNetService {
    async fn generate(
        &self,
        criteria: &TargetingCriteria,
        count: usize,
    ) -> Result<Vec<CandidateRecord>, LeadGenError> {
        let icp = &criteria.icp;

        tracing::info!(
            "Searching network for companies in '{}' ({})",
            icp.industry,
            icp.geography
        );

        let companies: Vec<ProNetCompany> = self
            .post_search(
                "/companies/search",
                json!({
                    "filters": {
                        "industry": icp.industry,
                        "subIndustry": icp.sub_industry,
                        "revenue": { "min": icp.min_revenue, "max": icp.max_revenue },
                        "employeeCount": { "min": icp.min_employees, "max": icp.max_employees },
                        "location": icp.geography,
                    },
                    "count": 100,
                }),
            )
            .await?;

        let titles: Vec<String> = criteria
            .personas
            .iter()
            .flat_map(|p| p.title_set())
            .collect();
        let departments: Vec<String> = criteria
            .personas
            .iter()
            .map(|p| p.department.clone())
            .filter(|d| !d.trim().is_empty())
            .collect();

        let people: Vec<ProNetPerson> = self
            .post_search(
                "/people/search",
                json!({
                    "filters": {
                        "industry": icp.industry,
                        "titles": titles,
                        "departments": departments,
                        "location": icp.geography,
                    },
                    "count": 100,
                }),
            )
            .await?;

        // Pair each company with its best persona-matching contact; companies
        // with no usable contact are skipped.
        let mut candidates = Vec::new();
        for company in companies {
            if candidates.len() >= count {
                break;
            }
            let contact = people.iter().find(|p| {
                p.company.eq_ignore_ascii_case(&company.name)
                    && Self::matches_persona(p, criteria)
            });
            let contact = match contact {
                Some(c) => c,
                None => {
                    tracing::debug!("No persona match at '{}', skipping", company.name);
                    continue;
                }
            };

            let seniority = contact
                .seniority
                .as_deref()
                .map(Seniority::parse)
                .unwrap_or(Seniority::Unknown);

            let mut candidate = CandidateRecord {
                company: CompanyProfile {
                    name: company.name,
                    website: company.website,
                    description: company.description,
                    industry: company.industry,
                    sub_industry: None,
                    size: company.size,
                    revenue: company.revenue,
                    location: company.location,
                    founded: company.founded,
                    linkedin_url: company.linkedin_url,
                    specialties: company.specialties,
                    technologies: company.technologies,
                },
                stakeholder: StakeholderProfile {
                    name: format!("{} {}", contact.first_name, contact.last_name)
                        .trim()
                        .to_string(),
                    title: contact.title.clone(),
                    department: contact.department.clone(),
                    seniority,
                    linkedin_url: contact.linkedin_url.clone(),
                    email: contact.email.clone(),
                    phone: contact.phone.clone(),
                },
            };
            candidate.normalize();
            candidates.push(candidate);
        }

        tracing::info!("✓ Network search produced {} candidates", candidates.len());
        Ok(candidates)
    }
}
