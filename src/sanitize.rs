//! Contact-field sanitization for upstream candidate records.
//!
//! LLM and network lookups are best-effort and routinely invent contact
//! details. Invalid emails, phones and profile URLs are dropped from the
//! candidate rather than failing it; only missing identity fields (company
//! name, stakeholder name) make a candidate malformed.

use crate::models::CandidateRecord;
use phonenumber::Mode;
use regex::Regex;
use url::Url;

/// Validate email address
///
/// Checks for:
/// - Basic email format (contains @ and .)
/// - Fake/placeholder patterns (repeated digits like 9999, 1111)
/// - Minimum length requirements
/// - Valid domain structure
pub fn is_valid_email(email: &str) -> bool {
    // Basic checks
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // Detect fake patterns (repeated digits)
    let fake_patterns = [
        "999999",    // Common fake: 1199999999333@gmail.com
        "111111",    // Common fake: 1111111111@
        "000000",    // Common fake: 000000@
        "123456789", // Sequential fake
    ];

    for pattern in &fake_patterns {
        if email.contains(pattern) {
            tracing::warn!(
                "❌ Invalid email detected (fake pattern '{}'): {}",
                pattern,
                email
            );
            return false;
        }
    }

    // Placeholder emails the generator emits when it has nothing real
    if email.contains("example.com") || email.to_lowercase().contains("if available") {
        tracing::warn!("❌ Placeholder email rejected: {}", email);
        return false;
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let email_regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    if !email_regex.is_match(email) {
        tracing::warn!("❌ Invalid email format: {}", email);
        return false;
    }

    true
}

/// Validate and normalize a phone number to E.164.
///
/// Upstream sources span geographies, so parsing is region-less and requires
/// an international prefix. Returns the normalized `+<country><number>` form,
/// or `None` when the number cannot be validated.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() < 8 {
        return None;
    }

    match phonenumber::parse(None, trimmed) {
        Ok(number) => {
            if phonenumber::is_valid(&number) {
                let formatted = number.format().mode(Mode::E164).to_string();
                tracing::debug!("✓ Valid phone: {} → {}", trimmed, formatted);
                Some(formatted)
            } else {
                tracing::warn!("❌ Invalid phone number: {}", trimmed);
                None
            }
        }
        Err(e) => {
            tracing::warn!("❌ Failed to parse phone '{}': {:?}", trimmed, e);
            None
        }
    }
}

/// Validate a LinkedIn profile/company URL.
///
/// Accepts only https?:// URLs whose host is linkedin.com (or a subdomain)
/// and whose path is a /in/ or /company/ profile.
pub fn is_valid_linkedin_url(raw: &str) -> bool {
    let parsed = match Url::parse(raw.trim()) {
        Ok(u) => u,
        Err(_) => return false,
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let host = match parsed.host_str() {
        Some(h) => h.to_lowercase(),
        None => return false,
    };
    if host != "linkedin.com" && !host.ends_with(".linkedin.com") {
        return false;
    }
    let path = parsed.path();
    (path.starts_with("/in/") && path.len() > 4)
        || (path.starts_with("/company/") && path.len() > 9)
}

/// Strips invalid contact fields from a candidate in place. Identity fields
/// are left untouched; malformedness is judged separately by the batch
/// workflow.
pub fn sanitize_candidate(candidate: &mut CandidateRecord) {
    if let Some(ref email) = candidate.stakeholder.email {
        if !is_valid_email(email) {
            tracing::warn!(
                "Dropping invalid email for stakeholder '{}'",
                candidate.stakeholder.name
            );
            candidate.stakeholder.email = None;
        }
    }

    if let Some(ref phone) = candidate.stakeholder.phone {
        match normalize_phone(phone) {
            Some(normalized) => candidate.stakeholder.phone = Some(normalized),
            None => {
                tracing::warn!(
                    "Dropping invalid phone for stakeholder '{}'",
                    candidate.stakeholder.name
                );
                candidate.stakeholder.phone = None;
            }
        }
    }

    if let Some(ref url) = candidate.stakeholder.linkedin_url {
        if !is_valid_linkedin_url(url) {
            candidate.stakeholder.linkedin_url = None;
        }
    }

    if let Some(ref url) = candidate.company.linkedin_url {
        if !is_valid_linkedin_url(url) {
            candidate.company.linkedin_url = None;
        }
    }
}

/// Whether a candidate carries the identity fields required to become a lead.
pub fn is_malformed(candidate: &CandidateRecord) -> bool {
    candidate.company.name.trim().is_empty() || candidate.stakeholder.name.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompanyProfile, StakeholderProfile};

    #[test]
    fn linkedin_urls() {
        assert!(is_valid_linkedin_url("https://linkedin.com/in/jane-roe-123abc"));
        assert!(is_valid_linkedin_url("https://www.linkedin.com/company/acme-signage"));
        assert!(!is_valid_linkedin_url("https://linkedin.com/"));
        assert!(!is_valid_linkedin_url("https://evil.com/in/jane"));
        assert!(!is_valid_linkedin_url("https://notlinkedin.com.evil.com/in/jane"));
        assert!(!is_valid_linkedin_url("not a url"));
    }

    #[test]
    fn placeholder_emails_rejected() {
        assert!(!is_valid_email("jane@example.com"));
        assert!(!is_valid_email("email@domain.com (if available)"));
        assert!(is_valid_email("jane.roe@acmesignage.com"));
    }

    #[test]
    fn sanitize_drops_bad_contacts_keeps_identity() {
        let mut candidate = CandidateRecord {
            company: CompanyProfile {
                name: "Acme Signage".to_string(),
                linkedin_url: Some("https://linkedin.com/company/acme".to_string()),
                ..Default::default()
            },
            stakeholder: StakeholderProfile {
                name: "Jane Roe".to_string(),
                email: Some("fake999999@gmail.com".to_string()),
                phone: Some("not-a-phone".to_string()),
                linkedin_url: Some("https://evil.com/in/jane".to_string()),
                ..Default::default()
            },
        };
        sanitize_candidate(&mut candidate);
        assert_eq!(candidate.stakeholder.email, None);
        assert_eq!(candidate.stakeholder.phone, None);
        assert_eq!(candidate.stakeholder.linkedin_url, None);
        assert!(candidate.company.linkedin_url.is_some());
        assert!(!is_malformed(&candidate));
    }

    #[test]
    fn malformed_when_identity_missing() {
        let candidate = CandidateRecord {
            company: CompanyProfile {
                name: "Acme Signage".to_string(),
                ..Default::default()
            },
            stakeholder: StakeholderProfile {
                name: "   ".to_string(),
                ..Default::default()
            },
        };
        assert!(is_malformed(&candidate));
    }

    #[test]
    fn international_phone_normalizes() {
        assert_eq!(
            normalize_phone("+1 650 253 0000"),
            Some("+16502530000".to_string())
        );
        assert_eq!(normalize_phone("123"), None);
        assert_eq!(normalize_phone(""), None);
    }
}
