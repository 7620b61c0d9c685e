/// Integration tests with mocked external APIs
/// Tests the complete generation workflow without hitting real external services
use std::sync::Arc;

use leadgen_engine::assembler::LeadAssembler;
use leadgen_engine::config::Config;
use leadgen_engine::generation::GenerationEngine;
use leadgen_engine::models::{
    EventProfile, GenerationRequest, IcpProfile, Persona, Seniority, TargetingCriteria,
};
use leadgen_engine::services::{CandidateSource, OpenAiService, ProNetService};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to create test config
fn create_test_config(openai_base_url: String) -> Config {
    Config {
        openai_api_key: "sk-test-key-123".to_string(),
        openai_base_url,
        openai_model: "gpt-4o".to_string(),
        pronet_api_key: None,
        pronet_base_url: "https://api.linkedin.com/v2".to_string(),
        request_timeout_secs: 5,
        max_concurrency: 4,
        lead_cache_capacity: 100,
        lead_cache_ttl_secs: 60,
    }
}

fn test_criteria() -> TargetingCriteria {
    TargetingCriteria {
        icp: IcpProfile {
            industry: "Graphics & Signage".to_string(),
            geography: "United States".to_string(),
            min_employees: "51".to_string(),
            max_employees: "1,000".to_string(),
            ..Default::default()
        },
        event: EventProfile {
            name: "ISA Sign Expo".to_string(),
            date: "2026-04-10".to_string(),
            location: "Orlando, FL".to_string(),
        },
        personas: vec![Persona {
            persona_type: "Decision Maker".to_string(),
            titles: "CEO, VP of Operations".to_string(),
            department: "Operations".to_string(),
        }],
        filters: None,
    }
}

/// Wraps chat content in the OpenAI chat-completions response envelope.
fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [
            {"message": {"role": "assistant", "content": content}}
        ]
    })
}

fn candidate_payload() -> String {
    serde_json::json!({
        "candidates": [
            {
                "company": {
                    "name": "Summit Graphics Group",
                    "industry": "Graphics & Signage",
                    "size": "201-500",
                    "location": "Denver, Colorado, United States"
                },
                "stakeholder": {
                    "name": "Dana Whitfield",
                    "title": "VP of Operations",
                    "seniority": "VP"
                }
            },
            {
                "company": {
                    "name": "Ghost Signworks",
                    "industry": "Graphics & Signage"
                },
                "stakeholder": {
                    "name": "Riley Marsh",
                    "title": "Director of Procurement"
                }
            }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn openai_candidate_generation_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("candidate companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&candidate_payload())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let candidates = service.generate(&test_criteria(), 2).await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].company.name, "Summit Graphics Group");
    assert_eq!(candidates[0].stakeholder.seniority, Seniority::Vp);
    // Seniority missing upstream is inferred from the title.
    assert_eq!(candidates[1].stakeholder.seniority, Seniority::Director);
}

#[tokio::test]
async fn openai_truncates_overdelivery() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&candidate_payload())))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let candidates = service.generate(&test_criteria(), 1).await.unwrap();
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn openai_invalid_key_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string(
            r#"{"error":{"code":"invalid_api_key","message":"Incorrect API key provided"}}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let err = service.generate(&test_criteria(), 2).await.unwrap_err();
    assert_eq!(err.code(), "invalid_api_key");
}

#[tokio::test]
async fn openai_quota_exhaustion_is_terminal() {
    let mock_server = MockServer::start().await;

    // 429 with insufficient_quota is not retriable: exactly one request.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string(
            r#"{"error":{"code":"insufficient_quota","message":"You exceeded your current quota"}}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let err = service.generate(&test_criteria(), 2).await.unwrap_err();
    assert_eq!(err.code(), "quota_exceeded");
}

#[tokio::test]
async fn openai_rate_limit_retries_then_fails() {
    let mock_server = MockServer::start().await;

    // A plain 429 is retried up to the attempt budget.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_string(r#"{"error":{"code":"rate_limit_exceeded"}}"#),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let err = service.generate(&test_criteria(), 2).await.unwrap_err();
    assert_eq!(err.code(), "rate_limit_exceeded");
}

#[tokio::test]
async fn openai_server_error_retries_then_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let err = service.generate(&test_criteria(), 2).await.unwrap_err();
    assert_eq!(err.code(), "transient_upstream_failure");
}

#[tokio::test]
async fn openai_missing_candidates_key_yields_empty_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("{}")))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = OpenAiService::new(&config).unwrap();

    let candidates = service.generate(&test_criteria(), 2).await.unwrap();
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn outreach_quota_failure_keeps_scored_lead() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("candidate companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&candidate_payload())))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Computed assessment"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response("Strong operational fit in the target industry.")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("personalized outreach message"))
        .respond_with(ResponseTemplate::new(429).set_body_string(
            r#"{"error":{"code":"insufficient_quota","message":"You exceeded your current quota"}}"#,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = Arc::new(OpenAiService::new(&config).unwrap());
    let assembler = LeadAssembler::new(service.clone(), service.clone());
    let engine = GenerationEngine::new(service, assembler, &config);

    let request = GenerationRequest {
        criteria: test_criteria(),
        count: 2,
        include_enrichment: false,
        generate_messages: true,
    };

    let outcome = engine.generate(&request).await.unwrap();

    // Both leads survive with their scores; outreach is just missing.
    assert_eq!(outcome.generated, 2);
    assert_eq!(outcome.failed, 0);
    for lead in &outcome.leads {
        assert!(lead.fit_score > 0);
        assert!(lead.match_reason.is_some());
        assert!(lead.outreach_message.is_none());
    }
    assert_eq!(outcome.failures.len(), 2);
    for failure in &outcome.failures {
        assert_eq!(failure.code, "quota_exceeded");
        assert!(failure.message.starts_with("outreach_message"));
    }
}

#[tokio::test]
async fn second_run_reuses_cached_leads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("candidate companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&candidate_payload())))
        .expect(2)
        .mount(&mock_server)
        .await;

    // Match reasons are generated once per candidate, not once per run.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Computed assessment"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response("Well-aligned prospect.")),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = Arc::new(OpenAiService::new(&config).unwrap());
    let assembler = LeadAssembler::new(service.clone(), service.clone());
    let engine = GenerationEngine::new(service, assembler, &config);

    let request = GenerationRequest {
        criteria: test_criteria(),
        count: 2,
        include_enrichment: false,
        generate_messages: false,
    };

    let first = engine.generate(&request).await.unwrap();
    assert_eq!(first.generated, 2);

    let second = engine.generate(&request).await.unwrap();
    assert_eq!(second.generated, 2);
    assert!(second.failures.is_empty());
}

#[tokio::test]
async fn pronet_search_pairs_companies_with_contacts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/companies/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "elements": [
                {
                    "name": "Summit Graphics Group",
                    "industry": "Graphics & Signage",
                    "size": "201-500",
                    "location": "Denver, Colorado, United States"
                },
                {
                    "name": "No Contact Co",
                    "industry": "Graphics & Signage"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/people/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "elements": [
                {
                    "firstName": "Dana",
                    "lastName": "Whitfield",
                    "title": "VP of Operations",
                    "company": "Summit Graphics Group",
                    "department": "Operations",
                    "seniority": "VP"
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config("https://api.openai.com".to_string());
    config.pronet_api_key = Some("network-key".to_string());
    config.pronet_base_url = mock_server.uri();

    let service = ProNetService::from_config(&config).unwrap().unwrap();
    let candidates = service.generate(&test_criteria(), 5).await.unwrap();

    // Companies without a persona-matching contact are skipped.
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].company.name, "Summit Graphics Group");
    assert_eq!(candidates[0].stakeholder.name, "Dana Whitfield");
    assert_eq!(candidates[0].stakeholder.seniority, Seniority::Vp);
}

#[tokio::test]
async fn pronet_invalid_key_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/companies/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config("https://api.openai.com".to_string());
    config.pronet_api_key = Some("bad-key".to_string());
    config.pronet_base_url = mock_server.uri();

    let service = ProNetService::from_config(&config).unwrap().unwrap();
    let err = service.generate(&test_criteria(), 5).await.unwrap_err();
    assert_eq!(err.code(), "invalid_api_key");
}

#[tokio::test]
async fn pronet_source_absent_without_key() {
    let config = create_test_config("https://api.openai.com".to_string());
    assert!(ProNetService::from_config(&config).unwrap().is_none());
}

#[tokio::test]
async fn concurrent_assembly_completes_full_batch() {
    let mock_server = MockServer::start().await;

    let many: Vec<serde_json::Value> = (0..8)
        .map(|i| {
            serde_json::json!({
                "company": {"name": format!("Company {}", i), "industry": "Graphics & Signage"},
                "stakeholder": {"name": format!("Contact {}", i), "title": "Director of Sales"}
            })
        })
        .collect();
    let payload = serde_json::json!({"candidates": many}).to_string();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("candidate companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(&payload)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Computed assessment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Good fit.")))
        .expect(8)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let service = Arc::new(OpenAiService::new(&config).unwrap());
    let assembler = LeadAssembler::new(service.clone(), service.clone());
    let engine = GenerationEngine::new(service, assembler, &config);

    let request = GenerationRequest {
        criteria: test_criteria(),
        count: 8,
        include_enrichment: false,
        generate_messages: false,
    };

    let outcome = engine.generate(&request).await.unwrap();
    assert_eq!(outcome.generated, 8);
    assert_eq!(outcome.failed, 0);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.requested, 8);
}
