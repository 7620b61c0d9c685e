use anyhow::Result;
use std::sync::Arc;

use leadgen_engine::assembler::LeadAssembler;
use leadgen_engine::config::Config;
use leadgen_engine::generation::GenerationEngine;
use leadgen_engine::models::{
    EventProfile, GenerationRequest, IcpProfile, Persona, StrategicFilters, TargetingCriteria,
};
use leadgen_engine::services::{CandidateSource, OpenAiService, ProNetService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("=== Batch Lead Generation ===\n");

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env()?;

    let openai = Arc::new(OpenAiService::new(&config)?);

    // Prefer the professional-network source when a key is configured,
    // otherwise candidates come from the LLM too.
    let source: Arc<dyn CandidateSource> = match ProNetService::from_config(&config)? {
        Some(pronet) => {
            println!("Candidate source: professional network\n");
            Arc::new(pronet)
        }
        None => {
            println!("Candidate source: OpenAI\n");
            openai.clone()
        }
    };

    let assembler = LeadAssembler::new(openai.clone(), openai);
    let engine = GenerationEngine::new(source, assembler, &config);

    let criteria = TargetingCriteria {
        icp: IcpProfile {
            name: Some("Mid-market signage producers".to_string()),
            industry: "Graphics & Signage".to_string(),
            sub_industry: Some("Architectural Graphics".to_string()),
            min_revenue: "$5M".to_string(),
            max_revenue: "$100M".to_string(),
            geography: "United States".to_string(),
            min_employees: "51".to_string(),
            max_employees: "1,000".to_string(),
            additional_criteria: None,
        },
        event: EventProfile {
            name: "ISA Sign Expo".to_string(),
            date: "2026-04-10".to_string(),
            location: "Orlando, FL".to_string(),
        },
        personas: vec![
            Persona {
                persona_type: "Decision Maker".to_string(),
                titles: "CEO, COO, VP of Operations".to_string(),
                department: "Operations".to_string(),
            },
            Persona {
                persona_type: "Influencer".to_string(),
                titles: "Director of Procurement, Production Manager".to_string(),
                department: "Procurement".to_string(),
            },
        ],
        filters: Some(StrategicFilters {
            technologies: vec!["UV Printing".to_string(), "Large Format Printing".to_string()],
            ..Default::default()
        }),
    };

    let request = GenerationRequest {
        criteria,
        count: 5,
        include_enrichment: false,
        generate_messages: true,
    };

    let outcome = engine.generate(&request).await?;

    println!("\n=== Batch {} Complete ===", outcome.batch_id);
    println!("Requested: {}", outcome.requested);
    println!("✓ Generated: {}", outcome.generated);
    println!("✗ Failed: {}", outcome.failed);
    if outcome.cancelled {
        println!("(batch was cancelled before all candidates were admitted)");
    }

    let mut leads = outcome.leads;
    leads.sort_by(|a, b| b.fit_score.cmp(&a.fit_score));

    for lead in &leads {
        println!(
            "\n[{}] {} — {} ({})",
            lead.fit_score,
            lead.company.name,
            lead.stakeholder.name,
            lead.stakeholder.title.as_deref().unwrap_or("unknown title"),
        );
        if let Some(ref reason) = lead.match_reason {
            println!("  Why: {}", reason);
        }
        if let Some(ref message) = lead.outreach_message {
            println!("  Outreach: {}", message);
        }
        for criterion in &lead.match_details.matching_criteria {
            println!("  - {}", criterion);
        }
    }

    if !outcome.failures.is_empty() {
        println!("\nRecorded failures:");
        for failure in &outcome.failures {
            println!(
                "  ✗ [{}] {} ({})",
                failure.code,
                failure.message,
                failure.company.as_deref().unwrap_or("unknown company"),
            );
        }
    }

    Ok(())
}
