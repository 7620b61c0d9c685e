//! Lead Generation Engine Library
//!
//! This library provides the core functionality for B2B lead generation:
//! deterministic lead scoring and matching, candidate acquisition from an
//! LLM or a professional-network API, and batch assembly of scored leads
//! with personalized outreach messages.
//!
//! # Modules
//!
//! - `core`: Core business logic namespace.
//! - `integrations`: External service integrations namespace.
//! - `assembler`: Per-candidate lead assembly with failure isolation.
//! - `buckets`: Ordered parsing of revenue/employee bucket labels.
//! - `cache_validator`: Cache validation utilities.
//! - `circuit_breaker`: Circuit breaker implementation.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `explain`: Matching-criteria text generation.
//! - `generation`: Batch generation workflow.
//! - `models`: Core data models.
//! - `sanitize`: Contact-field validation for candidate records.
//! - `scoring`: Dimension scorers and fit-score aggregation.
//! - `services`: External collaborator contracts and clients (OpenAI, network).

pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and examples
pub mod assembler;
pub mod buckets;
pub mod cache_validator;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod explain;
pub mod generation;
pub mod models;
pub mod sanitize;
pub mod scoring;
pub mod services;
