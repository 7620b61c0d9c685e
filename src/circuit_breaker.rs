use failsafe::{backoff, failure_policy, Config};
use std::time::Duration;

/// Circuit breaker type gating outbound LLM calls.
pub type LlmCircuitBreaker =
    failsafe::StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>;

/// Creates a circuit breaker for LLM API calls to prevent cascading failures
/// when the upstream is down or persistently erroring.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// # States
///
/// - **CLOSED**: Normal operation, requests pass through.
/// - **OPEN**: Too many failures, requests fail fast.
/// - **HALF_OPEN**: Testing if service recovered.
///
/// A rejected call surfaces to callers as a transient upstream failure, so a
/// tripped breaker never changes error classification semantics downstream.
pub fn create_llm_circuit_breaker() -> LlmCircuitBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}
