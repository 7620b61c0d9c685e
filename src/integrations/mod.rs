//! External service integrations.

pub mod services {
    pub use crate::services::*;
}

pub mod config {
    pub use crate::config::*;
}

pub mod circuit_breaker {
    pub use crate::circuit_breaker::*;
}
