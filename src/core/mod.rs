// Domain-layer modules and shared errors/models
pub mod scoring {
    pub use crate::scoring::*;
}

pub mod explain {
    pub use crate::explain::*;
}

pub mod assembler {
    pub use crate::assembler::*;
}

pub mod generation {
    pub use crate::generation::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
