//! Domain models shared across the casebench API surface.

pub mod status;
pub mod step;

// Re-export commonly used types
pub use status::{Priority, TestStatus};
pub use step::{StepInput, StepResponse};
