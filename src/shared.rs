pub mod errors;
pub mod events;

// Re-export CoreError for convenience
pub use errors::{CoreError, CoreResult};
