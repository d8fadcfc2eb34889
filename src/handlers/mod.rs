// Handler modules
pub mod check;
pub mod coverage;
pub mod rules;
pub mod utils;

// Re-export all handler functions
pub use check::{CheckArgs, handle_check};
pub use coverage::handle_coverage;
pub use rules::handle_rules;
