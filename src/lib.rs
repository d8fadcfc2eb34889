//! # manifest-lint
//!
//! A line-accurate linter for Kubernetes-style manifests embedded in Markdown
//! documentation and standalone YAML files.
//!
//! ## Features
//!
//! - **Extraction**: Recovers YAML documents from fenced code blocks, skipping annotated negative examples
//! - **Source Mapping**: Reports every finding at its exact line in the original file
//! - **Registry-Driven**: Rule IDs, severities and path scopes are declared in a YAML registry
//! - **MUST Coverage**: Verifies every documented MUST rule is enforced or reviewed
//!
//! ## Example
//!
//! ```rust,no_run
//! use manifest_lint::analyzer::doclint::{CheckRequest, run_checks};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let violations = run_checks(&CheckRequest::new("skill/SKILL.md"))?;
//! for v in &violations {
//!     println!("[{}/{}] {}:{}: {}", v.rule_id, v.severity, v.path.display(), v.line, v.message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;

// Re-export commonly used types and functions
pub use analyzer::doclint::{CheckRequest, LintResult, Violation, lint, run_checks};
pub use error::{ConfigError, Result};
use cli::Commands;
use config::Settings;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a command. Returns whether it passed.
pub fn run_command(command: Commands, settings: &Settings) -> Result<bool> {
    match command {
        Commands::Check {
            skill,
            references,
            rules_file,
            only,
            artifacts,
            format,
        } => handlers::handle_check(
            handlers::CheckArgs {
                skill,
                references,
                rules_file,
                only,
                artifacts,
                format,
            },
            settings,
        ),
        Commands::Coverage {
            skill,
            mapping,
            rules_file,
        } => handlers::handle_coverage(skill, mapping, rules_file, settings),
        Commands::Rules { rules_file } => handlers::handle_rules(rules_file, settings).map(|_| true),
    }
}
