use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analyzer::doclint;

#[derive(Parser)]
#[command(name = "manifest-lint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lint Kubernetes manifests embedded in Markdown and YAML files")]
#[command(long_about = "Extracts YAML documents from fenced code blocks and standalone YAML files, runs a registry-declared rule set over them and reports every violation at its exact source line.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to settings file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the rule set over the primary document and its references
    Check {
        /// Primary Markdown document
        #[arg(long, value_name = "FILE")]
        skill: Option<PathBuf>,

        /// References directory (relative to the primary document)
        #[arg(long, value_name = "DIR")]
        references: Option<PathBuf>,

        /// Rules registry file (relative to the primary document)
        #[arg(long, value_name = "FILE")]
        rules_file: Option<PathBuf>,

        /// Only run these rule IDs (comma-separated)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Extra artifact files or directories to scan (comma-separated)
        #[arg(long, value_delimiter = ',')]
        artifacts: Vec<String>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Check that every MUST bullet is mapped to a rule or a manual review
    Coverage {
        /// Primary Markdown document
        #[arg(long, value_name = "FILE")]
        skill: Option<PathBuf>,

        /// MUST mapping file (relative to the primary document)
        #[arg(long, value_name = "FILE")]
        mapping: Option<PathBuf>,

        /// Rules registry file (relative to the primary document)
        #[arg(long, value_name = "FILE")]
        rules_file: Option<PathBuf>,
    },

    /// List the built-in rules
    Rules {
        /// Rules registry file used for severities and descriptions
        #[arg(long, value_name = "FILE")]
        rules_file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
    Github,
}

impl From<OutputFormat> for doclint::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Plain => doclint::OutputFormat::Plain,
            OutputFormat::Json => doclint::OutputFormat::Json,
            OutputFormat::Github => doclint::OutputFormat::GitHub,
        }
    }
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
