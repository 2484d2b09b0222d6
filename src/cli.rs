use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Compile comma-separated filter strings into typed entity queries
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Schema file (TOML) describing entity types
    #[arg(short, long, env = "DYNAMIC_FILTER_SCHEMA")]
    pub schema: PathBuf,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress log output entirely
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a filter against documents loaded from a JSON data file
    Query {
        /// Data file: a JSON object mapping entity names to document arrays
        #[arg(short, long)]
        data: PathBuf,

        /// Entity type to filter
        #[arg(short, long)]
        entity: String,

        /// Filter string, e.g. "name=widget,minprice=5,sortby=price"
        #[arg(short, long)]
        filter: String,
    },
    /// Show the compiled predicate and sort order for a filter
    Explain {
        /// Entity type to compile against
        #[arg(short, long)]
        entity: String,

        /// Filter string
        #[arg(short, long)]
        filter: String,
    },
    /// List registered entity types and their fields
    Schema,
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
