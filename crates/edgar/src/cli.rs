use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "edgar",
    version,
    about = "Mirror the SEC EDGAR bulk datasets and look companies up offline"
)]
pub(crate) struct Cli {
    /// Root directory of the mirror
    #[arg(long, global = true, default_value = ".", env = "EDGAR_ROOT")]
    pub(crate) root: PathBuf,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub(crate) verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub(crate) quiet: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Download both archives, extract them and rebuild the indices
    Build(BuildArgs),
    /// Resolve a ticker or company name to its CIK
    Lookup {
        /// Ticker or exact company name
        query: String,
    },
    /// Print the USD observations of one field of an entity
    Facts(FactsArgs),
    /// Show the summary of the last build
    Summary {
        /// List rotated summaries of earlier builds as well
        #[arg(long)]
        history: bool,
    },
}

#[derive(Debug, Args)]
pub(crate) struct BuildArgs {
    /// Number of parallel index workers
    #[arg(long, default_value_t = edgar::DEFAULT_WORKERS)]
    pub(crate) workers: usize,

    /// User agent sent to SEC ("AppName/Version (contact@email.com)")
    #[arg(long, env = "EDGAR_USER_AGENT")]
    pub(crate) user_agent: Option<String>,

    /// Reuse the archives already in the mirror instead of downloading
    #[arg(long)]
    pub(crate) offline: bool,

    /// Override the company facts archive location (http(s) or file://)
    #[arg(long)]
    pub(crate) company_facts_url: Option<String>,

    /// Override the submissions archive location (http(s) or file://)
    #[arg(long)]
    pub(crate) submissions_url: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct FactsArgs {
    /// Ticker, company name or CIK
    pub(crate) query: String,

    /// Field name, e.g. Revenues
    pub(crate) field: String,

    /// Output as JSON
    #[arg(long)]
    pub(crate) json: bool,
}
