//! Command line interface of the EDGAR mirror.

use std::sync::Arc;

use clap::Parser;
use edgar::{
    ArchiveSource, Dataset, EdgarConfig, EdgarError, EdgarMirror, HttpArchiveSource,
    LocalArchiveSource, LogProgress, Result,
};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{BuildArgs, Cli, Command, FactsArgs};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("EDGAR_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = EdgarConfig::new(cli.root);
    match cli.command {
        Command::Build(args) => cmd_build(config, args).await?,
        Command::Lookup { query } => cmd_lookup(config, &query)?,
        Command::Facts(args) => cmd_facts(config, &args)?,
        Command::Summary { history } => cmd_summary(config, history)?,
    }

    Ok(())
}

/// Opens the mirror for reading. Nothing is ever fetched.
fn open_reader(config: EdgarConfig) -> Result<EdgarMirror> {
    EdgarMirror::with_source(config, Arc::new(LocalArchiveSource::new()))
}

async fn cmd_build(config: EdgarConfig, args: BuildArgs) -> Result<()> {
    let mut config = config.with_workers(args.workers);
    if let Some(user_agent) = args.user_agent {
        config = config.with_user_agent(user_agent);
    }
    if let Some(url) = args.company_facts_url {
        config = config.with_company_facts_url(url);
    }
    if let Some(url) = args.submissions_url {
        config = config.with_submissions_url(url);
    }

    let all_local = Dataset::ALL
        .iter()
        .all(|dataset| config.url(*dataset).starts_with("file://"));
    let source: Arc<dyn ArchiveSource> = if args.offline || all_local {
        Arc::new(LocalArchiveSource::new())
    } else {
        Arc::new(
            HttpArchiveSource::new(&config.user_agent)?
                .with_observer(Arc::new(LogProgress::new("edgar"))),
        )
    };

    let mut mirror = EdgarMirror::with_source(config, source)?;
    let summary = if args.offline {
        mirror.build_local().await?
    } else {
        mirror.build().await?
    };
    print_json(&summary)
}

fn cmd_lookup(config: EdgarConfig, query: &str) -> Result<()> {
    let mirror = open_reader(config)?;
    if mirror.store().is_empty() {
        tracing::warn!("Lookup store is empty, run `edgar build` first");
    }

    let cik = mirror
        .lookup_identifier(Some(query), Some(query))
        .ok_or_else(|| {
            EdgarError::NotFound(format!("No ticker or company named {:?}", query))
        })?;
    println!("{}", cik);
    Ok(())
}

fn cmd_facts(config: EdgarConfig, args: &FactsArgs) -> Result<()> {
    let mirror = open_reader(config)?;
    let cik = mirror.resolve(&args.query)?;
    let facts = mirror.entity_facts(Some(cik.as_str()), None, None)?;

    let field = facts.get(&args.field).ok_or_else(|| {
        EdgarError::NotFound(format!("Field {} not reported by CIK {}", args.field, cik))
    })?;

    if args.json {
        let observations: Vec<_> = field
            .observations()
            .map(|obs| {
                json!({
                    "fy": obs.fiscal_year,
                    "fp": obs.fiscal_period,
                    "val": obs.value,
                })
            })
            .collect();
        let document = json!({
            "cik": cik,
            "entityName": facts.entity_name(),
            "form": field.form(),
            "field": field.name(),
            "label": field.label(),
            "observations": observations,
        });
        print_json(&document)?;
        return Ok(());
    }

    println!(
        "{} ({}) {}/{}",
        facts.entity_name().unwrap_or("unknown entity"),
        cik,
        field.form(),
        field.name()
    );
    if let Some(label) = field.label() {
        println!("{}", label);
    }
    for obs in field.observations() {
        println!(
            "{:>6} {:<4} {:>20}",
            obs.fiscal_year.map_or_else(|| "-".to_string(), |fy| fy.to_string()),
            obs.fiscal_period.as_deref().unwrap_or("-"),
            obs.value
        );
    }
    Ok(())
}

fn cmd_summary(config: EdgarConfig, history: bool) -> Result<()> {
    let mirror = open_reader(config)?;

    if history {
        for path in mirror.history()? {
            println!("{}", path.display());
        }
    }

    match mirror.current_summary()? {
        Some(summary) => print_json(&summary),
        None => Err(EdgarError::NotFound(format!(
            "No build summary in {}",
            mirror.layout().root().display()
        ))),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let bytes = edgar::persist::to_pretty_json(value)?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
