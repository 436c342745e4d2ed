//! webidx - search a precompiled webidx index from the command line.
//!
//! With query words, runs a single search. Without, reads one query per line
//! from stdin; the index is loaded by the first search and reused by the rest.

mod output;

use anyhow::Result;
use clap::Parser;
use output::OutputFormat;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use webidx_core::config::MessageConfig;
use webidx_core::{IndexStats, SearchApi, SearchOptions, SearchOutcome, SearchRequest};

#[derive(Parser, Debug)]
#[command(name = "webidx")]
#[command(about = "Search a precompiled webidx index")]
struct Args {
    /// Index location: http(s) URL, file URL or local path
    #[arg(long)]
    dbfile: String,

    /// Index load timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Literal prefix removed from displayed titles
    #[arg(long)]
    title_prefix: Option<String>,

    /// Literal suffix removed from displayed titles
    #[arg(long)]
    title_suffix: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print index statistics after loading
    #[arg(long)]
    stats: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Query words (reads queries from stdin when omitted)
    query: Vec<String>,
}

impl Args {
    fn options(&self, query: &str) -> SearchOptions {
        let mut options = SearchOptions::new(query).with_dbfile(&self.dbfile);
        options.timeout = self.timeout;
        options.title_prefix = self.title_prefix.clone();
        options.title_suffix = self.title_suffix.clone();
        options
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries results.
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let api = SearchApi::builder()
        .default_sink(args.format.sink())
        .build()?;

    if args.stats {
        let options = args.options("");
        match api.load_index(&args.dbfile, options.load_timeout()).await {
            Ok(_) => print_stats(&api.stats()?, args.format)?,
            Err(e) if e.is_load_failure() => {
                warn!("Index load failed: {}", e);
                eprintln!("{}", MessageConfig::LOAD_FAILED);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !args.query.is_empty() {
        let outcome = search(&api, &args, &args.query.join(" ")).await?;
        return Ok(exit_code(&outcome));
    }

    if args.stats {
        return Ok(ExitCode::SUCCESS);
    }

    info!("Reading queries from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = ExitCode::SUCCESS;
    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        let outcome = search(&api, &args, query).await?;
        last = exit_code(&outcome);
    }

    Ok(last)
}

async fn search(api: &SearchApi, args: &Args, query: &str) -> Result<SearchOutcome> {
    let request = SearchRequest::new(args.options(query))
        .with_error_callback(|message| eprintln!("{}", message));
    let outcome = api.search(request).await?;
    debug!("Search for {:?}: {:?}", query, outcome);
    Ok(outcome)
}

fn exit_code(outcome: &SearchOutcome) -> ExitCode {
    if outcome.is_delivered() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_stats(stats: &IndexStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(stats)?),
        OutputFormat::Text | OutputFormat::Dialog => println!(
            "{} pages, {} words, {} occurrences",
            stats.pages, stats.words, stats.occurrences
        ),
    }
    Ok(())
}
