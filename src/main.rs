use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use incident_clock::config::{Config, DEFAULT_CONFIG_PATH};
use incident_clock::dates::format_utc;
use incident_clock::elapsed::describe;
use incident_clock::infra::http_client::ReqwestHttp;
use incident_clock::logging;
use incident_clock::pipeline::{Pipeline, PipelineResult};
use incident_clock::registry::{ClockDefinition, ClockRegistry};
use incident_clock::relevance::RelevanceClassifier;
use incident_clock::storage::{DocumentStore, JsonFileStore};
use std::path::PathBuf;
use tracing::{error, info, Instrument};

#[derive(Parser)]
#[command(name = "incident_clock")]
#[command(about = "Publishes time-since-last-incident clock documents from public incident feeds")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one fetch, merge and save pass for a clock
    Run {
        /// Clock id (see `list`)
        #[arg(long)]
        clock: String,
        /// Output document path (defaults to the clock's file in the data directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run every built-in clock in turn
    RunAll,
    /// Show the time since the last incident of saved documents
    Status {
        /// Limit to one clock id
        #[arg(long)]
        clock: Option<String>,
    },
    /// List the built-in clocks and their feeds
    List,
}

fn print_result(result: &PipelineResult) {
    println!("\n📊 Pipeline Results for {}:", result.clock_id);
    for feed in &result.feeds {
        println!(
            "   {}: {} records, {} kept, {} bytes",
            feed.feed, feed.records, feed.kept, feed.bytes
        );
        for (reason, count) in &feed.skipped {
            println!("      skipped {}: {}", reason, count);
        }
    }
    println!("   Prior incidents: {}", result.prior_incidents);
    println!("   New incidents: {}", result.new_incidents);
    println!("   Total after merge: {}", result.total_incidents);
    match &result.last_incident {
        Some(latest) => println!("   Latest: {} ({})", latest.title, format_utc(&latest.date)),
        None => println!("   Latest: none"),
    }
    println!("   Output file: {}", result.output_file.display());
}

async fn run_clock(
    pipeline: &Pipeline<'_>,
    clock: &ClockDefinition,
    output: PathBuf,
) -> anyhow::Result<()> {
    let span = tracing::info_span!("Running clock", clock = %clock.id());

    match pipeline.run(clock, &output).instrument(span).await {
        Ok(result) => {
            info!("Pipeline finished");
            print_result(&result);
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(e).with_context(|| format!("clock {} failed", clock.id()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::load(&cli.config)?;
    let _log_guard = logging::init_logging(&config.output.log_dir);

    let registry = ClockRegistry::builtin();
    let store = JsonFileStore::new();
    let output_for = |clock: &ClockDefinition| config.output.data_dir.join(&clock.output_file);

    match cli.command {
        Commands::Run { clock, output } => {
            let clock = registry.get(&clock)?;
            let http = ReqwestHttp::new(config.http.timeout(), &config.http.user_agent)?;
            let classifier = RelevanceClassifier::new(&config.relevance)?;
            let pipeline = Pipeline::new(&http, &store, &classifier);
            let output = output.unwrap_or_else(|| output_for(clock));
            run_clock(&pipeline, clock, output).await?;
        }
        Commands::RunAll => {
            let http = ReqwestHttp::new(config.http.timeout(), &config.http.user_agent)?;
            let classifier = RelevanceClassifier::new(&config.relevance)?;
            let pipeline = Pipeline::new(&http, &store, &classifier);
            for clock in registry.all() {
                run_clock(&pipeline, clock, output_for(clock)).await?;
            }
        }
        Commands::Status { clock } => {
            let clocks: Vec<&ClockDefinition> = match clock {
                Some(id) => vec![registry.get(&id)?],
                None => registry.all().iter().collect(),
            };
            let now = Utc::now();
            for clock in clocks {
                let path = output_for(clock);
                match store.load(&path) {
                    Some(doc) => {
                        println!("{}", describe(&doc, now));
                        println!("   {} incidents recorded", doc.incident_count());
                    }
                    None => println!("{}: no document at {}", clock.meta.clock_name, path.display()),
                }
            }
        }
        Commands::List => {
            for clock in registry.all() {
                println!("{} - {}", clock.id(), clock.meta.clock_name);
                println!("   {}", clock.meta.description);
                for feed in &clock.feeds {
                    println!("   [{}] {} {}", feed.parser.kind.label(), feed.name, feed.url);
                }
            }
        }
    }
    Ok(())
}
