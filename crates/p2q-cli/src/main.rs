//! p2q - natural language to SQL, interactively
//!
//! Connects to a DuckDB database, analyzes its schema once at startup,
//! then loops: request in, generated SQL out, optional execution and CSV
//! export. The completion service only ever sees the rendered schema
//! description and the request text.

use anyhow::Context;
use clap::Parser;
use duckdb::Connection;
use std::path::PathBuf;

mod config;
mod export;
mod llm;
mod logging;
mod render;
mod repl;
mod spinner;

use config::Config;
use llm::OpenAiGenerator;
use spinner::Spinner;

#[derive(Debug, Parser)]
#[command(name = "p2q", version, about = "Translate natural language into SQL queries")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Database file (overrides config and P2Q_DATABASE)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Completion model name (overrides config and P2Q_MODEL)
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(database) = cli.database {
        config.database.path = database.display().to_string();
    }
    if let Some(model) = cli.model {
        config.llm.model = model;
    }

    config.apply_logging_env();
    logging::init();

    let api_key = Config::get_openai_api_key()?;
    let generator = OpenAiGenerator::new(api_key, config.llm.model.clone());
    tracing::info!(model = %config.llm.model, "completion client ready");

    std::fs::create_dir_all(&config.export.directory)
        .with_context(|| format!("creating export directory {}", config.export.directory))?;

    let conn = Connection::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path))?;

    // Schema analysis failure is the one fatal error after startup begins:
    // no degraded description is attempted.
    let spinner = Spinner::start("Analyzing database schema...");
    let snapshot = p2q_duck::snapshot(&conn);
    spinner.stop();
    let snapshot = snapshot.context("analyzing database schema")?;
    tracing::info!(tables = snapshot.tables.len(), "schema analyzed");

    repl::run(&conn, &snapshot, &generator, &config).await
}
