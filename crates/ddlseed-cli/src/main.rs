mod config;
mod formatter;
mod logging;
mod redact;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use ddlseed_core::{
    CycleError, SchemaGraph, build_schema_report, resolve_fill_order, summarize_fk_graph,
};
use ddlseed_ddl::{BuildError, build_schema};
use ddlseed_generate::{GenerationEngine, GenerationError, MemorySink, PostgresSink};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tracing::{info, warn};

use config::{Settings, load_settings};
use formatter::{FormatterError, load_script};
use logging::init_logging;
use redact::redact_connection_string;

#[derive(Debug, Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("formatter error: {0}")]
    Formatter(#[from] FormatterError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "ddlseed", version, about = "Fill a Postgres schema with generated data")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate rows for every table of a DDL script and insert them.
    Fill(FillArgs),
    /// Print the schema graph built from a DDL script as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// DDL script to read.
    #[arg(value_name = "FILE")]
    file: PathBuf,
    /// Settings file (defaults to ./ddlseed.toml when present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Read the script as-is instead of running the formatter.
    #[arg(long, default_value_t = false)]
    no_format: bool,
    /// Emit logs as JSON.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

#[derive(Args, Debug)]
struct FillArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Database connection string.
    #[arg(value_name = "CONNECTION_STRING", required_unless_present = "dry_run")]
    connection: Option<String>,
    /// Seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
    /// Row count for tables without a count directive.
    #[arg(long)]
    rows: Option<u64>,
    /// Attempts per row before a uniqueness failure aborts the run.
    #[arg(long)]
    max_attempts: Option<u32>,
    /// Generate without touching a database.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Write the generation report as JSON.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Write the report to a file instead of stdout.
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Fill(args) => run_fill(args).await,
        Command::Inspect(args) => run_inspect(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &CliError) {
    eprintln!("error: {err}");
    if let CliError::Build(BuildError::Structural { diagnostics }) = err {
        for diagnostic in diagnostics {
            eprintln!("error: {diagnostic}");
        }
    }
}

/// Settings with command-line overrides applied and logging initialised.
fn prepare(source: &SourceArgs) -> Result<Settings, CliError> {
    let mut settings = load_settings(source.config.as_deref())?;
    if source.no_format {
        settings.formatter.enabled = false;
    }
    if source.json_logs {
        settings.logging.json = true;
    }
    init_logging(&settings.logging).map_err(CliError::Logging)?;
    Ok(settings)
}

fn load_graph(file: &Path, settings: &Settings) -> Result<SchemaGraph, CliError> {
    let script = load_script(file, &settings.formatter)?;
    let outcome = build_schema(&script);
    for warning in &outcome.warnings {
        warn!(statement = %first_line(&warning.statement), "{}", warning.message);
    }
    let (graph, _) = outcome.into_result()?;
    info!(
        file = %file.display(),
        tables = graph.table_count(),
        "schema graph built"
    );
    Ok(graph)
}

async fn run_fill(args: FillArgs) -> Result<(), CliError> {
    let FillArgs {
        source,
        connection,
        seed,
        rows,
        max_attempts,
        dry_run,
        report,
    } = args;

    let mut settings = prepare(&source)?;
    if seed.is_some() {
        settings.generation.seed = seed;
    }
    if let Some(rows) = rows {
        settings.generation.default_rows = rows;
    }
    if let Some(max_attempts) = max_attempts {
        settings.generation.max_attempts_row = max_attempts;
    }

    let timer = Instant::now();
    let graph = load_graph(&source.file, &settings)?;
    let order = resolve_fill_order(&graph)?;
    let summary = summarize_fk_graph(&graph);
    info!(
        tables = summary.nodes,
        foreign_keys = summary.edges,
        "fill order resolved"
    );

    let engine = GenerationEngine::new(settings.generation.options());
    let generation = if dry_run {
        let mut sink = MemorySink::new();
        engine.fill(&graph, &order, &mut sink).await?
    } else {
        let conn = connection.ok_or_else(|| {
            CliError::InvalidConfig("connection string is required".to_string())
        })?;
        let pool = connect(&conn, &settings).await?;
        let mut sink = PostgresSink::new(pool.clone());
        let result = engine.fill(&graph, &order, &mut sink).await;
        pool.close().await;
        result?
    };

    if let Some(path) = report {
        write_file(&path, &generation.to_json_pretty()?)?;
        info!(path = %path.display(), "report written");
    }

    info!(
        rows = generation.rows_total(),
        duration_ms = timer.elapsed().as_millis() as u64,
        "run finished"
    );
    println!("Successfully generated data!");
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<(), CliError> {
    let settings = prepare(&args.source)?;
    let graph = load_graph(&args.source.file, &settings)?;
    let report = build_schema_report(&graph, settings.generation.default_rows);
    let json = serde_json::to_string_pretty(&report)?;

    match args.out {
        Some(path) => {
            write_file(&path, &json)?;
            info!(path = %path.display(), "schema report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn connect(conn: &str, settings: &Settings) -> Result<PgPool, CliError> {
    let engine = detect_engine(conn)?;
    info!(
        engine,
        connection = %redact_connection_string(conn),
        "connecting"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
        .connect(conn)
        .await?;
    sqlx::query("select 1").execute(&pool).await?;
    info!(engine, "database reachable");
    Ok(pool)
}

fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(redact_connection_string(conn)))
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    std::fs::write(path, content).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn first_line(statement: &str) -> &str {
    statement.trim().lines().next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_requires_connection_unless_dry_run() {
        assert!(Cli::try_parse_from(["ddlseed", "fill", "schema.sql"]).is_err());

        let cli =
            Cli::try_parse_from(["ddlseed", "fill", "schema.sql", "--dry-run", "--seed", "3"])
                .expect("dry run parses");
        let Command::Fill(args) = cli.command else {
            panic!("expected fill");
        };
        assert!(args.dry_run);
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.connection, None);
    }

    #[test]
    fn inspect_takes_source_flags() {
        let cli = Cli::try_parse_from(["ddlseed", "inspect", "schema.sql", "--no-format"])
            .expect("inspect parses");
        let Command::Inspect(args) = cli.command else {
            panic!("expected inspect");
        };
        assert!(args.source.no_format);
        assert_eq!(args.source.file, PathBuf::from("schema.sql"));
    }

    #[test]
    fn only_postgres_urls_are_accepted() {
        assert_eq!(detect_engine("postgresql://localhost/db").ok(), Some("postgres"));
        assert!(matches!(
            detect_engine("mysql://root:pw@localhost/db"),
            Err(CliError::UnsupportedEngine(conn)) if !conn.contains("pw")
        ));
    }
}
