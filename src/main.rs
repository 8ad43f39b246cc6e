use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use askd::api::{self, AppState};
use askd::config::ServeConfig;
use askd::utils::{ensure_database_directory, get_database_path};
use askd::{AnswerRouter, AnswerStore, ModelRegistry, ServiceError};

/// askd - question answering service with swappable models
#[derive(Parser)]
#[command(name = "askd")]
#[command(about = "Answers questions about a passage of text and logs every answer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeConfig),
    /// Print logged answers within a time range
    History(HistoryCommand),
}

/// Query the answer log
#[derive(Parser)]
struct HistoryCommand {
    /// Start of the range, epoch seconds (inclusive)
    #[arg(long)]
    start: Option<i64>,

    /// End of the range, epoch seconds (inclusive)
    #[arg(long)]
    end: Option<i64>,

    /// Only show answers from this model
    #[arg(long)]
    model: Option<String>,

    /// SQLite file for the answer log [default: {data_dir}/askd/answers.db]
    #[arg(long, env = "ASKD_DATABASE", value_name = "PATH")]
    database: Option<PathBuf>,
}

fn main() {
    dotenvy::dotenv().ok();
    askd::logging::init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(config) => handle_serve(config),
        Commands::History(cmd) => handle_history(&cmd),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// User errors are validation-class service errors anywhere in the chain.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ServiceError>())
        .any(ServiceError::is_user_error)
}

fn handle_serve(config: ServeConfig) -> Result<()> {
    let db_path = config.database_path()?;
    ensure_database_directory(&db_path)?;
    let store = AnswerStore::open(&db_path)
        .with_context(|| format!("Failed to open answer log at {}", db_path.display()))?;
    info!(path = %db_path.display(), "answer log opened");

    // blocking HTTP clients inside the engine must be created and dropped
    // outside the async runtime
    let engine = config.build_engine()?;
    let registry = ModelRegistry::initialize(Arc::clone(&engine), config.default_spec())
        .context("Failed to load default model")?;

    let router = AnswerRouter::new(Arc::new(registry)).with_timeout(config.inference_timeout());
    let state = AppState::new(router, Arc::new(store));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let result = runtime.block_on(api::serve(state.clone(), config.socket_addr()));
    drop(runtime);
    drop(state);

    result.context("Server failed")
}

fn handle_history(cmd: &HistoryCommand) -> Result<()> {
    let start = cmd.start.ok_or_else(|| ServiceError::missing("start"))?;
    let end = cmd.end.ok_or_else(|| ServiceError::missing("end"))?;

    let db_path = match &cmd.database {
        Some(path) => path.clone(),
        None => get_database_path()?,
    };
    // nothing has been logged yet; don't create an empty log just to read it
    if !db_path.exists() {
        println!("[]");
        return Ok(());
    }
    let store = AnswerStore::open(&db_path)
        .with_context(|| format!("Failed to open answer log at {}", db_path.display()))?;

    let records = store.query(Some(start), Some(end), cmd.model.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_serve_with_defaults() {
        let cli = Cli::try_parse_from(["askd", "serve"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve(_)));
    }

    #[test]
    fn cli_parses_history_range() {
        let cli = Cli::try_parse_from([
            "askd", "history", "--start", "1622125686", "--end", "1722298486", "--model", "m2",
        ])
        .unwrap();

        let Commands::History(cmd) = cli.command else {
            panic!("expected history command");
        };
        assert_eq!(cmd.start, Some(1_622_125_686));
        assert_eq!(cmd.end, Some(1_722_298_486));
        assert_eq!(cmd.model.as_deref(), Some("m2"));
    }

    #[test]
    fn missing_range_is_user_error() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = HistoryCommand {
            start: None,
            end: Some(1_700_000_000),
            model: None,
            database: Some(dir.path().join("answers.db")),
        };

        let err = handle_history(&cmd).unwrap_err();
        assert!(is_user_error(&err));
    }

    #[test]
    fn missing_range_is_user_error_even_without_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("not-yet-created").join("answers.db");
        let cmd = HistoryCommand {
            start: Some(0),
            end: None,
            model: None,
            database: Some(db_path.clone()),
        };

        let err = handle_history(&cmd).unwrap_err();
        assert!(is_user_error(&err));
        assert!(!db_path.exists());
    }

    #[test]
    fn history_does_not_create_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("answers.db");
        let cmd = HistoryCommand {
            start: Some(0),
            end: Some(1_700_000_000),
            model: None,
            database: Some(db_path.clone()),
        };

        handle_history(&cmd).unwrap();
        assert!(!db_path.exists());
    }

    #[test]
    fn storage_failure_is_internal_error() {
        let err = anyhow::Error::from(ServiceError::Storage(rusqlite::Error::InvalidQuery))
            .context("wrapped");
        assert!(!is_user_error(&err));
    }
}
