//! `network-ingest` command-line entry point.
//!
//! ```text
//! network-ingest run  [--csv PATH] [--database DB] [--collection COLL] [--ratio 0.2] [--artifact-dir Artifacts]
//! network-ingest push --csv PATH [--database DB] [--collection COLL]
//! network-ingest ping [--database DB] [--collection COLL] [--limit 5]
//! ```
//!
//! Store-backed commands read `MONGO_DB_URL` (and optionally `MONGO_TLS_CA_FILE`) from the
//! environment or a `.env` file, and need the `mongo` cargo feature.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use network_ingest::config::{
    ARTIFACT_DIR, DATA_INGESTION_COLLECTION_NAME, DATA_INGESTION_DATABASE_NAME,
    DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO, DataIngestionConfig, TrainingPipelineConfig,
};
use network_ingest::ingestion::{
    CompositeObserver, CsvSource, DataIngestion, DocumentStore, FileObserver, IngestionObserver, StdErrObserver,
    StoreSource, TracingObserver, ping_store, seed_from_csv,
};
use tracing_subscriber::EnvFilter;

/// Data ingestion for the network-security training pipeline
#[derive(Parser, Debug)]
#[command(name = "network-ingest", version, about, long_about = None)]
struct Cli {
    /// Directory receiving one timestamped log file per invocation
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch, clean, snapshot and split; prints the resulting artifact as JSON
    Run(RunArgs),
    /// Load a CSV seed file into the document store
    Push {
        /// CSV file to load
        #[arg(long)]
        csv: PathBuf,
        #[command(flatten)]
        target: Target,
    },
    /// Connect to the document store and print a few documents
    Ping {
        #[command(flatten)]
        target: Target,
        /// Maximum number of documents to print
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
struct Target {
    /// Database name
    #[arg(long, default_value = DATA_INGESTION_DATABASE_NAME)]
    database: String,
    /// Collection name
    #[arg(long, default_value = DATA_INGESTION_COLLECTION_NAME)]
    collection: String,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Read records from this CSV file instead of the document store
    #[arg(long)]
    csv: Option<PathBuf>,
    #[command(flatten)]
    target: Target,
    /// Fraction of records routed to the test set
    #[arg(long, default_value_t = DATA_INGESTION_TRAIN_TEST_SPLIT_RATIO)]
    ratio: f64,
    /// Root of the timestamped artifact directories
    #[arg(long, default_value = ARTIFACT_DIR)]
    artifact_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let observer = build_observer(&cli.log_dir);

    match cli.command {
        Command::Run(args) => run(args, observer),
        Command::Push { csv, target } => {
            let store = open_store()?;
            let inserted = seed_from_csv(
                &store,
                &csv,
                &target.database,
                &target.collection,
                Some(observer.as_ref()),
            )?;
            println!("Number of records inserted: {inserted}");
            Ok(())
        }
        Command::Ping { target, limit } => {
            let store = open_store()?;
            let docs = ping_store(
                &store,
                &target.database,
                &target.collection,
                limit,
                Some(observer.as_ref()),
            )?;
            if docs.is_empty() {
                println!("No data found in {}.{}", target.database, target.collection);
            } else {
                println!("Fetched {} records:", docs.len());
                for doc in &docs {
                    println!("{}", serde_json::to_string(doc)?);
                }
            }
            Ok(())
        }
    }
}

fn run(args: RunArgs, observer: Arc<dyn IngestionObserver>) -> anyhow::Result<()> {
    let pipeline = TrainingPipelineConfig::with_artifact_root(&args.artifact_dir, Local::now());
    let config = DataIngestionConfig::from_pipeline(&pipeline)
        .with_database(args.target.database)
        .with_collection(args.target.collection)
        .with_split_ratio(args.ratio);
    tracing::info!(artifact_dir = %pipeline.artifact_dir.display(), "initialized training pipeline configuration");

    let artifact = match args.csv {
        Some(path) => DataIngestion::new(config, CsvSource::new(path))
            .with_observer(observer)
            .initiate_data_ingestion()?,
        None => DataIngestion::new(config, StoreSource::new(open_store()?))
            .with_observer(observer)
            .initiate_data_ingestion()?,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&artifact).context("cannot render ingestion artifact")?
    );
    Ok(())
}

// Without a log file, events still reach stderr in the log-file line format.
fn build_observer(log_dir: &Path) -> Arc<dyn IngestionObserver> {
    let fallback: Arc<dyn IngestionObserver> = match FileObserver::timestamped(log_dir) {
        Ok(file) => Arc::new(file),
        Err(e) => {
            tracing::warn!("file logging disabled, cannot create {}: {e}", log_dir.display());
            Arc::new(StdErrObserver)
        }
    };
    Arc::new(CompositeObserver::new(vec![Arc::new(TracingObserver), fallback]))
}

#[cfg(feature = "mongo")]
fn open_store() -> anyhow::Result<impl DocumentStore> {
    use network_ingest::config::StoreSettings;
    use network_ingest::ingestion::MongoStore;

    Ok(MongoStore::new(StoreSettings::from_env()?))
}

#[cfg(not(feature = "mongo"))]
fn open_store() -> anyhow::Result<impl DocumentStore> {
    Err::<network_ingest::ingestion::MemoryStore, _>(
        network_ingest::IngestionError::invalid_configuration(
            "document store support not enabled (enable cargo feature 'mongo')",
        )
        .into(),
    )
}
