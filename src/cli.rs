//! # Command Line Interface
//!
//! `serve` runs the REST API (the default when no subcommand is given). The
//! other subcommands run one-off inspections against the configured database
//! and print their results to stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{start_api_server, ApiState};
use crate::config::AppConfig;
use crate::observability::{init_observability, log_config_info};
use crate::services::{snapshot_database, CollectionSchema, SchemaService};
use crate::storage::{CollectionSummary, DatabaseSummary, MongoStore};
use crate::{APP_NAME, VERSION};

#[derive(Debug, Parser)]
#[command(name = "mongorest")]
#[command(about = "REST API and schema inference for a MongoDB database")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// MongoDB connection string override
    #[arg(long)]
    pub uri: Option<String>,

    /// Database name override
    #[arg(short, long)]
    pub database: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind to
        #[arg(short, long)]
        bind_address: Option<String>,
    },

    /// List collections with their document counts
    Collections,

    /// Infer and print the schema of a collection
    Schema {
        /// Collection to sample
        collection: String,

        /// Documents to sample
        #[arg(short, long)]
        sample_size: Option<i64>,
    },

    /// Print database-wide statistics
    Stats,

    /// List every database on the deployment with its size
    Databases,

    /// Write every collection (sampled when large) to a JSON file
    Snapshot {
        /// Output file
        #[arg(short, long, default_value = "mongodb_data.json")]
        output: PathBuf,
    },
}

impl Cli {
    /// Apply command-line overrides on top of environment configuration
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(uri) = &self.uri {
            config.database.uri = uri.clone();
        }
        if let Some(database) = &self.database {
            config.database.database_name = database.clone();
        }
        if self.verbose {
            config.observability.log_level = format!("{}=debug,info", APP_NAME);
        }
        if let Some(Commands::Serve { port, bind_address }) = &self.command {
            if let Some(port) = port {
                config.api.port = *port;
            }
            if let Some(bind_address) = bind_address {
                config.api.bind_address = bind_address.clone();
            }
        } else if self.command.is_some() {
            // One-shot commands never expose a metrics endpoint
            config.observability.enable_metrics = false;
        }
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    init_observability(&config.observability)?;

    let store = MongoStore::connect(&config.database).await?;

    match cli.command {
        None | Some(Commands::Serve { .. }) => serve(config, store.clone()).await?,
        Some(Commands::Collections) => {
            let collections = store.collections().list_with_counts().await?;
            print_collections_table(&collections);
        }
        Some(Commands::Schema { collection, sample_size }) => {
            let service = SchemaService::new(Arc::new(store.documents()), config.schema.clone());
            let output = match service.infer(&collection, sample_size).await? {
                CollectionSchema::Empty => serde_json::json!({ "schema": {}, "count": 0 }),
                CollectionSchema::Inferred(report) => {
                    let mut value = serde_json::to_value(&report)?;
                    if let Some(object) = value.as_object_mut() {
                        object.insert("collection".to_string(), collection.into());
                    }
                    value
                }
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Some(Commands::Stats) => {
            let stats = store.collections().database_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Some(Commands::Databases) => {
            let databases = store.list_databases().await?;
            print_databases_table(&databases);
        }
        Some(Commands::Snapshot { output }) => {
            let snapshot = snapshot_database(&store).await?;
            tokio::fs::write(&output, serde_json::to_string_pretty(&snapshot)?).await?;

            let summaries: Vec<CollectionSummary> = snapshot
                .iter()
                .map(|(name, captured)| CollectionSummary {
                    name: name.clone(),
                    count: captured.total_documents,
                })
                .collect();
            print_collections_table(&summaries);
            println!("Snapshot written to {}", output.display());
        }
    }

    store.shutdown().await;
    Ok(())
}

async fn serve(config: AppConfig, store: MongoStore) -> crate::Result<()> {
    tracing::info!(app_name = APP_NAME, version = VERSION, "Starting mongorest");
    log_config_info(&config);

    if let Err(e) = store.ping().await {
        tracing::warn!(error = %e, "MongoDB not reachable at startup");
    }

    let state = ApiState::new(store, config.schema.clone());
    start_api_server(config.api, state).await
}

/// Print collections in a formatted table
fn print_collections_table(collections: &[CollectionSummary]) {
    if collections.is_empty() {
        println!("No collections found");
        return;
    }

    let width = collections.iter().map(|c| c.name.len()).max().unwrap_or(0).max(10);
    println!();
    println!("{:<width$} {:>12}", "Collection", "Documents", width = width);
    println!("{}", "-".repeat(width + 13));
    for collection in collections {
        println!("{:<width$} {:>12}", collection.name, collection.count, width = width);
    }
    println!();
}

/// Print databases with their on-disk size in megabytes
fn print_databases_table(databases: &[DatabaseSummary]) {
    if databases.is_empty() {
        println!("No databases found");
        return;
    }

    let width = databases.iter().map(|d| d.name.len()).max().unwrap_or(0).max(8);
    println!();
    println!("{:<width$} {:>12}", "Database", "Size (MB)", width = width);
    println!("{}", "-".repeat(width + 13));
    for database in databases {
        let megabytes = database.size_on_disk as f64 / 1024.0 / 1024.0;
        println!("{:<width$} {:>12.2}", database.name, megabytes, width = width);
    }
    println!();
}
