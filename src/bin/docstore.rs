//! docstore CLI
//!
//! Runs one operation against a document table persisted in a file.

use clap::{Parser, Subcommand};
use docstore::{DocStoreError, DocumentStore, FileSink, StoreConfig};
use serde_json::{Map, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// docstore CLI
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(about = "Embedded JSON document store")]
#[command(version)]
struct Args {
    /// Database image file (created on first write)
    #[arg(short, long, default_value = "./docstore.db")]
    file: String,

    /// Table name
    #[arg(short, long, default_value = "documents")]
    table: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a document by id
    Get {
        /// The document id
        id: String,
    },

    /// Find the first document matching a JSON filter, e.g. '{"id":"a1"}'
    Find {
        /// Filter object
        filter: String,
    },

    /// List every document
    List,

    /// Insert a JSON document
    Insert {
        /// The document, e.g. '{"name":"ada"}'
        document: String,
    },

    /// Delete a document by id
    Delete {
        /// The document id
        id: String,
    },

    /// Run a raw statement with optional named parameters
    Exec {
        /// Statement text
        sql: String,

        /// Named parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,docstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("docstore v{}", docstore::VERSION);
    tracing::debug!("Image file: {}", args.file);
    tracing::debug!("Table: {}", args.table);

    match run(args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{} ({})", e, e.code());
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> docstore::Result<Value> {
    let config = StoreConfig::builder()
        .name(&args.table)
        .sink(FileSink::new(&args.file))
        .build()?;

    let store = DocumentStore::open(config)?;

    match args.command {
        Commands::Get { id } => Ok(store.get_by_id(&id)?.unwrap_or(Value::Null)),
        Commands::Find { filter } => {
            let filter = parse_object(&filter)?;
            Ok(store.get(Some(&filter))?.into_one().unwrap_or(Value::Null))
        }
        Commands::List => Ok(Value::Array(
            store
                .all()?
                .into_iter()
                .map(|doc| doc.unwrap_or(Value::Null))
                .collect(),
        )),
        Commands::Insert { document } => {
            let document = parse_json(&document)?;
            to_json(&store.insert(&document)?)
        }
        Commands::Delete { id } => Ok(Value::Bool(store.delete(&id)?)),
        Commands::Exec { sql, params } => {
            let params = params.as_deref().map(parse_object).transpose()?;
            to_json(&store.execute(&sql, params.as_ref())?)
        }
    }
}

fn parse_json(text: &str) -> docstore::Result<Value> {
    serde_json::from_str(text)
        .map_err(|e| DocStoreError::InvalidInput(format!("invalid JSON: {}", e)))
}

fn parse_object(text: &str) -> docstore::Result<Map<String, Value>> {
    match parse_json(text)? {
        Value::Object(map) => Ok(map),
        other => Err(DocStoreError::InvalidInput(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> docstore::Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| DocStoreError::InvalidInput(format!("unserializable output: {}", e)))
}
