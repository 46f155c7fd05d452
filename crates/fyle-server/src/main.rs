//! Fyle: document field extractor and expiry reminder server.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fyle_core::{CategoryCatalog, FyleConfig};
use fyle_ingest::{collect_text, Ingester, NoRecognizer};
use fyle_server::{build_router, worker, AppState};
use fyle_store::SqliteStore;

fn resolve_data_dir() -> PathBuf {
    std::env::var("FYLE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn open_store(config: &FyleConfig) -> anyhow::Result<SqliteStore> {
    SqliteStore::open(&config.data_paths.db)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))
}

/// `fyle extract <file>`: print the extraction result for a text or PDF file.
fn run_extract(path: &str) -> anyhow::Result<()> {
    let config = FyleConfig::from_env(resolve_data_dir())?;
    let store = open_store(&config)?;
    let catalog = CategoryCatalog::builtin();
    store.seed_catalog(&catalog)?;

    let text = fyle_ingest::read_source(std::path::Path::new(path))?
        .map(|content| collect_text(&content.source, &NoRecognizer))
        .unwrap_or_default();
    let result = Ingester::new(&store, &catalog, &config.extractor).extract(&text, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// `fyle seed`: insert any missing builtin categories.
fn run_seed() -> anyhow::Result<()> {
    let config = FyleConfig::from_env(resolve_data_dir())?;
    let store = open_store(&config)?;
    let added = store.seed_catalog(&CategoryCatalog::builtin())?;
    println!(
        "Seeded {} categories ({} total)",
        added,
        store.count_categories()?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "extract" => {
                if args.len() < 3 {
                    eprintln!("Usage: fyle extract <file>");
                    std::process::exit(1);
                }
                return run_extract(&args[2]);
            }
            "seed" => return run_seed(),
            "--help" | "-h" | "help" => {
                println!("Fyle: document field extractor and expiry reminders");
                println!();
                println!("Usage: fyle [command]");
                println!();
                println!("Commands:");
                println!("  (none)            Start the server");
                println!("  extract <file>    Print extracted fields as JSON");
                println!("  seed              Seed the builtin categories");
                println!("  help              Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'fyle help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = FyleConfig::from_env(&data_dir)?;
    let port = config.port;
    let store = open_store(&config)?;

    let state = Arc::new(AppState::new(config, store)?);

    worker::start_reminder_worker(state.clone());

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Fyle server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
