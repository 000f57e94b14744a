//! Academy CLI
//!
//! Serves the course catalog over HTTP and runs maintenance jobs against a
//! catalog snapshot.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use academy_api::{create_router, AppState, Catalog, Config, Store};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Academy - course catalog server
///
/// Serves courses, categories, modules, lessons and instructors for a
/// bilingual e-learning marketplace.
#[derive(Parser, Debug)]
#[command(name = "academy")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// List every course under its category where it is missing
    RepairCategories(RepairArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Path to configuration file (default: academy.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Port for the HTTP API server (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Catalog snapshot file (overrides the config file)
    #[arg(short, long, value_name = "FILE")]
    data_file: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct RepairArgs {
    /// Catalog snapshot file to repair in place
    #[arg(short, long, value_name = "FILE")]
    data_file: String,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Command {
    const fn verbose(&self) -> bool {
        match self {
            Self::Serve(args) => args.verbose,
            Self::RepairCategories(args) => args.verbose,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if cli.command.verbose() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::RepairCategories(args) => repair_categories(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads config, opens the store and serves the API until shutdown.
async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(data_file) = args.data_file {
        config.data_file = Some(data_file);
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    let store = match config.data_file.as_deref() {
        Some(path) => open_store(path).await?,
        None => Store::in_memory(),
    };

    let addr = config.socket_addr()?;
    let router = create_router(AppState::with_store(config, Arc::new(store)));

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    tracing::info!(%addr, "Academy API listening");
    println!("HTTP API server running on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Runs the category repair job against a snapshot file and prints the report.
async fn repair_categories(args: RepairArgs) -> anyhow::Result<()> {
    let path = Path::new(&args.data_file);
    if !path.exists() {
        anyhow::bail!(
            "Data file not found: '{}'\n\nSuggestion: Point --data-file at the snapshot the server writes",
            path.display()
        );
    }

    let store = Arc::new(open_store(&args.data_file).await?);
    let config = Config::default();
    let catalog = Catalog::new(store, config.required_languages);

    let report = catalog.repair_course_categories().await?;

    if !report.dangling_category_refs.is_empty() {
        tracing::warn!(
            courses = report.dangling_category_refs.len(),
            "Some courses reference categories that do not exist"
        );
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Opens a snapshot-backed store.
async fn open_store(path: &str) -> anyhow::Result<Store> {
    Store::open(path).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to open catalog snapshot: {e}\n\nSuggestion: Check the file or move it aside to start with an empty catalog"
        )
    })
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Prints the loaded configuration.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Address: {}:{}", config.host, config.port);
    println!(
        "  Data file: {}",
        config.data_file.as_deref().unwrap_or("(in memory)")
    );
    println!(
        "  Auth: {}",
        if config.auth_token.is_some() {
            "bearer token required on writes"
        } else {
            "disabled"
        }
    );
    println!(
        "  Required languages: {}",
        config.required_languages.join(", ")
    );
}

/// Resolves when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
