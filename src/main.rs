use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use tern::app::{App, AppEvent};
use tern::config::Config;
use tern::storage::Database;
use tern::ui;

/// Get the application directory path (~/.tern/)
fn get_app_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".tern"))
}

#[derive(Parser, Debug)]
#[command(name = "tern", about = "Terminal feed reader with bookmarks and search")]
struct Args {
    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    /// Directory for the database, log and config (default: ~/.tern)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up the application directory
    let app_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => get_app_dir()?,
    };
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir).context("Failed to create application directory")?;
        println!("Created application directory: {}", app_dir.display());
    }

    // User-only access on Unix; the database holds the user's reading history
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&app_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&app_dir, perms) {
                    eprintln!(
                        "Warning: failed to set permissions on {}: {}",
                        app_dir.display(),
                        e
                    );
                }
            }
            Err(e) => {
                eprintln!(
                    "Warning: failed to read metadata for {}: {}",
                    app_dir.display(),
                    e
                );
            }
        }
    }

    // The alternate screen owns stdout, so logs go to a file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(app_dir.join("tern.log"))
        .context("Failed to open log file")?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let config = match Config::load(&app_dir.join("config.toml")) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let db_path = app_dir.join("tern.db");

    // Handle --reset-db flag
    if args.reset_db && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = Database::open(db_path_str)
        .await
        .context("Failed to open database")?;

    // Create app state and load initial data
    let mut app = App::new(db, config).context("Failed to create application")?;
    app.load_sources().await.context("Failed to load sites")?;
    app.refresh_bookmarks()
        .await
        .context("Failed to load bookmarks")?;

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    // Run the TUI
    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
