use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use techflow::api::ApiClient;
use techflow::app::{App, AppEvent, CATEGORY_PREF_KEY, THEME_PREF_KEY};
use techflow::config::{Config, API_URL_ENV};
use techflow::session::SessionIdentity;
use techflow::storage::{Database, DatabaseError};
use techflow::theme::ThemeVariant;
use techflow::ui;

/// Get the config directory path (~/.config/techflow/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("techflow"))
}

/// Create the config directory with user-only permissions.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(config_dir, perms) {
            eprintln!(
                "Warning: failed to set permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }
    Ok(())
}

/// Route tracing output to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "techflow", about = "Terminal client for the TechFlow news API")]
struct Args {
    /// API base URL (overrides TECHFLOW_API_URL and config.toml)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Replace the stored session identity with a new one
    #[arg(long)]
    reset_session: bool,

    /// Print the session identity and exit
    #[arg(long)]
    print_session: bool,

    /// Write logs here instead of the config directory
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| config_dir.join("techflow.log"));
    init_logging(&log_path)?;

    let config_path = config_dir.join("config.toml");
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let db_path = config_dir.join("state.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in state database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!("Error: {}", DatabaseError::InstanceLocked);
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open state database: {}", e));
        }
    };

    let session = if args.reset_session {
        let identity = SessionIdentity::reset(&db)
            .await
            .context("Failed to reset session identity")?;
        println!("New session identity: {}", identity);
        identity
    } else {
        SessionIdentity::resolve(&db)
            .await
            .context("Failed to load session identity")?
    };

    if args.print_session {
        println!("{}", session);
        db.close().await;
        return Ok(());
    }

    let env_url = std::env::var(API_URL_ENV).ok();
    let api_url = config.resolve_api_url(args.api_url.as_deref(), env_url.as_deref());
    let api = ApiClient::new(&api_url, config.request_timeout())
        .with_context(|| format!("Invalid API base URL '{}'", api_url))?;

    let mut app = App::new(api, db.clone(), session, &config);

    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(%warning, "Ignoring keybinding override");
    }

    restore_preferences(&mut app, &db).await;

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let result = ui::run(&mut app, event_tx, event_rx).await;
    db.close().await;
    result?;

    println!("Goodbye!");
    Ok(())
}

/// Apply the theme and category persisted last run. Failures only cost the
/// preference, so they are logged and skipped.
async fn restore_preferences(app: &mut App, db: &Database) {
    match db.get_value(THEME_PREF_KEY).await {
        Ok(Some(name)) => match ThemeVariant::from_str_name(&name) {
            Some(variant) => app.set_theme(variant),
            None => tracing::warn!(%name, "Ignoring unknown persisted theme"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read theme preference"),
    }

    match db.get_value(CATEGORY_PREF_KEY).await {
        Ok(Some(category)) => {
            if !app.restore_category(&category) {
                tracing::debug!(%category, "Persisted category not restored");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read category preference"),
    }
}
