use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use newsdash::api::{HttpNewsApi, NewsApi};
use newsdash::app::{App, AppEvent};
use newsdash::config::{default_config_path, Config, API_URL_ENV};
use newsdash::controller::ControllerEvent;
use newsdash::keybindings::KeybindingRegistry;
use newsdash::ui;

#[derive(Parser, Debug)]
#[command(
    name = "newsdash",
    version,
    about = "Terminal dashboard for summarized AI news"
)]
struct Args {
    /// News API base URL (overrides NEWSDASH_API_URL and the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Config file path (default: ~/.config/newsdash/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Open the categories page with this category selected
    #[arg(long, value_name = "NAME")]
    category: Option<String>,

    /// Check backend health and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never draw over the TUI.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let env_url = std::env::var(API_URL_ENV).ok();
    let base_url = config.resolve_api_url(args.api_url.as_deref(), env_url.as_deref());
    let client = HttpNewsApi::new(&base_url, config.request_timeout())
        .with_context(|| format!("Invalid API base URL: {}", base_url))?;
    tracing::info!(base_url = %client.base_url(), "Using News API");

    if args.check {
        return check_health(&client).await;
    }

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(warning = %warning, "Ignoring keybinding override");
    }

    let base_url = client.base_url().to_string();
    let api: Arc<dyn NewsApi> = Arc::new(client);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let (controller_tx, controller_rx) = mpsc::channel::<ControllerEvent>(32);

    let mut app = App::new(api, base_url, &config, keybindings, controller_tx);
    if let Some(category) = args.category.filter(|c| !c.trim().is_empty()) {
        app = app.with_initial_category(category.trim().to_string());
    }

    ui::run(&mut app, event_tx, event_rx, controller_rx).await?;
    Ok(())
}

/// `--check`: print backend health and exit non-zero when unreachable.
async fn check_health(client: &HttpNewsApi) -> Result<()> {
    match client.health().await {
        Ok(reply) => {
            println!("Backend Online ({}): {}", client.base_url(), reply.status);
            Ok(())
        }
        Err(e) => {
            eprintln!("Backend Offline: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
