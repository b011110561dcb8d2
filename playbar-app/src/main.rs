mod terminal;

use crate::terminal::TerminalView;
use playbar_core::{
    BackendSource, CoreError, EventDispatcher, PlaybarConfig, PlayerBackend, Widget,
};
use playbar_platypush::{PlatypushBackend, PlatypushConfig, PLATYPUSH_CONFIG_TEMPLATE};
use std::fs::File;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    // Check config for logging.enabled before full config load
    let file_logging_enabled = check_file_logging_enabled();
    init_tracing(file_logging_enabled);

    // Load config or create template on first run
    let provider_templates: &[&str] = &[PLATYPUSH_CONFIG_TEMPLATE];
    let config = match PlaybarConfig::load_or_create(Some(provider_templates)) {
        Ok(config) => config,
        Err(CoreError::ConfigNotFound { path }) => {
            println!(
                "A configuration file has been created at {}.\n\
                Edit it to point at your Platypush server and run playbar again.",
                path.display()
            );
            std::process::exit(0);
        }
        Err(e) => {
            error!("{e}");
            eprintln!(
                "Failed to load {}: {e}",
                PlaybarConfig::config_path().display()
            );
            std::process::exit(1);
        }
    };

    let cancel_token = CancellationToken::new();

    let backend = match create_backend(&config, &cancel_token) {
        Ok(backend) => backend,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler to trigger graceful shutdown
    let ctrlc_token = cancel_token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C, shutting down gracefully...");
        ctrlc_token.cancel();
    }) {
        error!("Failed to set Ctrl+C handler: {}", e);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let mut widget = Widget::with_options(TerminalView::stdout(), config.widget.options());
    let dispatcher = EventDispatcher::new(backend, cancel_token);

    info!("Starting playbar with the {} backend", config.backend.source);
    if let Err(e) = runtime.block_on(dispatcher.run(&mut widget)) {
        error!("{e}");
        std::process::exit(1);
    }
    println!();
}

/// Build the backend selected in `[backend] source`
fn create_backend(
    config: &PlaybarConfig,
    cancel_token: &CancellationToken,
) -> Result<Arc<dyn PlayerBackend>, CoreError> {
    match config.backend.source {
        BackendSource::Platypush => {
            let platypush = PlatypushConfig::from_providers(&config.providers)?.ok_or_else(|| {
                CoreError::ConfigMissingField {
                    field: "providers.platypush".into(),
                }
            })?;
            platypush.validate()?;

            let backend = PlatypushBackend::new(&platypush, Some(cancel_token.clone()))?;
            Ok(Arc::new(backend))
        }
    }
}

/// Check if file logging is enabled by reading the config file.
/// This is done before full config loading to set up tracing first.
/// Returns `false` if config doesn't exist or can't be parsed.
fn check_file_logging_enabled() -> bool {
    // Minimal structs to parse just the logging.enabled field
    #[derive(serde::Deserialize)]
    struct PartialConfig {
        #[serde(default)]
        logging: PartialLoggingConfig,
    }
    #[derive(serde::Deserialize, Default)]
    struct PartialLoggingConfig {
        #[serde(default)]
        enabled: bool,
    }

    let Ok(content) = std::fs::read_to_string(PlaybarConfig::config_path()) else {
        return false;
    };

    toml::from_str::<PartialConfig>(&content)
        .map(|c| c.logging.enabled)
        .unwrap_or(false)
}

/// Initialize tracing with stderr output and optional file logging.
/// Stdout belongs to the status line.
fn init_tracing(file_logging_enabled: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest_retry=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if file_logging_enabled {
        let log_path = playbar_core::log_file_path();

        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        match File::create(&log_path) {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt_layer)
                    .with(file_layer)
                    .init();

                return;
            }
            Err(e) => {
                eprintln!("Failed to create log file at {}: {e}", log_path.display());
            }
        }
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
