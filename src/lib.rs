pub mod models;
pub mod services;
pub mod subsystems;
pub mod traits;
pub mod web;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

use crate::models::config::{AppConfig, LoggingConfig, load_config};
use crate::services::gemini::GeminiClient;
use crate::services::itinerary::ItineraryService;
use crate::subsystems::http::HttpSubsystem;
use crate::traits::text_generator::TextGenerator;
use crate::web::{AppState, create_app};

/// High-level entrypoint: load config, init logging, serve until shutdown.
pub async fn run_with_config_path(path: &str, bind_override: Option<String>) -> anyhow::Result<()> {
    let mut cfg: AppConfig = load_config(path)?;
    if let Some(bind) = bind_override {
        cfg.server.bind = bind;
    }

    // Keep the guard alive for the whole run so buffered file logs get flushed.
    let _log_guard = init_logging(&cfg.logging)?;

    run_server(cfg).await
}

/// Initialize structured logging (RUST_LOG wins over `logging.level`).
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let log_spec = std::env::var("RUST_LOG").unwrap_or_else(|_| cfg.level.clone());
    let filter = tracing_subscriber::EnvFilter::new(log_spec);

    match cfg.file.as_deref() {
        Some(file) => {
            let path = std::path::Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(std::path::Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("logging.file has no file name: {}", file))?;
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create log dir {}", dir.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .compact()
                .try_init();
            Ok(Some(guard))
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .try_init();
            Ok(None)
        }
    }
}

/// Wires the Gemini client into the itinerary service and the web state.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::from_config(&cfg.llm)?);
    let service = ItineraryService::from_config(generator, &cfg.llm).context("invalid llm.prompt_template")?;
    info!(
        model = %service.params().model,
        max_output_tokens = service.params().max_output_tokens,
        temperature = service.params().temperature,
        api_key_configured = service.has_api_key(),
        "itinerary service ready"
    );
    AppState::new(Arc::new(service)).context("failed to load page templates")
}

/// Runs the HTTP subsystem until Ctrl-C / SIGTERM.
pub async fn run_server(cfg: AppConfig) -> anyhow::Result<()> {
    let bind = cfg.server.socket_addr()?;
    let router = create_app(build_state(&cfg)?);
    let http = HttpSubsystem::builder().bind(bind).router(router).build();

    info!(bind = %bind, "itinera starting");
    Toplevel::new(move |s| async move {
        s.start(SubsystemBuilder::new("http", move |h| http.run(h)));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_secs(5))
    .await
    .map_err(|e| anyhow::anyhow!("shutdown with errors: {}", e))
}
