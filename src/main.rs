//! UX Study Chat server binary.
//!
//! Loads configuration from the environment, wires the study runtime to the
//! configured text generator and serves the HTTP API until Ctrl-C.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ux_study_chat::adapters::ai::{CannedTextGenerator, GeminiConfig, GeminiTextGenerator};
use ux_study_chat::adapters::http::{app_router, StudyHandlers};
use ux_study_chat::application::{StudyRuntime, StudyRuntimeConfig};
use ux_study_chat::config::{AiConfig, AiProvider, AppConfig, LogFormat, ServerConfig, ValidationError};
use ux_study_chat::ports::TextGenerator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let personas = Arc::new(config.study.load_personas()?);
    let generator = build_generator(&config.ai)?;

    let runtime_config = StudyRuntimeConfig::default()
        .with_stage_delay(config.study.stage_delay())
        .with_reply_word_limit(config.study.reply_word_limit);
    let study = StudyRuntime::spawn(generator, personas, runtime_config);

    let app = app_router(
        StudyHandlers::new(study.clone()),
        &config.server.cors_origins_list(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = study.shutdown().await {
        tracing::debug!("Study runtime already stopped: {}", e);
    }
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    match server.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn build_generator(ai: &AiConfig) -> Result<Arc<dyn TextGenerator>, Box<dyn std::error::Error>> {
    match ai.provider {
        AiProvider::Gemini => {
            let key = ai
                .gemini_api_key
                .clone()
                .ok_or(ValidationError::MissingRequired("GEMINI_API_KEY"))?;
            let gemini = GeminiConfig::new(key)
                .with_model(&ai.model)
                .with_base_url(&ai.base_url)
                .with_timeout(ai.timeout());
            Ok(Arc::new(GeminiTextGenerator::new(gemini)?))
        }
        AiProvider::Canned => {
            tracing::warn!("Using canned text generator; replies are fixed");
            Ok(Arc::new(CannedTextGenerator::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
