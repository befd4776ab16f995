//! Intake bot server entry point.
//!
//! Loads configuration, wires adapters into the dialogue controller and
//! serves the WhatsApp webhook until SIGINT/SIGTERM.

use std::error::Error;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use intake_bot::adapters::ai::{LlmClassifierConfig, LlmFieldClassifier};
use intake_bot::adapters::http::{webhook_router, WebhookAppState};
use intake_bot::adapters::memory::{InMemoryRecordStore, InMemorySessionStore};
use intake_bot::adapters::sheets::{GoogleSheetsRecordStore, SheetsApiConfig};
use intake_bot::adapters::whatsapp::{CloudApiConfig, SignatureVerifier, WhatsAppCloudClient};
use intake_bot::application::{HandleInboundMessageHandler, SessionSweeper};
use intake_bot::config::{AiProvider, AppConfig};
use intake_bot::ports::{FieldClassifier, PersistenceGateway, SessionStore};
use secrecy::ExposeSecret;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let whatsapp = &config.whatsapp;
    let notifier = Arc::new(WhatsAppCloudClient::new(
        CloudApiConfig::new(whatsapp.access_token.expose_secret(), &whatsapp.phone_number_id)
            .with_api_base(&whatsapp.api_base)
            .with_api_version(&whatsapp.api_version)
            .with_timeout(whatsapp.timeout()),
    )?);

    let records: Arc<dyn PersistenceGateway> = match &config.sheets {
        Some(sheets) => {
            tracing::info!(spreadsheet_id = %sheets.spreadsheet_id, "Persisting records to Google Sheets");
            Arc::new(GoogleSheetsRecordStore::new(
                SheetsApiConfig::new(&sheets.spreadsheet_id, sheets.access_token.expose_secret())
                    .with_range(&sheets.range)
                    .with_api_base(&sheets.api_base)
                    .with_timeout(sheets.timeout()),
            )?)
        }
        None => {
            tracing::warn!("Sheets not configured; completed records are kept in memory only");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let mut handler = HandleInboundMessageHandler::new(
        sessions.clone(),
        notifier,
        records,
        config.session.timeout(),
    );
    if let Some(classifier) = build_classifier(&config)? {
        tracing::info!(provider = classifier.provider_name(), "Field classifier enabled");
        handler = handler.with_classifier(classifier);
    }

    let mut state = WebhookAppState::new(
        Arc::new(handler),
        sessions.clone(),
        whatsapp.verify_token.expose_secret(),
    );
    match whatsapp.app_secret() {
        Some(secret) => state = state.with_signature_verifier(SignatureVerifier::new(secret)),
        None => tracing::warn!("whatsapp.app_secret not set; webhook signatures are not checked"),
    }

    let sweeper = SessionSweeper::new(
        sessions,
        config.session.retention(),
        config.session.sweep_interval(),
    )
    .spawn();

    let app = webhook_router(state).layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Intake bot listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Intake bot stopped");
    Ok(())
}

/// Initializes the tracing subscriber from `server.log_level`.
///
/// `RUST_LOG` overrides the configured filter. Production logs are JSON.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn build_classifier(config: &AppConfig) -> Result<Option<Arc<dyn FieldClassifier>>, reqwest::Error> {
    let ai = &config.ai;
    let Some(api_key) = ai.api_key() else {
        return Ok(None);
    };

    let mut classifier_config = match ai.provider {
        AiProvider::OpenAI => LlmClassifierConfig::openai(api_key),
        AiProvider::Anthropic => LlmClassifierConfig::anthropic(api_key),
    }
    .with_timeout(ai.timeout());
    if let Some(model) = &ai.model {
        classifier_config = classifier_config.with_model(model);
    }

    Ok(Some(Arc::new(LlmFieldClassifier::new(classifier_config)?)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
