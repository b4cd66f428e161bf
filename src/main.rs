//! Hint Coach - terminal client for an incremental coding-hint service
//!
//! A coaching session state machine drives one problem at a time: a first
//! hint, then a conversation with follow-up hints and quick actions.

mod cli;
mod config;
mod gateway;
mod markup;
mod preferences;
mod runtime;
mod state_machine;
mod timer;

use config::CoachConfig;
use gateway::{HttpGateway, LoggingGateway};
use preferences::Preferences;
use runtime::CoachHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hint_coach=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = CoachConfig::from_env()?;

    let preferences = Preferences::load(&config.preferences_path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring unreadable preferences");
        Preferences::default()
    });

    let gateway = HttpGateway::new(&config.backend_url, config.request_timeout)?;
    tracing::info!(
        backend = %gateway.base_url(),
        timeout_secs = ?config.request_timeout.map(|t| t.as_secs()),
        theme = %preferences.theme,
        "Starting hint coach"
    );

    let (handle, _runtime) = CoachHandle::spawn(LoggingGateway::new(gateway));
    cli::run(handle, preferences, &config.preferences_path).await?;

    Ok(())
}
