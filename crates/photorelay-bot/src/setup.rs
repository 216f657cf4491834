//! Application wiring and graceful shutdown.

use std::sync::Arc;

use photorelay_core::{AccessGuard, Config, TransportRouter};
use photorelay_immich_client::ImmichClient;
use photorelay_pipeline::{FileFetcher, Pipeline, UploadDispatcher};
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;
use crate::status::{immich_status, startup_text};
use crate::telegram::{build_bot, TelegramNotifier, TelegramSource};

/// Build the Bot API clients and the shared state.
///
/// Returns the bot that receives updates: the local server's when one is
/// configured, since a bot logged in there cannot poll the hosted service.
pub fn initialize_app(config: Config) -> Result<(Bot, Arc<AppState>), anyhow::Error> {
    let config = Arc::new(config);

    let hosted = build_bot(config.bot_token(), None, config.fetch_timeout())?;
    let local = config
        .local_endpoint()
        .map(|endpoint| {
            build_bot(
                config.bot_token(),
                Some(&endpoint.base_url),
                config.fetch_timeout(),
            )
        })
        .transpose()?;
    let primary = local.clone().unwrap_or_else(|| hosted.clone());

    let immich = Arc::new(ImmichClient::new(
        config.immich_api_url(),
        config.immich_api_key(),
        config.upload_timeout(),
    )?);
    let guard = Arc::new(AccessGuard::new(config.allowed_user_ids().iter().copied()));

    let fetcher = FileFetcher::new(
        Arc::new(TelegramSource::new(hosted, local)),
        config.temp_dir(),
        config.fetch_timeout(),
    );
    let dispatcher = UploadDispatcher::new(
        immich.clone(),
        config.retry_policy().clone(),
        config.upload_timeout(),
    );
    let pipeline = Arc::new(Pipeline::new(
        guard.clone(),
        TransportRouter::new(config.has_local_endpoint()),
        fetcher,
        dispatcher,
        Arc::new(TelegramNotifier::new(primary.clone())),
        config.device_id(),
    ));

    let state = Arc::new(AppState {
        config,
        guard,
        immich,
        pipeline,
        shutdown: CancellationToken::new(),
    });

    Ok((primary, state))
}

/// Tell every allowed user that the bot is up. Failures are logged only.
pub async fn send_startup_message(bot: &Bot, state: &AppState) {
    let status = immich_status(&state.immich).await;
    let text = startup_text(state.config.bot_name(), &status);
    let recipients = state.guard.allowed_ids();

    tracing::info!(recipients = recipients.len(), "Sending startup messages");
    for user_id in recipients {
        match bot.send_message(ChatId(user_id), text.clone()).await {
            Ok(_) => tracing::info!(user_id, "Startup message sent"),
            Err(e) => tracing::error!(user_id, error = %e, "Failed to send startup message"),
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
