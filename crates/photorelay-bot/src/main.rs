mod handlers;
mod setup;
mod state;
mod status;
mod telegram;
mod telemetry;

use photorelay_core::constants::BOT_VERSION;
use photorelay_core::Config;
use teloxide::prelude::*;

use crate::handlers::commands::{handle_command, Command};
use crate::handlers::media::{handle_media, has_attachment};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;
    telemetry::init_telemetry(config.log_level(), config.log_format())?;

    let (bot, state) = setup::initialize_app(config)?;
    tracing::info!(
        bot_name = %state.config.bot_name(),
        version = BOT_VERSION,
        immich_api_url = %state.config.immich_api_url(),
        local_bot_api = state.config.has_local_endpoint(),
        allowed_users = ?state.guard.allowed_ids(),
        "Starting bot"
    );

    setup::send_startup_message(&bot, &state).await;

    let handler = Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::filter(|msg: Message| has_attachment(&msg)).endpoint(handle_media));

    let mut dispatcher = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state.clone()])
        .default_handler(|_| async {})
        .build();

    let shutdown_token = dispatcher.shutdown_token();
    let cancel = state.shutdown.clone();
    tokio::spawn(async move {
        setup::shutdown_signal().await;
        cancel.cancel();
        match shutdown_token.shutdown() {
            Ok(done) => done.await,
            Err(e) => tracing::warn!(error = %e, "Dispatcher was not running"),
        }
    });

    dispatcher.dispatch().await;
    tracing::info!("Bot stopped");
    Ok(())
}
