use std::sync::Arc;

use photorelay_core::{AccessDecision, UploadOutcome};
use photorelay_pipeline::render_outcome;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::sender_id;
use crate::state::AppState;
use crate::status::{files_text, help_text, immich_status, version_text};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show help and Immich status")]
    Start,
    #[command(description = "show this help message")]
    Help,
    #[command(description = "show bot version")]
    Version,
    #[command(description = "show supported file types")]
    Files,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    if let AccessDecision::Deny(reason) = state.guard.check(sender_id(&msg)) {
        let text = render_outcome("", &UploadOutcome::Rejected(reason));
        bot.send_message(msg.chat.id, text).await?;
        return Ok(());
    }

    let bot_name = state.config.bot_name();
    let text = match cmd {
        Command::Start | Command::Help => {
            let status = immich_status(&state.immich).await;
            help_text(bot_name, &status)
        }
        Command::Version => version_text(bot_name),
        Command::Files => files_text(),
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}
