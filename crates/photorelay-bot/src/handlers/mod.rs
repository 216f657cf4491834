//! Update handlers
//!
//! Commands answer directly; media messages start a relay in the background
//! so a slow upload never blocks later updates from the same chat.

pub mod commands;
pub mod media;

use teloxide::types::Message;

/// Telegram user id of the sender. Anonymous channel posts fall back to the chat id.
pub fn sender_id(msg: &Message) -> i64 {
    msg.from
        .as_ref()
        .and_then(|user| i64::try_from(user.id.0).ok())
        .unwrap_or(msg.chat.id.0)
}
