//! Telegram side of the relay: Bot API clients, file source and notifier.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use photorelay_core::{Endpoint, UploadOutcome};
use photorelay_pipeline::{
    render_outcome, FetchError, FetchResult, FileSource, RemoteFile, ResponseNotifier,
};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::RequestError;
use tokio_util::io::ReaderStream;

/// Bot client with an explicit request timeout covering whole downloads.
pub fn build_bot(
    token: &str,
    api_url: Option<&str>,
    timeout: Duration,
) -> Result<Bot, anyhow::Error> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(timeout)
        .build()?;
    let bot = Bot::with_client(token, client);

    match api_url {
        Some(url) => {
            let url = reqwest::Url::parse(url)
                .map_err(|e| anyhow::anyhow!("Invalid TELEGRAM_API_URL '{}': {}", url, e))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Map a Bot API failure onto the fetch taxonomy.
pub fn classify_request_error(err: RequestError, endpoint: Endpoint) -> FetchError {
    match err {
        RequestError::Api(api) => {
            let message = api.to_string();
            if is_file_too_big(&message) {
                FetchError::TooLarge {
                    limit: endpoint.max_size_bytes(),
                }
            } else {
                FetchError::NotFound(message)
            }
        }
        other => FetchError::Unreachable(other.to_string()),
    }
}

fn is_file_too_big(message: &str) -> bool {
    message.to_lowercase().contains("file is too big")
}

/// Fetches files through the hosted Bot API and, when configured, a local
/// `telegram-bot-api` server.
pub struct TelegramSource {
    hosted: Bot,
    local: Option<Bot>,
}

impl TelegramSource {
    pub fn new(hosted: Bot, local: Option<Bot>) -> Self {
        Self { hosted, local }
    }

    fn bot_for(&self, endpoint: Endpoint) -> FetchResult<&Bot> {
        match endpoint {
            Endpoint::Hosted => Ok(&self.hosted),
            Endpoint::Local => self.local.as_ref().ok_or_else(|| {
                FetchError::Unreachable("local Bot API server not configured".to_string())
            }),
        }
    }
}

#[async_trait]
impl FileSource for TelegramSource {
    async fn open(&self, endpoint: Endpoint, file_reference_id: &str) -> FetchResult<RemoteFile> {
        let bot = self.bot_for(endpoint)?;
        let file = bot
            .get_file(file_reference_id.to_string())
            .await
            .map_err(|e| classify_request_error(e, endpoint))?;

        let reported_size = Some(u64::from(file.meta.size)).filter(|size| *size > 0);

        // A local server in `--local` mode answers with a path on its own disk.
        if endpoint == Endpoint::Local && Path::new(&file.path).is_absolute() {
            match tokio::fs::File::open(&file.path).await {
                Ok(local_file) => {
                    let stream =
                        ReaderStream::new(local_file).map(|chunk| chunk.map_err(FetchError::Io));
                    return Ok(RemoteFile::new(reported_size, Box::pin(stream)));
                }
                Err(e) => {
                    tracing::debug!(
                        path = %file.path,
                        error = %e,
                        "Local Bot API file not readable, downloading over HTTP"
                    );
                }
            }
        }

        let stream = bot
            .download_file_stream(&file.path)
            .map(|chunk| chunk.map_err(|e| FetchError::Unreachable(e.to_string())));
        Ok(RemoteFile::new(reported_size, Box::pin(stream)))
    }
}

/// Sends outcome messages back to the chat the file came from.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ResponseNotifier for TelegramNotifier {
    async fn notify(&self, chat_id: i64, file_name: &str, outcome: &UploadOutcome) {
        let text = render_outcome(file_name, outcome);
        if let Err(e) = self.bot.send_message(ChatId(chat_id), text).await {
            tracing::error!(chat_id, error = %e, "Failed to send outcome message");
        }
    }
}
