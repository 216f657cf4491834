//! Immich connection status and the informational texts that embed it.

use photorelay_core::constants::{BOT_VERSION, SUPPORTED_FILE_TYPES};
use photorelay_immich_client::{ClientError, ImmichClient, UserResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmichStatus {
    pub connection: String,
    pub user: String,
}

/// Ping Immich and, when reachable, look up the account behind the API key.
pub async fn immich_status(client: &ImmichClient) -> ImmichStatus {
    let connection = match client.ping().await {
        Ok(()) => format!("✅ Connected to Immich ({})", client.base_url()),
        Err(ClientError::Status { status, .. }) => {
            format!("❌ Server ping failed (HTTP {})", status)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Immich");
            return ImmichStatus {
                connection: "❌ Connection failed".to_string(),
                user: "Unknown user".to_string(),
            };
        }
    };

    let user = match client.current_user().await {
        Ok(user) => user_line(&user),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get Immich user info");
            "⚠️ Could not retrieve user info".to_string()
        }
    };

    ImmichStatus { connection, user }
}

pub fn user_line(user: &UserResponse) -> String {
    if user.is_admin {
        format!("👤 {} [Admin]", user.name)
    } else {
        format!("👤 {}", user.name)
    }
}

pub fn help_text(bot_name: &str, status: &ImmichStatus) -> String {
    format!(
        "ℹ️ {} v{}\n\n{}\nLogged in as {}\n\n\
         Available commands:\n\
         /help - Show this help message\n\
         /version - Show bot version\n\
         /files - Show supported file types\n\n\
         Send me files and I'll upload them to your Immich instance!",
        bot_name, BOT_VERSION, status.connection, status.user
    )
}

pub fn startup_text(bot_name: &str, status: &ImmichStatus) -> String {
    format!(
        "🤖 {} v{} has started!\n\n{}\nLogged in as {}\n\nBot is ready to receive your files.",
        bot_name, BOT_VERSION, status.connection, status.user
    )
}

pub fn version_text(bot_name: &str) -> String {
    format!("📋 {} version: {}", bot_name, BOT_VERSION)
}

pub fn files_text() -> String {
    format!("📄 Supported file types:\n{}", SUPPORTED_FILE_TYPES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> ImmichStatus {
        ImmichStatus {
            connection: "✅ Connected to Immich (http://immich/api)".to_string(),
            user: "👤 Alice [Admin]".to_string(),
        }
    }

    #[test]
    fn test_user_line_marks_admin() {
        let mut user = UserResponse {
            name: "Alice".to_string(),
            is_admin: true,
        };
        assert_eq!(user_line(&user), "👤 Alice [Admin]");
        user.is_admin = false;
        assert_eq!(user_line(&user), "👤 Alice");
    }

    #[test]
    fn test_help_lists_commands_and_status() {
        let text = help_text("Relay", &status());
        assert!(text.starts_with("ℹ️ Relay v"));
        assert!(text.contains("Connected to Immich"));
        assert!(text.contains("Logged in as 👤 Alice [Admin]"));
        for cmd in ["/help", "/version", "/files"] {
            assert!(text.contains(cmd));
        }
    }

    #[test]
    fn test_startup_and_version_texts() {
        assert!(startup_text("Relay", &status()).contains("Relay v"));
        assert!(startup_text("Relay", &status()).contains("has started!"));
        assert_eq!(
            version_text("Relay"),
            format!("📋 Relay version: {}", BOT_VERSION)
        );
        assert!(files_text().starts_with("📄 Supported file types:"));
    }
}
