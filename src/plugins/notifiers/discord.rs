use crate::plugins::traits::{NotificationEvent, NotificationResult, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

const EMBED_COLOR: u32 = 0x0099ff;

/// Posts session completion notices to a Discord webhook.
pub struct DiscordNotifier {
    client: Client,
    webhook_url: String,
    username: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>, username: impl Into<String>) -> Self {
        DiscordNotifier {
            client: Client::new(),
            webhook_url: webhook_url.into(),
            username: username.into(),
        }
    }

    fn create_embed(&self, event: &NotificationEvent) -> serde_json::Value {
        json!({
            "title": "📦 Scraping session completed",
            "description": event.message,
            "color": EMBED_COLOR,
            "timestamp": event.timestamp.to_rfc3339(),
            "fields": [
                {
                    "name": "Products updated",
                    "value": event.scraped_count.to_string(),
                    "inline": true
                },
                {
                    "name": "Session",
                    "value": event.session_id.to_string(),
                    "inline": true
                }
            ],
            "footer": { "text": self.username }
        })
    }

    fn create_webhook_payload(&self, event: &NotificationEvent) -> serde_json::Value {
        json!({
            "username": self.username,
            "embeds": [self.create_embed(event)]
        })
    }
}

#[async_trait]
impl NotifierPlugin for DiscordNotifier {
    fn name(&self) -> &str {
        "Discord Notifier"
    }

    fn plugin_type(&self) -> &str {
        "discord"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        let payload = self.create_webhook_payload(event);

        let response = self.client.post(&self.webhook_url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Notification {
                notifier: self.plugin_type().to_string(),
                message: format!("webhook returned {}", status),
            });
        }

        Ok(NotificationResult::delivered(Some(format!(
            "discord-{}",
            event.timestamp.timestamp()
        ))))
    }
}
