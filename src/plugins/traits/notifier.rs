use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::Result;

/// Completion notice for one scrape session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub session_id: Uuid,
    pub message: String,
    pub scraped_count: usize,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn session_completed(session_id: Uuid, scraped_count: usize) -> Self {
        Self {
            session_id,
            message: format!(
                "Scraping session completed. {} products scraped and updated in the database.",
                scraped_count
            ),
            scraped_count,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn delivered(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Trait for implementing notification methods (log, Discord, etc.)
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult>;
}
