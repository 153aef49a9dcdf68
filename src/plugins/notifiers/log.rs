use crate::plugins::traits::{NotificationEvent, NotificationResult, NotifierPlugin};
use crate::utils::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Writes the completion notice to the application log. Always registered.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        LogNotifier
    }
}

#[async_trait]
impl NotifierPlugin for LogNotifier {
    fn name(&self) -> &str {
        "Log Notifier"
    }

    fn plugin_type(&self) -> &str {
        "log"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        info!(
            session_id = %event.session_id,
            scraped_count = event.scraped_count,
            "{}",
            event.message
        );
        Ok(NotificationResult::delivered(None))
    }
}
