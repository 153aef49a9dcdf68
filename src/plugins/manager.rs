use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::notifiers::{DiscordNotifier, LogNotifier};
use super::traits::{CredentialVerifier, NotificationEvent, NotificationResult, NotifierPlugin};
use super::verifiers::StaticTokenVerifier;
use crate::config::AppConfig;

pub type NotifierPluginBox = Box<dyn NotifierPlugin>;

/// Registered notifiers plus the credential verifier guarding the API.
#[derive(Clone)]
pub struct PluginManager {
    notifiers: Arc<RwLock<Vec<NotifierPluginBox>>>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl PluginManager {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            notifiers: Arc::new(RwLock::new(Vec::new())),
            verifier,
        }
    }

    /// Log notifier always, Discord when a webhook is configured, static token verifier.
    pub async fn from_config(config: &AppConfig) -> Self {
        let manager = Self::new(Arc::new(StaticTokenVerifier::new(
            config.security.api_token.clone(),
        )));

        manager.register_notifier(Box::new(LogNotifier::new())).await;

        let discord = &config.notifications.discord;
        if let Some(webhook_url) = &discord.webhook_url {
            manager
                .register_notifier(Box::new(DiscordNotifier::new(
                    webhook_url.clone(),
                    discord.username.clone(),
                )))
                .await;
        }

        manager
    }

    pub async fn register_notifier(&self, plugin: NotifierPluginBox) {
        debug!("Registering notifier {}", plugin.plugin_type());
        self.notifiers.write().await.push(plugin);
    }

    /// List all registered notifier types
    pub async fn list_notifier_types(&self) -> Vec<String> {
        let notifiers = self.notifiers.read().await;
        notifiers.iter().map(|n| n.plugin_type().to_string()).collect()
    }

    pub fn verifier(&self) -> Arc<dyn CredentialVerifier> {
        Arc::clone(&self.verifier)
    }

    /// Deliver `event` to every notifier. Failures are logged and reported, never raised.
    pub async fn notify_all(&self, event: &NotificationEvent) -> Vec<NotificationResult> {
        let notifiers = self.notifiers.read().await;
        let mut results = Vec::with_capacity(notifiers.len());

        for notifier in notifiers.iter() {
            let result = match notifier.notify(event).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Notifier {} failed: {}", notifier.plugin_type(), e);
                    NotificationResult::failed(e.to_string())
                }
            };
            results.push(result);
        }

        results
    }
}
