use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::{error::NotifyError, models::NotifierSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Token or recipient blank; nothing was attempted.
    Skipped,
}

/// Best-effort, single-attempt message delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        destination: &NotifierSettings,
        message: &str,
    ) -> Result<Delivery, NotifyError>;
}

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
}

impl TelegramNotifier {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(
        &self,
        destination: &NotifierSettings,
        message: &str,
    ) -> Result<Delivery, NotifyError> {
        if !destination.is_configured() {
            return Ok(Delivery::Skipped);
        }

        let url = format!("{TELEGRAM_API}/bot{}/sendMessage", destination.token.trim());
        let res = self
            .http
            .post(url)
            .json(&json!({ "chat_id": destination.chat_id.trim(), "text": message }))
            .send()
            .await
            // the url carries the bot token
            .map_err(|e| NotifyError::Http(e.without_url()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        tracing::debug!("sent telegram notification (length={})", message.len());
        Ok(Delivery::Sent)
    }
}
