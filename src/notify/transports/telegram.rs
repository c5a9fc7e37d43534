use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::models::alert::Alert;
use crate::models::alert_rule::Severity;
use crate::models::transport::NotificationTransport;
use crate::notify::transports::{AdapterResult, NotificationAdapter};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn emoji_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\u{1f6a8}",
        Severity::Warning => "\u{26a0}\u{fe0f}",
        Severity::Info => "\u{2139}\u{fe0f}",
        Severity::Ok => "\u{2705}",
    }
}

/// Telegram bot adapter, per spec.md §6: `sendMessage` with
/// `parse_mode=Markdown` and a severity emoji prefix.
pub struct TelegramAdapter {
    http: reqwest::Client,
}

impl TelegramAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default(),
        }
    }
}

impl Default for TelegramAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationAdapter for TelegramAdapter {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, _vars: &Json) -> AdapterResult {
        let token = transport.config.get("token").and_then(|v| v.as_str()).ok_or("telegram transport missing token")?;
        let chat_id = transport.config.get("chat_id").and_then(|v| v.as_str()).ok_or("telegram transport missing chat_id")?;

        let url = format!("https://api.telegram.org/bot{token}/sendMessage");
        let text = format!("{} *{}*\n{}", emoji_for(alert.severity), alert.title, alert.message);
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
        });

        let response = self.http.post(&url).json(&payload).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(text)
        } else {
            Err(format!("telegram API rejected with status {status}: {text}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_matches_severity() {
        assert_eq!(emoji_for(Severity::Critical), "\u{1f6a8}");
    }
}
