use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::models::alert::Alert;
use crate::models::transport::NotificationTransport;
use crate::notify::transports::{AdapterResult, NotificationAdapter};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Provider-neutral SMS adapter, per spec.md §6: posts
/// `{recipients[], text}` to `config.provider_url`, leaving the
/// concrete carrier/provider unspecified.
pub struct SmsAdapter {
    http: reqwest::Client,
}

impl SmsAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default(),
        }
    }
}

impl Default for SmsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationAdapter for SmsAdapter {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, _vars: &Json) -> AdapterResult {
        let provider_url = transport
            .config
            .get("provider_url")
            .and_then(|v| v.as_str())
            .ok_or("sms transport missing provider_url")?;
        let recipients = transport
            .config
            .get("recipients")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>())
            .ok_or("sms transport missing recipients")?;
        if recipients.is_empty() {
            return Err("sms transport has an empty recipient list".to_string());
        }

        let text = format!("[{}] {}", alert.severity.as_str(), alert.title);
        let payload = json!({
            "recipients": recipients,
            "text": text,
        });

        let response = self.http.post(provider_url).json(&payload).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(text)
        } else {
            Err(format!("sms provider rejected with status {status}: {text}"))
        }
    }
}
