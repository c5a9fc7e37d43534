use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::models::alert::Alert;
use crate::models::alert_rule::Severity;
use crate::models::transport::NotificationTransport;
use crate::notify::transports::{AdapterResult, NotificationAdapter};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn color_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "#FF0000",
        Severity::Warning => "#FFA500",
        Severity::Info => "#0080FF",
        Severity::Ok => "#00FF00",
    }
}

/// Slack incoming-webhook adapter, per spec.md §6: one attachment
/// carrying a severity-colored sidebar and `{severity, device,
/// timestamp}` fields.
pub struct SlackAdapter {
    http: reqwest::Client,
}

impl SlackAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default(),
        }
    }
}

impl Default for SlackAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationAdapter for SlackAdapter {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, _vars: &Json) -> AdapterResult {
        let webhook_url = transport
            .config
            .get("webhook_url")
            .and_then(|v| v.as_str())
            .ok_or("slack transport missing webhook_url")?;

        let payload = json!({
            "text": alert.title,
            "attachments": [{
                "color": color_for(alert.severity),
                "text": alert.message,
                "fields": [
                    {"title": "Severity", "value": alert.severity.as_str(), "short": true},
                    {"title": "Device", "value": alert.device_id.to_string(), "short": true},
                    {"title": "Timestamp", "value": alert.last_occurred.to_string(), "short": true},
                ],
            }],
        });

        let response = self.http.post(webhook_url).json(&payload).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(text)
        } else {
            Err(format!("slack webhook rejected with status {status}: {text}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_matches_severity() {
        assert_eq!(color_for(Severity::Critical), "#FF0000");
        assert_eq!(color_for(Severity::Ok), "#00FF00");
    }
}
