use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::models::alert::Alert;
use crate::models::alert_rule::Severity;
use crate::models::transport::NotificationTransport;
use crate::notify::transports::{AdapterResult, NotificationAdapter};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn theme_color_for(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "attention",
        Severity::Warning => "warning",
        Severity::Info => "accent",
        Severity::Ok => "good",
    }
}

/// Microsoft Teams connector adapter, per spec.md §6: a MessageCard
/// POSTed to `config.webhook_url_teams` with a severity-mapped
/// `themeColor`.
pub struct TeamsAdapter {
    http: reqwest::Client,
}

impl TeamsAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default(),
        }
    }
}

impl Default for TeamsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationAdapter for TeamsAdapter {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, _vars: &Json) -> AdapterResult {
        let webhook_url = transport
            .config
            .get("webhook_url_teams")
            .and_then(|v| v.as_str())
            .ok_or("teams transport missing webhook_url_teams")?;

        let payload = json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "themeColor": theme_color_for(alert.severity),
            "title": alert.title,
            "text": alert.message,
            "sections": [{
                "facts": [
                    {"name": "Severity", "value": alert.severity.as_str()},
                    {"name": "Device", "value": alert.device_id.to_string()},
                ],
            }],
        });

        let response = self.http.post(webhook_url).json(&payload).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(text)
        } else {
            Err(format!("teams connector rejected with status {status}: {text}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_color_matches_severity() {
        assert_eq!(theme_color_for(Severity::Warning), "warning");
    }
}
