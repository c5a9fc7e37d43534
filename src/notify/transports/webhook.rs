use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value as Json};

use crate::models::alert::Alert;
use crate::models::transport::NotificationTransport;
use crate::notify::templates::render;
use crate::notify::transports::{AdapterResult, NotificationAdapter};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Generic HTTP webhook adapter, per spec.md §6: method defaults to
/// POST, headers merge over `{Content-Type: application/json,
/// User-Agent: Y-Monitor/1.0}`, body is `config.body` interpolated
/// with the template vars, falling back to `{alert, device,
/// metadata}` JSON when no body template is configured.
pub struct WebhookAdapter {
    http: reqwest::Client,
}

impl WebhookAdapter {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_default(),
        }
    }
}

impl Default for WebhookAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationAdapter for WebhookAdapter {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, vars: &Json) -> AdapterResult {
        let url = transport.config.get("url").and_then(|v| v.as_str()).ok_or("webhook transport missing url")?;
        let method = transport
            .config
            .get("method")
            .and_then(|v| v.as_str())
            .unwrap_or("POST")
            .to_uppercase();

        let body = match transport.config.get("body").and_then(|v| v.as_str()) {
            Some(template) => render(template, vars),
            None => json!({
                "alert": vars,
                "device": alert.device_id.to_string(),
                "metadata": alert.details,
            })
            .to_string(),
        };

        let mut request = match method.as_str() {
            "PUT" => self.http.put(url),
            "GET" => self.http.get(url),
            _ => self.http.post(url),
        };

        let mut headers: std::collections::HashMap<String, String> = std::collections::HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("User-Agent".to_string(), "Y-Monitor/1.0".to_string());
        if let Some(custom) = transport.config.get("headers").and_then(|v| v.as_object()) {
            for (key, value) in custom {
                if let Some(value) = value.as_str() {
                    headers.insert(key.clone(), value.to_string());
                }
            }
        }
        for (key, value) in headers {
            request = request.header(key, value);
        }

        if method != "GET" {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            Ok(text)
        } else {
            Err(format!("webhook rejected with status {status}: {text}"))
        }
    }
}
