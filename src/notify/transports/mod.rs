pub mod email;
pub mod slack;
pub mod sms;
pub mod teams;
pub mod telegram;
pub mod webhook;

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::models::alert::Alert;
use crate::models::transport::NotificationTransport;

pub type AdapterResult = std::result::Result<String, String>;

/// Per-transport delivery adapter. Each implementation owns its own
/// network client and payload shape (see §6); the dispatcher treats
/// them uniformly via this trait the way the discovery engine treats
/// `DiscoveryModule` implementations uniformly.
#[async_trait]
pub trait NotificationAdapter: Send + Sync {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, vars: &Json) -> AdapterResult;
}

pub fn adapter_for(kind: crate::models::transport::TransportKind) -> Box<dyn NotificationAdapter> {
    use crate::models::transport::TransportKind;
    match kind {
        TransportKind::Email => Box::new(email::EmailAdapter::new()),
        TransportKind::Webhook => Box::new(webhook::WebhookAdapter::new()),
        TransportKind::Slack => Box::new(slack::SlackAdapter::new()),
        TransportKind::Telegram => Box::new(telegram::TelegramAdapter::new()),
        TransportKind::Teams => Box::new(teams::TeamsAdapter::new()),
        TransportKind::Sms => Box::new(sms::SmsAdapter::new()),
    }
}
