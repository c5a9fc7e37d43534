use async_trait::async_trait;
use serde_json::Value as Json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tracing::debug;

use crate::models::alert::Alert;
use crate::models::transport::NotificationTransport;
use crate::notify::templates::render;
use crate::notify::transports::{AdapterResult, NotificationAdapter};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal SMTP submission client. No mail crate exists anywhere in
/// the retrieved example pack, so delivery is hand-rolled the same
/// way the SNMP engine hand-rolls its own PDU codec: a plaintext
/// EHLO/MAIL FROM/RCPT TO/DATA dialog against `config.smtp_host`. TLS
/// relays are out of scope (see DESIGN.md).
pub struct EmailAdapter;

impl EmailAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmailAdapter {
    fn default() -> Self {
        Self::new()
    }
}

async fn expect_reply(reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>) -> std::io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line)
}

#[async_trait]
impl NotificationAdapter for EmailAdapter {
    async fn send(&self, transport: &NotificationTransport, alert: &Alert, vars: &Json) -> AdapterResult {
        let host = transport.config.get("smtp_host").and_then(|v| v.as_str()).ok_or("email transport missing smtp_host")?;
        let port = transport.config.get("smtp_port").and_then(|v| v.as_u64()).unwrap_or(25) as u16;
        let from = transport.config.get("from").and_then(|v| v.as_str()).ok_or("email transport missing from")?;
        let to = transport
            .config
            .get("to")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>())
            .ok_or("email transport missing to")?;
        if to.is_empty() {
            return Err("email transport has an empty recipient list".to_string());
        }

        let subject = render("{title}", vars);
        let body = render("{message}", vars);
        let message = format!(
            "From: {from}\r\nTo: {recipients}\r\nSubject: {subject}\r\nX-YM-Alert-Id: {id}\r\nX-YM-Severity: {severity}\r\nX-YM-Device: {device}\r\n\r\n{body}\r\n",
            recipients = to.join(", "),
            id = alert.id,
            severity = alert.severity.as_str(),
            device = alert.device_id,
        );

        timeout(DEFAULT_TIMEOUT, deliver(host, port, from, &to, &message))
            .await
            .map_err(|_| "smtp dialog timed out".to_string())?
    }
}

async fn deliver(host: &str, port: u16, from: &str, to: &[String], message: &str) -> AdapterResult {
    let stream = TcpStream::connect((host, port)).await.map_err(|e| e.to_string())?;
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    expect_reply(&mut reader).await.map_err(|e| e.to_string())?;
    let mut transcript = String::new();

    for command in std::iter::once("EHLO ymonitor\r\n".to_string())
        .chain(std::iter::once(format!("MAIL FROM:<{from}>\r\n")))
        .chain(to.iter().map(|rcpt| format!("RCPT TO:<{rcpt}>\r\n")))
        .chain(std::iter::once("DATA\r\n".to_string()))
    {
        write_half.write_all(command.as_bytes()).await.map_err(|e| e.to_string())?;
        let reply = expect_reply(&mut reader).await.map_err(|e| e.to_string())?;
        transcript.push_str(&reply);
    }

    write_half.write_all(message.as_bytes()).await.map_err(|e| e.to_string())?;
    write_half.write_all(b".\r\n").await.map_err(|e| e.to_string())?;
    let reply = expect_reply(&mut reader).await.map_err(|e| e.to_string())?;
    transcript.push_str(&reply);

    write_half.write_all(b"QUIT\r\n").await.map_err(|e| e.to_string())?;
    debug!(host, "smtp dialog complete");
    Ok(transcript)
}
