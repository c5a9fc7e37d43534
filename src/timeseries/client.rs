use std::time::Duration;

use tracing::{debug, warn};

use crate::timeseries::point::Point;

pub type TimeseriesResult<T> = std::result::Result<T, TimeseriesError>;

#[derive(Debug, thiserror::Error)]
pub enum TimeseriesError {
    #[error("time-series request failed: {0}")]
    Network(String),

    #[error("time-series endpoint rejected the write: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// Minimal line-protocol HTTP client for the time-series store named in
/// §6: a single write endpoint accepting newline-delimited points. No
/// vendored client exists anywhere in the retrieved pack, so this is
/// built the way the teacher's `SorobanClient` wraps an external RPC
/// endpoint — typed config, a bounded `reqwest::Client`, one error enum.
#[derive(Clone)]
pub struct TimeseriesClient {
    http: reqwest::Client,
    write_url: String,
}

impl TimeseriesClient {
    pub fn new(write_url: String, timeout: Duration) -> TimeseriesResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TimeseriesError::Network(e.to_string()))?;
        Ok(Self { http, write_url })
    }

    pub async fn write(&self, points: &[Point]) -> TimeseriesResult<()> {
        if points.is_empty() {
            return Ok(());
        }
        let body = points
            .iter()
            .map(Point::to_line_protocol)
            .collect::<Vec<_>>()
            .join("\n");

        debug!(count = points.len(), "writing time-series points");
        let response = self
            .http
            .post(&self.write_url)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| TimeseriesError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "time-series write rejected");
            return Err(TimeseriesError::Rejected { status, body });
        }
        Ok(())
    }

    pub async fn write_one(&self, point: Point) -> TimeseriesResult<()> {
        self.write(std::slice::from_ref(&point)).await
    }
}

impl From<TimeseriesError> for crate::error::YmError {
    fn from(err: TimeseriesError) -> Self {
        crate::error::YmError::Internal(err.to_string())
    }
}
