use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

/// One row written to the time-series store: a measurement name, a set
/// of indexed string tags, a set of numeric/string fields, and the
/// instant the sample was taken. `BTreeMap` keeps tag/field ordering
/// stable for the line-protocol encoder.
#[derive(Debug, Clone)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, Json>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    pub fn new(measurement: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.to_string(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }

    pub fn tag_opt(mut self, key: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(v) = value {
            self.tags.insert(key.to_string(), v.into());
        }
        self
    }

    pub fn field(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn field_opt(mut self, key: &str, value: Option<impl Into<Json>>) -> Self {
        if let Some(v) = value {
            self.fields.insert(key.to_string(), v.into());
        }
        self
    }

    /// Renders InfluxDB-style line protocol:
    /// `measurement,tag=v,tag2=v2 field=1,field2="s" <unix_nanos>`.
    pub fn to_line_protocol(&self) -> String {
        let tags: String = self
            .tags
            .iter()
            .map(|(k, v)| format!(",{}={}", escape(k), escape(v)))
            .collect();
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", escape(k), render_field(v)))
            .collect();
        format!(
            "{}{} {} {}",
            escape(&self.measurement),
            tags,
            fields.join(","),
            self.timestamp.timestamp_nanos_opt().unwrap_or_default()
        )
    }
}

fn escape(value: &str) -> String {
    value.replace(' ', "\\ ").replace(',', "\\,").replace('=', "\\=")
}

fn render_field(value: &Json) -> String {
    match value {
        Json::Number(n) if n.is_i64() || n.is_u64() => format!("{n}i"),
        Json::Number(n) => n.to_string(),
        Json::Bool(b) => b.to_string(),
        Json::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => format!("\"{other}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_tags_and_fields() {
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        let point = Point::new("interface_metrics", ts)
            .tag("device_id", "abc")
            .field("utilization", json!(12.5));
        let line = point.to_line_protocol();
        assert!(line.starts_with("interface_metrics,device_id=abc utilization=12.5 "));
    }
}
