//! Time-series storage speaking the Influx line protocol over HTTP.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Deserialize;

use telemeter_core::{Labels, Measure, MeasureValue, Measures, Result, TelemeterError};

use super::Storage;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Ns,
    Us,
    Ms,
    #[default]
    S,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Ns => "ns",
            Precision::Us => "us",
            Precision::Ms => "ms",
            Precision::S => "s",
        }
    }

    /// `None` when the instant does not fit in nanoseconds.
    pub fn timestamp(&self, at: DateTime<Utc>) -> Option<i64> {
        match self {
            Precision::Ns => at.timestamp_nanos_opt(),
            Precision::Us => Some(at.timestamp_micros()),
            Precision::Ms => Some(at.timestamp_millis()),
            Precision::S => Some(at.timestamp()),
        }
    }
}

impl std::str::FromStr for Precision {
    type Err = TelemeterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ns" => Ok(Precision::Ns),
            "us" => Ok(Precision::Us),
            "ms" => Ok(Precision::Ms),
            "s" => Ok(Precision::S),
            other => Err(TelemeterError::InvalidArgument(format!(
                "unsupported precision {other}"
            ))),
        }
    }
}

/// Connection settings; swappable at runtime through `reinitialize`.
#[derive(Debug, Clone, Default)]
pub struct InfluxSettings {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub precision: Precision,
}

impl InfluxSettings {
    fn write_url(&self) -> String {
        format!("{}/write", self.url.trim_end_matches('/'))
    }
}

struct Connection {
    client: reqwest::Client,
    settings: InfluxSettings,
}

pub struct InfluxStorage {
    id: String,
    labels: RwLock<Labels>,
    conn: RwLock<Arc<Connection>>,
}

impl InfluxStorage {
    pub fn new(settings: InfluxSettings) -> Result<Self> {
        Self::with_id("", settings)
    }

    /// An empty id gets a generated uuid.
    pub fn with_id(id: impl Into<String>, settings: InfluxSettings) -> Result<Self> {
        let mut id = id.into();
        if id.is_empty() {
            id = uuid::Uuid::new_v4().to_string();
        }
        Ok(Self {
            id,
            labels: RwLock::new(Labels::new()),
            conn: RwLock::new(Arc::new(connect(settings)?)),
        })
    }

    /// Swap client and settings. In-flight writes finish on the old ones.
    pub fn reinitialize(&self, settings: InfluxSettings) -> Result<()> {
        let fresh = Arc::new(connect(settings)?);
        *self.conn.write() = fresh;
        tracing::info!(storage = %self.id, "influx storage reinitialized");
        Ok(())
    }

    pub fn settings(&self) -> InfluxSettings {
        self.conn.read().settings.clone()
    }

    /// Line-protocol body for one batch.
    pub fn encode(&self, measures: &[Measure]) -> Result<Bytes> {
        let overlay = self.labels.read().clone();
        let precision = self.conn.read().settings.precision;
        encode_points(&self.id, measures, &overlay, precision)
    }
}

#[async_trait]
impl Storage for InfluxStorage {
    fn id(&self) -> &str {
        &self.id
    }

    async fn write(&self, measures: Arc<Measures>) -> Result<()> {
        let body = self.encode(&measures)?;
        if body.is_empty() {
            return Ok(());
        }

        let conn = Arc::clone(&self.conn.read());
        let settings = &conn.settings;
        let mut request = conn
            .client
            .post(settings.write_url())
            .query(&[
                ("db", settings.database.as_str()),
                ("precision", settings.precision.as_str()),
            ])
            .body(body);
        if !settings.username.is_empty() {
            request = request.basic_auth(&settings.username, Some(&settings.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| TelemeterError::storage(&self.id, e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TelemeterError::storage(
                &self.id,
                format!("influx responded {status}: {}", text.trim()),
            ));
        }
        Ok(())
    }

    fn set_labels(&self, labels: Labels) {
        *self.labels.write() = labels;
    }
}

fn connect(settings: InfluxSettings) -> Result<Connection> {
    if settings.url.is_empty() {
        return Err(TelemeterError::InvalidArgument("influx url is empty".into()));
    }
    if settings.database.is_empty() {
        return Err(TelemeterError::InvalidArgument("influx database is empty".into()));
    }
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| TelemeterError::Internal(format!("influx client: {e}")))?;
    Ok(Connection { client, settings })
}

fn encode_points(
    id: &str,
    measures: &[Measure],
    overlay: &Labels,
    precision: Precision,
) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(measures.len() * 64);
    let mut line = String::with_capacity(128);

    for m in measures {
        let fields: Vec<(String, f64)> = match &m.value {
            MeasureValue::Scalar { value, sample_count } => {
                vec![
                    ("value".to_string(), *value),
                    ("sample_count".to_string(), *sample_count as f64),
                ]
            }
            MeasureValue::Summary(s) => {
                if s.sample_count == 0 {
                    continue;
                }
                let mut fields = vec![("sample_count".to_string(), s.sample_count as f64)];
                fields.extend(s.finite_fields());
                fields
            }
        };
        let fields: Vec<_> = fields.into_iter().filter(|(_, v)| v.is_finite()).collect();
        if fields.is_empty() {
            tracing::warn!(storage = %id, metric = %m.description.name(), "no finite fields; point skipped");
            continue;
        }

        let Some(ts) = precision.timestamp(m.created_at) else {
            tracing::warn!(storage = %id, metric = %m.description.name(), "timestamp out of range; point skipped");
            continue;
        };

        line.clear();
        escape_into(&mut line, m.description.name(), &[',', ' ']);
        for (key, value) in Labels::merged_map(overlay, m.description.labels()) {
            line.push(',');
            escape_into(&mut line, &key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, &value, &[',', '=', ' ']);
        }
        for (i, (name, value)) in fields.iter().enumerate() {
            line.push(if i == 0 { ' ' } else { ',' });
            escape_into(&mut line, name, &[',', '=', ' ']);
            line.push('=');
            write!(line, "{value}")
                .map_err(|e| TelemeterError::storage(id, format!("encode point: {e}")))?;
        }
        write!(line, " {ts}")
            .map_err(|e| TelemeterError::storage(id, format!("encode point: {e}")))?;

        buf.put_slice(line.as_bytes());
        buf.put_u8(b'\n');
    }

    Ok(buf.freeze())
}

fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for c in raw.chars() {
        if c == '\\' || special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
