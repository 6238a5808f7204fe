use std::collections::{BTreeMap, HashSet};
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use telemeter_core::{Labels, Result, TelemeterError};

use crate::storage::{InfluxSettings, Precision};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub version: u32,

    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub http: HttpSection,

    #[serde(default)]
    pub collectors: CollectorsSection,

    #[serde(default)]
    pub storages: Vec<StorageConfig>,
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TelemeterError::UnsupportedVersion);
        }

        self.registry.validate()?;
        self.http.validate()?;

        let mut seen = HashSet::new();
        for storage in &self.storages {
            storage.validate()?;
            if !seen.insert(storage.id.as_str()) {
                return Err(TelemeterError::Config(format!(
                    "storages: duplicate id {}",
                    storage.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// 0 keeps the periodic sender stopped.
    #[serde(default)]
    pub send_interval_ms: u64,

    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl RegistrySection {
    pub fn validate(&self) -> Result<()> {
        if self.send_interval_ms != 0 && !(10..=3_600_000).contains(&self.send_interval_ms) {
            return Err(TelemeterError::Config(
                "registry.send_interval_ms must be 0 or between 10 and 3600000".into(),
            ));
        }
        if self.labels.keys().any(|k| k.is_empty()) {
            return Err(TelemeterError::Config(
                "registry.labels keys must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    pub fn labels(&self) -> Labels {
        Labels::new().with_map(self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl HttpSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|_| TelemeterError::Config(format!("http.listen {} is not a socket address", self.listen)))
    }
}

fn default_listen() -> String {
    "127.0.0.1:9102".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectorsSection {
    #[serde(default = "default_true")]
    pub process: bool,

    #[serde(default = "default_true")]
    pub build_info: bool,
}

impl Default for CollectorsSection {
    fn default() -> Self {
        Self {
            process: true,
            build_info: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Expvar,
    Influx,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    pub kind: StorageKind,
    pub id: String,

    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub precision: Precision,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(TelemeterError::Config("storages: id must not be empty".into()));
        }
        if self.kind == StorageKind::Influx {
            if self.url.is_empty() {
                return Err(TelemeterError::Config(format!(
                    "storages[{}]: influx url must not be empty",
                    self.id
                )));
            }
            if self.database.is_empty() {
                return Err(TelemeterError::Config(format!(
                    "storages[{}]: influx database must not be empty",
                    self.id
                )));
            }
        }
        Ok(())
    }

    pub fn influx_settings(&self) -> InfluxSettings {
        InfluxSettings {
            url: self.url.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            precision: self.precision,
        }
    }
}
