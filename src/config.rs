//! Worker configuration.
//!
//! A flat, ordered key/value store. Nested sections use `__` as separator,
//! the same convention environment variables use:
//!
//! ```text
//! appsettings.json                              key
//! { "ComputePlane":                             ComputePlane__WorkerChannel__Address
//!     { "WorkerChannel": { "Address": ... } } }
//! ```
//!
//! Sources are applied in call order; later sources override earlier ones.
//!
//! ```
//! use armonik_worker::config::{Configuration, Endpoint};
//!
//! let mut config = Configuration::new();
//! config.with_env_vars([
//!     ("ComputePlane__WorkerChannel__SocketType", "tcp"),
//!     ("ComputePlane__WorkerChannel__Address", "0.0.0.0:10667"),
//! ]);
//!
//! let plane = config.compute_plane();
//! assert_eq!(plane.worker, Endpoint::Tcp("0.0.0.0:10667".into()));
//! assert_eq!(plane.agent.uri(), "unix:///cache/armonik_agent.sock");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Result, WorkerError};
use crate::logging::{LogConfig, LogFormat};
use crate::processor::ProcessorConfig;

/// Separator between nested section names.
pub const SECTION_SEPARATOR: &str = "__";

/// Socket type selecting a Unix domain socket endpoint.
pub const UNIX_SOCKET_TYPE: &str = "unixdomainsocket";

/// Default worker channel socket path.
pub const DEFAULT_WORKER_ADDRESS: &str = "/cache/armonik_worker.sock";

/// Default agent channel socket path.
pub const DEFAULT_AGENT_ADDRESS: &str = "/cache/armonik_agent.sock";

const WORKER_CHANNEL: &str = "ComputePlane__WorkerChannel";
const AGENT_CHANNEL: &str = "ComputePlane__AgentChannel";
const MAX_PAYLOAD_SIZE_KEY: &str = "Worker__MaxPayloadSize";
const WORKER_NAME_KEY: &str = "Worker__Name";
const LOG_LEVEL_KEY: &str = "Logging__Level";
const LOG_FORMAT_KEY: &str = "Logging__Format";

/// Where a channel listens or connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket path.
    Unix(PathBuf),
    /// TCP address (`host:port`).
    Tcp(String),
}

impl Endpoint {
    /// Resolve an endpoint from its socket type and address.
    ///
    /// The socket type comparison ignores case; anything other than
    /// `unixdomainsocket` means TCP.
    pub fn from_socket_type(socket_type: &str, address: &str) -> Self {
        if socket_type.eq_ignore_ascii_case(UNIX_SOCKET_TYPE) {
            Endpoint::Unix(PathBuf::from(address))
        } else {
            Endpoint::Tcp(address.to_string())
        }
    }

    /// URI form: `unix://<path>` or `http://<address>`.
    pub fn uri(&self) -> String {
        match self {
            Endpoint::Unix(path) => format!("unix://{}", path.display()),
            Endpoint::Tcp(address) => format!("http://{}", address),
        }
    }
}

/// Worker and agent channel endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputePlane {
    /// Channel the runtime uses to reach this worker.
    pub worker: Endpoint,
    /// Channel this worker uses to reach the agent.
    pub agent: Endpoint,
}

/// Ordered key/value configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: BTreeMap<String, String>,
}

impl Configuration {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Copy every key of `other` over this configuration.
    pub fn merge(&mut self, other: &Configuration) -> &mut Self {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
        self
    }

    /// Value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All keys and values, sorted by key.
    pub fn list(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Load a JSON file, flattening nested objects into `__`-separated keys.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Json` if it is not valid JSON,
    /// `Config` if the top-level value is not an object.
    pub fn add_json_configuration(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&text)?;

        if !root.is_object() {
            return Err(WorkerError::Config(format!(
                "{}: top-level JSON value must be an object",
                path.display()
            )));
        }

        let before = self.values.len();
        flatten_into(&mut self.values, String::new(), &root);
        tracing::debug!(
            "Loaded configuration from {} ({} new keys)",
            path.display(),
            self.values.len() - before
        );
        Ok(self)
    }

    /// Load every variable of the process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn add_env_configuration(&mut self) -> &mut Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        self.with_env_vars(vars)
    }

    /// Load variables from an explicit iterator instead of the process
    /// environment.
    pub fn with_env_vars<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.values.insert(key.into(), value.into());
        }
        self
    }

    /// Worker and agent channel endpoints, with defaults for missing keys.
    pub fn compute_plane(&self) -> ComputePlane {
        ComputePlane {
            worker: self.endpoint(WORKER_CHANNEL, DEFAULT_WORKER_ADDRESS),
            agent: self.endpoint(AGENT_CHANNEL, DEFAULT_AGENT_ADDRESS),
        }
    }

    fn endpoint(&self, section: &str, default_address: &str) -> Endpoint {
        let socket_type = self
            .get(&format!("{}{}SocketType", section, SECTION_SEPARATOR))
            .unwrap_or(UNIX_SOCKET_TYPE);
        let address = self
            .get(&format!("{}{}Address", section, SECTION_SEPARATOR))
            .unwrap_or(default_address);
        Endpoint::from_socket_type(socket_type, address)
    }

    /// Processor settings (`Worker__MaxPayloadSize`, `Worker__Name`).
    ///
    /// # Errors
    ///
    /// `Config` if the payload size is not a positive integer.
    pub fn processor_config(&self) -> Result<ProcessorConfig> {
        let mut config = ProcessorConfig::default();

        if let Some(raw) = self.get(MAX_PAYLOAD_SIZE_KEY) {
            config.max_payload_size = match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(WorkerError::Config(format!(
                        "{} must be a positive integer, got '{}'",
                        MAX_PAYLOAD_SIZE_KEY, raw
                    )))
                }
            };
        }
        if let Some(name) = self.get(WORKER_NAME_KEY) {
            config.name = name.to_string();
        }

        Ok(config)
    }

    /// Logging settings (`Logging__Level`, `Logging__Format`).
    ///
    /// # Errors
    ///
    /// `Config` if the format is neither `text` nor `json`.
    pub fn log_config(&self) -> Result<LogConfig> {
        let mut config = LogConfig::default();

        if let Some(level) = self.get(LOG_LEVEL_KEY) {
            config.level = level.to_string();
        }
        if let Some(format) = self.get(LOG_FORMAT_KEY) {
            config.format = format.parse::<LogFormat>()?;
        }

        Ok(config)
    }
}

fn flatten_into(out: &mut BTreeMap<String, String>, prefix: String, value: &Value) {
    let child_key = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", prefix, SECTION_SEPARATOR, key)
        }
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(out, child_key(key), child);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(out, child_key(&index.to_string()), child);
            }
        }
        Value::String(s) => {
            out.insert(prefix, s.clone());
        }
        Value::Null => {
            out.insert(prefix, String::new());
        }
        scalar => {
            out.insert(prefix, scalar.to_string());
        }
    }
}
