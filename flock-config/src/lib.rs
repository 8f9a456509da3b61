//! Loader for the flock configuration file with environment overlays.
//!
//! The file carries the platform credentials the scraper logs in with, plus
//! an optional server section. A missing file or a missing credential field
//! is a load error, so a broken deployment fails before the listener binds.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct FlockConfig {
    pub credentials: Credentials,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Username/password pair for the upstream login flow. Both fields are
/// required; there is no anonymous mode.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_upstream")]
    pub upstream: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            upstream: default_upstream(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".into()
}
fn default_upstream() -> String {
    "https://api.twitter.com".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (file + env overrides).
pub struct FlockConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for FlockConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FlockConfigLoader {
    /// Start with the defaults: config file plus `FLOCK_` env overrides.
    ///
    /// ```
    /// use flock_config::FlockConfigLoader;
    ///
    /// let cfg = FlockConfigLoader::new()
    ///     .with_yaml_str("credentials:\n  username: alice\n  password: hunter2")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.credentials.username, "alice");
    /// assert_eq!(cfg.server.bind_addr, "0.0.0.0:8000");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by
    /// suffix. The file is required, so startup fails loudly when it is gone.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (tests, CLI overrides).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder, expand `${VAR}` placeholders, and deserialize the
    /// merged sources into the typed config.
    pub fn load(self) -> Result<FlockConfig, ConfigError> {
        // The env source goes in last: the `config` crate gives precedence to
        // later sources, and `FLOCK_` overrides must win over file values.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("FLOCK")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        // Round-trip through serde_json::Value so env expansion sees every
        // string regardless of which source it came from.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: FlockConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
