use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::credential::{MAX_COST, MIN_COST};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SERVICE_NAME: &str = "reload-sample";
pub const DEFAULT_HASH_COST: u32 = 10;
pub const DEFAULT_RELOAD_MARKER: &str = "CODE_ONLY_CHANGE_SUCCESS";

#[derive(Debug, Parser)]
#[command(
    name = "reload-sample",
    version,
    about = "Sample HTTP service for validating dev-container hot reload"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub host: Option<IpAddr>,

    #[arg(long, short = 'p', value_name = "PORT")]
    pub port: Option<u16>,

    #[arg(long, value_name = "NAME")]
    pub service_name: Option<String>,

    /// bcrypt work factor used by `/hash`.
    #[arg(long, value_name = "COST")]
    pub hash_cost: Option<u32>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub service_name: String,
    pub hash_cost: u32,
    pub reload_marker: String,
    /// HMAC secret for issued tokens. `None` means the built-in demo key.
    pub token_signing_key: Option<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind", &self.bind)
            .field("service_name", &self.service_name)
            .field("hash_cost", &self.hash_cost)
            .field("reload_marker", &self.reload_marker)
            .field(
                "token_signing_key",
                &self.token_signing_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid numeric value for env var {key}: {value}")]
    InvalidEnvNumber { key: String, value: String },
    #[error("hash cost {0} is outside the supported bcrypt range 4..=31")]
    HashCostOutOfRange(u32),
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    host: Option<IpAddr>,
    port: Option<u16>,
    service_name: Option<String>,
    hash_cost: Option<u32>,
    reload_marker: Option<String>,
    token_signing_key: Option<String>,
}

/// Raw values of the environment variables the service understands.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub service_name: Option<String>,
    pub hash_cost: Option<String>,
    pub reload_marker: Option<String>,
    pub token_signing_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_process() -> Self {
        Self {
            port: read_env("PORT"),
            service_name: read_env("SERVICE_NAME"),
            hash_cost: read_env("HASH_COST"),
            reload_marker: read_env("RELOAD_MARKER"),
            token_signing_key: read_env("TOKEN_SIGNING_KEY"),
        }
    }
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, EnvOverrides::from_process())
    }

    /// Merges the CLI, environment and config file, in that order of precedence.
    pub fn resolve(cli: Cli, env: EnvOverrides) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;

        let host = cli
            .host
            .or(from_file.host)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = cli
            .port
            .or_else(|| parse_port(env.port.as_deref()))
            .or(from_file.port)
            .unwrap_or(DEFAULT_PORT);
        let service_name = cli
            .service_name
            .or(non_empty(env.service_name))
            .or(from_file.service_name)
            .unwrap_or_else(|| String::from(DEFAULT_SERVICE_NAME));
        let env_hash_cost = match env.hash_cost.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<u32>().map_err(|_| ConfigError::InvalidEnvNumber {
                key: String::from("HASH_COST"),
                value: String::from(raw),
            })?),
        };
        let hash_cost = cli
            .hash_cost
            .or(env_hash_cost)
            .or(from_file.hash_cost)
            .unwrap_or(DEFAULT_HASH_COST);
        if !(MIN_COST..=MAX_COST).contains(&hash_cost) {
            return Err(ConfigError::HashCostOutOfRange(hash_cost));
        }
        let reload_marker = non_empty(env.reload_marker)
            .or(from_file.reload_marker)
            .unwrap_or_else(|| String::from(DEFAULT_RELOAD_MARKER));
        let token_signing_key = non_empty(env.token_signing_key)
            .or(non_empty(from_file.token_signing_key));

        Ok(Self {
            bind: SocketAddr::new(host, port),
            service_name,
            hash_cost,
            reload_marker,
            token_signing_key,
        })
    }
}

/// Parses `PORT`. Invalid values are logged and ignored rather than failing startup.
fn parse_port(raw: Option<&str>) -> Option<u16> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Some(port),
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_PORT,
                "ignoring invalid PORT value; falling back to config file port or default"
            );
            None
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            warn!(key, "ignoring non-unicode env var");
            None
        }
    }
}
