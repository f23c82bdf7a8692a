use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::infrastructure::abi::DEFAULT_DIRECTORY_URL;
use crate::infrastructure::ethereum::ProviderConfig;

pub const DEFAULT_RPC: &str = "https://rpc.testnet.lukso.network";
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROBE_CONCURRENCY: usize = 4;

/// Network-default sample LSP7 tokens, always offered for discovery
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleTokens {
    pub lsp7_divisible: Option<String>,
    pub lsp7_non_divisible: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub rpc: Option<String>,
    pub ws: Option<String>,
    pub ipc: Option<String>,

    pub directory_url: Option<String>,
    pub call_timeout_secs: Option<u64>,
    pub probe_concurrency: Option<usize>,
    pub registry_max_age_secs: Option<u64>,
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub samples: SampleTokens,
}

impl Config {
    /// Transport to use: IPC, then WebSocket, then HTTP
    pub fn provider_config(&self) -> ProviderConfig {
        #[cfg(unix)]
        {
            if let Some(path) = non_empty(&self.ipc) {
                return ProviderConfig::Ipc(PathBuf::from(path));
            }
        }
        if let Some(url) = non_empty(&self.ws) {
            return ProviderConfig::WebSocket(url.to_string());
        }
        ProviderConfig::Http(non_empty(&self.rpc).unwrap_or(DEFAULT_RPC).to_string())
    }

    pub fn directory_url(&self) -> &str {
        non_empty(&self.directory_url).unwrap_or(DEFAULT_DIRECTORY_URL)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs.unwrap_or(DEFAULT_CALL_TIMEOUT_SECS))
    }

    pub fn probe_concurrency(&self) -> usize {
        self.probe_concurrency
            .unwrap_or(DEFAULT_PROBE_CONCURRENCY)
            .max(1)
    }

    pub fn registry_max_age(&self) -> Option<Duration> {
        self.registry_max_age_secs.map(Duration::from_secs)
    }

    /// Configured sample token addresses; unparsable entries are skipped
    pub fn sample_tokens(&self) -> Vec<Address> {
        [&self.samples.lsp7_divisible, &self.samples.lsp7_non_divisible]
            .into_iter()
            .filter_map(non_empty)
            .filter_map(|value| match Address::from_str(value) {
                Ok(address) => Some(address),
                Err(err) => {
                    tracing::warn!(%value, "ignoring invalid sample token address: {err}");
                    None
                }
            })
            .collect()
    }

    pub fn lookup_db_path(&self) -> Option<PathBuf> {
        self.data_dir().map(|dir| dir.join("lookups.sqlite3"))
    }

    pub fn assets_db_path(&self) -> Option<PathBuf> {
        self.data_dir().map(|dir| dir.join("assets.sqlite3"))
    }

    fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(data_dir)
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring invalid config: {err}");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("LSPSCOPE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("lspscope").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("lspscope").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "lspscope", "lspscope")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("lspscope"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("lspscope"));
    }
    directories::ProjectDirs::from("io", "lspscope", "lspscope")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
