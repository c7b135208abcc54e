use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;

use crate::{
    contract::{ContractConfig, DEFAULT_CHAIN_ID, DEFAULT_CONTRACT_ADDRESS},
    wallet::{DEFAULT_CONFIRMATION_ATTEMPTS, DEFAULT_CONFIRMATION_POLL_INTERVAL},
};

pub const DEFAULT_SETTINGS_FILE: &str = "watt.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rpc_url: Option<String>,
    pub wallet_account: Option<String>,
    pub contract_address: String,
    pub chain_id: u64,
    pub database_url: String,
    pub confirmation_poll_ms: u64,
    pub confirmation_attempts: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: None,
            wallet_account: None,
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_checksum(None),
            chain_id: DEFAULT_CHAIN_ID,
            database_url: "sqlite://./data/client.db".into(),
            confirmation_poll_ms: DEFAULT_CONFIRMATION_POLL_INTERVAL.as_millis() as u64,
            confirmation_attempts: DEFAULT_CONFIRMATION_ATTEMPTS,
        }
    }
}

impl Settings {
    pub fn contract(&self) -> Result<ContractConfig> {
        ContractConfig::new(&self.contract_address, self.chain_id)
    }

    pub fn confirmation_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_ms)
    }
}

/// Defaults, then `watt.toml` (or `path`), then environment variables.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    load_settings_with(&path, |name| std::env::var(name).ok())
}

pub fn load_settings_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                let values: HashMap<String, String> = file_cfg
                    .into_iter()
                    .filter_map(|(key, value)| toml_scalar(value).map(|v| (key, v)))
                    .collect();
                apply(&mut settings, |key| values.get(key).cloned());
            }
            Err(err) => tracing::warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    apply(&mut settings, |key| {
        env(&format!("APP__{}", key.to_ascii_uppercase()))
            .or_else(|| legacy_env_name(key).and_then(&env))
    });

    settings
}

fn legacy_env_name(key: &str) -> Option<&'static str> {
    match key {
        "rpc_url" => Some("RPC_URL"),
        "database_url" => Some("DATABASE_URL"),
        _ => None,
    }
}

fn toml_scalar(value: toml::Value) -> Option<String> {
    match value {
        toml::Value::String(v) => Some(v),
        toml::Value::Integer(v) => Some(v.to_string()),
        toml::Value::Float(v) => Some(v.to_string()),
        toml::Value::Boolean(v) => Some(v.to_string()),
        _ => None,
    }
}

fn apply(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("rpc_url").filter(|v| !v.trim().is_empty()) {
        settings.rpc_url = Some(v);
    }
    if let Some(v) = lookup("wallet_account").filter(|v| !v.trim().is_empty()) {
        settings.wallet_account = Some(v);
    }
    if let Some(v) = lookup("contract_address") {
        settings.contract_address = v;
    }
    if let Some(v) = lookup("chain_id") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.chain_id = parsed;
        }
    }
    if let Some(v) = lookup("database_url") {
        settings.database_url = v;
    }
    if let Some(v) = lookup("confirmation_poll_ms") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.confirmation_poll_ms = parsed;
        }
    }
    if let Some(v) = lookup("confirmation_attempts") {
        if let Ok(parsed) = v.trim().parse::<usize>() {
            settings.confirmation_attempts = parsed;
        }
    }
}

/// Turns a bare file path into a `sqlite://` URL. Directory creation is left
/// to `storage::Storage::new`.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
