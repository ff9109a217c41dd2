//! Configuration loading.
//!
//! Resolution order: explicit path, `./config/chartsync.yaml`, then
//! `<config dir>/chartsync/config.yaml`. A missing file means defaults.
//! Environment overrides are applied last.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use interval_sync::{
    AmbiguityPolicy, IntervalCatalog, IntervalOption, PageSelectors, SyncPolicyView,
};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

pub const ENV_SWITCH_DELAY_MS: &str = "CHARTSYNC_SWITCH_DELAY_MS";
pub const ENV_WAIT_TIMEOUT_MS: &str = "CHARTSYNC_WAIT_TIMEOUT_MS";
pub const ENV_AMBIGUITY: &str = "CHARTSYNC_AMBIGUITY";
pub const ENV_LOG_LEVEL: &str = "CHARTSYNC_LOG_LEVEL";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSyncConfig {
    pub log_level: String,
    pub sync: SyncPolicyView,
    pub selectors: PageSelectors,
    /// Replaces the built-in interval catalog when set.
    pub intervals: Option<Vec<IntervalOption>>,
}

impl Default for ChartSyncConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            sync: SyncPolicyView::default(),
            selectors: PageSelectors::default(),
            intervals: None,
        }
    }
}

impl ChartSyncConfig {
    pub fn catalog(&self) -> Result<IntervalCatalog> {
        match &self.intervals {
            Some(options) => IntervalCatalog::from_options(options.clone())
                .context("Invalid interval catalog"),
            None => Ok(IntervalCatalog::builtin()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.sync.validate().context("Invalid sync policy")?;
        self.selectors.validate().context("Invalid page selectors")?;
        self.catalog()?;
        Ok(())
    }

    /// Applies overrides read through `lookup`, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_SWITCH_DELAY_MS) {
            self.sync.timings.switch_delay_ms = parse_ms(ENV_SWITCH_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WAIT_TIMEOUT_MS) {
            self.sync.timings.wait_timeout_ms = parse_ms(ENV_WAIT_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AMBIGUITY) {
            self.sync.ambiguity = parse_ambiguity(&raw)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        Ok(())
    }
}

fn parse_ms(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .with_context(|| format!("{name} must be a whole number of milliseconds, got {raw:?}"))
}

fn parse_ambiguity(raw: &str) -> Result<AmbiguityPolicy> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "last_opened" => Ok(AmbiguityPolicy::LastOpened),
        "fail_closed" => Ok(AmbiguityPolicy::FailClosed),
        other => bail!("{ENV_AMBIGUITY} must be last_opened or fail_closed, got {other:?}"),
    }
}

pub struct LoadedConfig {
    pub config: ChartSyncConfig,
    pub path: PathBuf,
}

fn default_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/chartsync.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("chartsync");
    path.push("config.yaml");
    Ok(path)
}

pub async fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with(config_path, |name| env::var(name).ok()).await
}

/// [`load_config`] with an explicit override source.
pub async fn load_config_with<F>(config_path: Option<&Path>, lookup: F) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => default_path()?,
    };

    let mut config = if path.exists() {
        let content = fs::read_to_string(&path)
            .await
            .context("Failed to read config file")?;
        let config: ChartSyncConfig =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded configuration from: {}", path.display());
        config
    } else {
        warn!("Config file not found, using defaults: {}", path.display());
        ChartSyncConfig::default()
    };

    config.apply_overrides(lookup)?;
    config.validate()?;
    Ok(LoadedConfig { config, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguity_accepts_either_separator() {
        assert_eq!(
            parse_ambiguity("fail-closed").unwrap(),
            AmbiguityPolicy::FailClosed
        );
        assert_eq!(
            parse_ambiguity(" Last_Opened ").unwrap(),
            AmbiguityPolicy::LastOpened
        );
        assert!(parse_ambiguity("random").is_err());
    }

    #[test]
    fn non_numeric_delay_is_rejected() {
        let mut config = ChartSyncConfig::default();
        let err = config
            .apply_overrides(|name| (name == ENV_SWITCH_DELAY_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SWITCH_DELAY_MS));
    }
}
