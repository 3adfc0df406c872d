use std::{fs, path::Path};
use crate::config::settings::{LogFormat, LoggingConfig, ServiceConfig};
use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::error;

/// Load service settings from a YAML file, expanding `${VAR}` / `${VAR:default}`
pub fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read settings file {}", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    if service_config.settings.refresh_timeout_ms == 0 {
        bail!("settings.refresh_timeout_ms must be greater than 0");
    }
    if !service_config.settings.metrics.path.starts_with('/') {
        service_config.settings.metrics.path = format!("/{}", service_config.settings.metrics.path);
    }

    Ok(service_config)
}

/// Read the plugin configuration bytes referenced by `plugin_config_path`
pub fn read_plugin_config(path: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read plugin config {}", path))
}

fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").unwrap();
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
