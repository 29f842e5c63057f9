use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, bail, Context};
use tracing::warn;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001";
pub const SETTINGS_FILE: &str = "poster.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
        }
    }
}

impl ClientSettings {
    /// Applies an explicit override (e.g. a command-line flag) on top of the
    /// loaded settings.
    pub fn with_server_url(mut self, server_url: Option<&str>) -> anyhow::Result<Self> {
        if let Some(raw) = server_url {
            self.server_url = normalize_server_url(raw)?;
        }
        Ok(self)
    }
}

/// Defaults, then `poster.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    resolve_settings(file.as_deref(), |name| std::env::var(name).ok())
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    Ok(resolve_settings(Some(&raw), |name| std::env::var(name).ok()))
}

pub(crate) fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("server_url") {
                    apply_server_url(&mut settings, v, SETTINGS_FILE);
                }
            }
            Err(err) => warn!("ignoring unreadable {SETTINGS_FILE}: {err}"),
        }
    }

    if let Some(v) = env("POSTER_SERVER_URL") {
        apply_server_url(&mut settings, &v, "POSTER_SERVER_URL");
    }
    if let Some(v) = env("APP__SERVER_URL") {
        apply_server_url(&mut settings, &v, "APP__SERVER_URL");
    }

    settings
}

fn apply_server_url(settings: &mut ClientSettings, raw: &str, source: &str) {
    match normalize_server_url(raw) {
        Ok(url) => settings.server_url = url,
        Err(err) => warn!(source, "ignoring server_url: {err:#}"),
    }
}

pub fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("server url is empty");
    }

    let parsed = Url::parse(trimmed).map_err(|err| anyhow!("invalid server url '{trimmed}': {err}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("server url '{trimmed}' must use http or https");
    }
    if parsed.host_str().is_none() {
        bail!("server url '{trimmed}' has no host");
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
