use std::{collections::BTreeMap, fs, io, path::Path};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::ProductFilters;
use url::Url;

pub const SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub log_filter: String,
    pub default_filters: ProductFilters,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000/api".into(),
            log_filter: "info".into(),
            default_filters: ProductFilters::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    log_filter: Option<String>,
    #[serde(default)]
    filters: BTreeMap<String, String>,
}

/// Defaults, then `catalog.toml` (or `path`), then environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = path.unwrap_or_else(|| Path::new(SETTINGS_FILE));
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    validate(&settings)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if !file_cfg.filters.is_empty() {
        settings.default_filters = file_cfg.filters.into_iter().collect();
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CATALOG_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("CATALOG_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

pub fn validate(settings: &Settings) -> anyhow::Result<()> {
    let url = Url::parse(settings.api_url.trim())
        .with_context(|| format!("invalid api_url '{}'", settings.api_url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("api_url must use http or https, got '{}'", url.scheme());
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
