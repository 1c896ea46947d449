// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "incidencias";
const DEFAULT_IDENTITY_BASE_URL: &str = "http://localhost:54321";
const DEFAULT_ASSISTANT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub assistant: Assistant,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            identity: Identity::default(),
            assistant: Assistant::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub base_url: Option<String>,
    pub anon_key: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_IDENTITY_BASE_URL.to_owned()),
            anon_key: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Assistant {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_ASSISTANT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub show_summary: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            show_summary: Some(true),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("INCIDENCIAS_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set INCIDENCIAS_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and place values under [identity], [assistant], and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for (section, timeout) in [
            ("identity", &self.identity.timeout),
            ("assistant", &self.assistant.timeout),
        ] {
            if let Some(timeout) = timeout {
                let parsed = parse_duration(timeout)?;
                if parsed <= Duration::ZERO {
                    bail!(
                        "{section}.timeout in {} must be positive, got {}",
                        path.display(),
                        timeout
                    );
                }
            }
        }
        Ok(())
    }

    pub fn identity_base_url(&self) -> &str {
        self.identity
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_IDENTITY_BASE_URL)
            .trim_end_matches('/')
    }

    /// The anon key has no usable default; registration stays disabled
    /// until the operator sets one.
    pub fn identity_anon_key(&self) -> Option<&str> {
        self.identity
            .anon_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn identity_timeout(&self) -> Result<Duration> {
        parse_duration(self.identity.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn assistant_base_url(&self) -> &str {
        self.assistant
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_ASSISTANT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn assistant_timeout(&self) -> Result<Duration> {
        parse_duration(self.assistant.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn show_summary(&self) -> bool {
        self.ui.show_summary.unwrap_or(true)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# incidencias config\n# Place this file at: {}\n\nversion = 1\n\n[identity]\nbase_url = \"{}\"\n# anon_key = \"<project anon key>\"\ntimeout = \"10s\"\n\n[assistant]\nbase_url = \"{}\"\ntimeout = \"10s\"\n\n[ui]\nshow_summary = true\n",
            path.display(),
            DEFAULT_IDENTITY_BASE_URL,
            DEFAULT_ASSISTANT_BASE_URL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
