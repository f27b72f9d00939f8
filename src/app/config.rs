//! File configuration for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Flat `key = value` configuration read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Archive base address.
    pub base_url: Option<String>,
    /// Default download directory.
    pub output_dir: Option<PathBuf>,
    /// Attempts per file, including the first (1..=20).
    pub max_attempts: Option<u32>,
    /// Delay before the first retry in seconds (0..=300).
    pub retry_base_delay_secs: Option<u64>,
    /// Upper bound of random jitter added to each backoff, in ms (0..=10000).
    pub retry_jitter_ms: Option<u64>,
    /// HTTP connect timeout in seconds (1..=3600).
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds (1..=86400); unset means none.
    pub read_timeout_secs: Option<u64>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against the ranges the CLI accepts.
    pub fn validate(&self) -> Result<()> {
        validate_range("max_attempts", self.max_attempts.map(u64::from), 1, 20)?;
        validate_range("retry_base_delay_secs", self.retry_base_delay_secs, 0, 300)?;
        validate_range("retry_jitter_ms", self.retry_jitter_ms, 0, 10_000)?;
        validate_range("connect_timeout_secs", self.connect_timeout_secs, 1, 3600)?;
        validate_range("read_timeout_secs", self.read_timeout_secs, 1, 86_400)?;

        if let Some(base_url) = &self.base_url
            && base_url.trim().is_empty()
        {
            bail!("Invalid config value for `base_url`: must not be empty");
        }
        Ok(())
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
    }
    Ok(())
}

/// `verbosity` values accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl FromStr for VerbositySetting {
    type Err = anyhow::Error;

    fn from_str(label: &str) -> Result<Self> {
        Ok(match label {
            "default" => Self::Default,
            "verbose" => Self::Verbose,
            "quiet" => Self::Quiet,
            "debug" => Self::Debug,
            other => bail!("'{other}' is not one of: default, verbose, quiet, debug"),
        })
    }
}

/// `$XDG_CONFIG_HOME/datfetch/config.toml`, else `$HOME/.config/datfetch/config.toml`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let non_empty = |name: &str| env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
    let config_home = non_empty("XDG_CONFIG_HOME")
        .or_else(|| non_empty("HOME").map(|home| home.join(".config")))?;
    Some(config_home.join("datfetch").join("config.toml"))
}

/// Loads the config from the default path; `None` when there is no file.
pub fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (number, line) in raw.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let line = strip_inline_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {number}: expected key = value");
        };
        let (key, value) = (key.trim(), value.trim());
        let known = apply_entry(&mut cfg, key, value)
            .with_context(|| format!("Invalid `{key}` value on line {number}"))?;
        if !known {
            bail!("Unknown configuration key: '{key}' on line {number}");
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

/// Stores one entry; `Ok(false)` when the key is not recognised.
fn apply_entry(cfg: &mut FileConfig, key: &str, value: &str) -> Result<bool> {
    match key {
        "base_url" => cfg.base_url = Some(quoted(value)?),
        "output_dir" => cfg.output_dir = Some(PathBuf::from(quoted(value)?)),
        "max_attempts" => cfg.max_attempts = Some(u32::try_from(unsigned(value)?)?),
        "retry_base_delay_secs" => cfg.retry_base_delay_secs = Some(unsigned(value)?),
        "retry_jitter_ms" => cfg.retry_jitter_ms = Some(unsigned(value)?),
        "connect_timeout_secs" => cfg.connect_timeout_secs = Some(unsigned(value)?),
        "read_timeout_secs" => cfg.read_timeout_secs = Some(unsigned(value)?),
        "verbosity" => cfg.verbosity = Some(quoted(value)?.parse()?),
        _ => return Ok(false),
    }
    Ok(true)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn quoted(value: &str) -> Result<String> {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        bail!("Expected double-quoted string");
    };
    Ok(inner.replace("\\\\", "\\"))
}

fn unsigned(value: &str) -> Result<u64> {
    if value.starts_with('-') {
        bail!("Expected non-negative integer");
    }
    value
        .parse::<u64>()
        .with_context(|| format!("Expected integer, found '{value}'"))
}
