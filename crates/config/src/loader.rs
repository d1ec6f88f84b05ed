use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, info},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::ChanrelayConfig,
    validate::RelayConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "chanrelay.toml",
    "chanrelay.yaml",
    "chanrelay.yml",
    "chanrelay.json",
];

/// Environment variables that override file values.
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_SOURCE_CHANNEL: &str = "CHANNEL_SOURCE_ID";
pub const ENV_TARGET_CHANNEL: &str = "CHANNEL_TARGET_ID";
pub const ENV_OWNER: &str = "OWNER_ID";

/// Load, override, and validate the relay configuration.
///
/// `explicit` wins over discovery. A missing config file is fine as long as
/// the environment supplies every required value.
pub fn load(explicit: Option<&Path>) -> Result<RelayConfig> {
    let mut cfg = match explicit {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            load_config(path)?
        },
        None => discover_and_load()?,
    };
    apply_env_overrides(&mut cfg)?;
    cfg.validate()
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<ChanrelayConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./chanrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/chanrelay/chanrelay.{toml,yaml,yml,json}` (user-global)
///
/// Returns `ChanrelayConfig::default()` if no config file is found.
pub fn discover_and_load() -> Result<ChanrelayConfig> {
    match find_config_file() {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            load_config(&path)
        },
        None => {
            debug!("no config file found, relying on environment");
            Ok(ChanrelayConfig::default())
        },
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/chanrelay/
    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/chanrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "chanrelay").map(|d| d.config_dir().to_path_buf())
}

/// Apply `BOT_TOKEN`, `CHANNEL_SOURCE_ID`, `CHANNEL_TARGET_ID`, and
/// `OWNER_ID` from the process environment on top of file values.
pub fn apply_env_overrides(cfg: &mut ChanrelayConfig) -> Result<()> {
    apply_env_overrides_with(cfg, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    cfg: &mut ChanrelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let get = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(token) = get(ENV_BOT_TOKEN) {
        debug!(var = ENV_BOT_TOKEN, "bot token taken from environment");
        cfg.telegram.token = Some(Secret::new(token));
    }
    if let Some(raw) = get(ENV_SOURCE_CHANNEL) {
        cfg.relay.source_channel_id = Some(parse_env(ENV_SOURCE_CHANNEL, &raw)?);
    }
    if let Some(raw) = get(ENV_TARGET_CHANNEL) {
        cfg.relay.target_channel_id = Some(parse_env(ENV_TARGET_CHANNEL, &raw)?);
    }
    if let Some(raw) = get(ENV_OWNER) {
        cfg.relay.owner_id = Some(parse_env(ENV_OWNER, &raw)?);
    }
    Ok(())
}

fn parse_env<T>(name: &'static str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| Error::invalid(name, raw, format!("not a valid integer: {e}")))
}

fn parse_config(raw: &str, path: &Path) -> Result<ChanrelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| Error::parse(path, e)),
        "yaml" | "yml" => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(raw).map_err(|e| Error::parse(path, e))?;
            let json = serde_json::to_value(value).context("convert yaml config")?;
            serde_json::from_value(json).map_err(|e| Error::parse(path, e))
        },
        "json" => serde_json::from_str(raw).map_err(|e| Error::parse(path, e)),
        _ => Err(Error::parse(path, format!("unsupported config format: .{ext}"))),
    }
}
