//! Configuration loading, env substitution, env overrides, and validation.
//!
//! Config files: `chanrelay.toml`, `chanrelay.yaml`, or `chanrelay.json`
//! Searched in `./` then `~/.config/chanrelay/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values. The
//! deployment variables (`BOT_TOKEN`, `CHANNEL_SOURCE_ID`,
//! `CHANNEL_TARGET_ID`, `OWNER_ID`) override file values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{
        apply_env_overrides, config_dir, discover_and_load, find_config_file, load, load_config,
    },
    schema::{ChanrelayConfig, PollingConfig, RelaySection, TelegramSection},
    validate::RelayConfig,
};
