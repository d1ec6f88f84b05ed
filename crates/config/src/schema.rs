//! On-disk config schema. Every field is optional here; [`crate::validate`]
//! turns a loaded file plus environment overrides into a [`crate::RelayConfig`].

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root of `chanrelay.{toml,yaml,json}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChanrelayConfig {
    pub telegram: TelegramSection,
    pub relay: RelaySection,
    pub polling: PollingConfig,
}

/// Bot credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    /// Bot token from @BotFather.
    #[serde(
        serialize_with = "serialize_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<Secret<String>>,
}

impl std::fmt::Debug for TelegramSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSection")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_str(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Relay routing and behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelaySection {
    /// Channel posts are read from here.
    pub source_channel_id: Option<i64>,

    /// Channel posts are copied into here.
    pub target_channel_id: Option<i64>,

    /// The only user allowed to query status and toggle forwarding.
    pub owner_id: Option<u64>,

    /// Seconds to wait after the poll loop starts before checking permissions.
    pub verify_delay_secs: u64,

    /// Uncaptioned, ungrouped media kinds that should still be copied
    /// (e.g. `"photo"`, `"video"`, `"document"`).
    pub forward_bare_media: Vec<String>,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            source_channel_id: None,
            target_channel_id: None,
            owner_id: None,
            verify_delay_secs: 1,
            forward_bare_media: Vec::new(),
        }
    }
}

/// Long-polling knobs for `getUpdates`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    /// Server-side long-poll timeout.
    pub timeout_secs: u32,

    /// Sleep after a failed `getUpdates` call.
    pub error_backoff_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            error_backoff_secs: 5,
        }
    }
}
