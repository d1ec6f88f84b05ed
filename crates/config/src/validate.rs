use std::time::Duration;

use {
    chanrelay_common::{ChatId, MediaKind, UserId},
    secrecy::{ExposeSecret, Secret},
};

use crate::{
    env_subst::has_placeholder,
    error::{Error, Result},
    schema::{ChanrelayConfig, PollingConfig},
};

/// Validated, immutable configuration for the lifetime of the process.
#[derive(Clone)]
pub struct RelayConfig {
    pub bot_token: Secret<String>,
    pub source_channel_id: ChatId,
    pub target_channel_id: ChatId,
    pub owner_id: UserId,
    pub verify_delay: Duration,
    pub forward_bare_media: Vec<MediaKind>,
    pub polling: PollingConfig,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bot_token", &"[REDACTED]")
            .field("source_channel_id", &self.source_channel_id)
            .field("target_channel_id", &self.target_channel_id)
            .field("owner_id", &self.owner_id)
            .field("verify_delay", &self.verify_delay)
            .field("forward_bare_media", &self.forward_bare_media)
            .finish_non_exhaustive()
    }
}

impl ChanrelayConfig {
    /// Check required fields and produce a [`RelayConfig`].
    ///
    /// All missing fields are reported together so a fresh deployment can be
    /// fixed in one pass.
    pub fn validate(self) -> Result<RelayConfig> {
        let token = self
            .telegram
            .token
            .filter(|t| !t.expose_secret().trim().is_empty());
        if let Some(t) = &token
            && has_placeholder(t.expose_secret())
        {
            return Err(Error::invalid(
                "bot token",
                "<redacted>",
                "contains an unresolved ${…} placeholder",
            ));
        }

        let relay = self.relay;
        let mut missing = Vec::new();
        if token.is_none() {
            missing.push("bot token");
        }
        if relay.source_channel_id.is_none() {
            missing.push("source channel id");
        }
        if relay.target_channel_id.is_none() {
            missing.push("target channel id");
        }
        if relay.owner_id.is_none() {
            missing.push("owner id");
        }

        let (Some(bot_token), Some(source), Some(target), Some(owner)) = (
            token,
            relay.source_channel_id,
            relay.target_channel_id,
            relay.owner_id,
        ) else {
            return Err(Error::Missing { fields: missing });
        };

        if source == target {
            return Err(Error::invalid(
                "target channel id",
                target.to_string(),
                "must differ from the source channel id",
            ));
        }

        let forward_bare_media = parse_bare_media(&relay.forward_bare_media)?;

        Ok(RelayConfig {
            bot_token,
            source_channel_id: ChatId(source),
            target_channel_id: ChatId(target),
            owner_id: UserId(owner),
            verify_delay: Duration::from_secs(relay.verify_delay_secs),
            forward_bare_media,
            polling: self.polling,
        })
    }
}

/// Names are trimmed and lowercased; blanks are skipped.
fn parse_bare_media(names: &[String]) -> Result<Vec<MediaKind>> {
    let mut kinds = Vec::new();
    for raw in names {
        let name = raw.trim().to_ascii_lowercase();
        if name.is_empty() {
            continue;
        }
        let Some(kind) = MediaKind::from_name(&name) else {
            let known: Vec<_> = MediaKind::ALL.iter().map(|k| k.as_str()).collect();
            return Err(Error::invalid(
                "forward_bare_media",
                raw.as_str(),
                format!("unknown media kind, expected one of: {}", known.join(", ")),
            ));
        };
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
