//! Telegram adapter for the channel relay.
//!
//! Implements the relay's platform client over `teloxide`, turns Bot API
//! updates into relay events and commands, and runs the long-poll loop.

pub mod bot;
pub mod client;
pub mod commands;
pub mod error;
pub mod events;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_support;

pub use {
    bot::{
        RelayHandle, UpdateHandler, build_bot, start_polling, start_with_bot, verify_permissions,
    },
    client::TelegramClient,
    commands::RelayCommand,
    error::{Error, Result},
    events::{Incoming, classify_update, content_kind},
};
