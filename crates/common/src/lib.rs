//! Shared identifier types and error helpers used across all chanrelay crates.

pub mod error;
pub mod media;
pub mod types;

pub use {
    error::FromMessage,
    media::MediaKind,
    types::{ChatId, ChatKind, MessageId, UserId},
};
