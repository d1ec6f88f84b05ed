//! Channel relay core.
//!
//! Receives inbound channel events, gates them on the owner-controlled
//! active/paused flag, and copies eligible source-channel posts into the
//! target channel. Also hosts the startup permission check and the owner
//! notification side channel. The messaging platform is reached only through
//! [`PlatformClient`].

pub mod boundary;
pub mod commands;
pub mod error;
pub mod event;
pub mod gate;
pub mod notify;
pub mod platform;
pub mod router;
pub mod verify;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_support;

pub use {
    commands::{Command, CommandContext, CommandSurface},
    error::{Error, Result},
    event::{ChannelPost, ContentFilter, ContentKind, InboundEvent, MediaKind},
    gate::{GateChange, RelayGate, Unauthorized},
    notify::OwnerNotifier,
    platform::{ChatMemberInfo, MemberStatus, PlatformClient},
    router::{Relay, RouteOutcome},
    verify::{
        ChannelCheck, ChannelRole, PermissionResult, PermissionVerifier, Verdict, VerificationReport,
    },
};
