//! Startup permission check.
//!
//! The source channel must list the bot as a member or administrator; the
//! target channel must list it as an administrator with post rights. Each
//! failure produces its own owner diagnostic, followed by one summary. A
//! failed check never stops the relay.

use std::{sync::Arc, time::Duration};

use {
    chanrelay_common::{ChatId, UserId},
    tokio::task::JoinHandle,
    tracing::{error, info},
};

use crate::{
    notify::OwnerNotifier,
    platform::{ChatMemberInfo, MemberStatus, PlatformClient},
};

/// Coarse role of the bot in a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    None,
    Member,
    Administrator,
}

/// Outcome of a single membership lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResult {
    pub channel_id: ChatId,
    pub role: ChannelRole,
    pub can_post: bool,
    pub status: MemberStatus,
}

impl PermissionResult {
    fn from_member(channel_id: ChatId, info: ChatMemberInfo) -> Self {
        let (role, can_post) = match info.status {
            MemberStatus::Creator => (ChannelRole::Administrator, true),
            MemberStatus::Administrator => (ChannelRole::Administrator, info.can_post_messages),
            MemberStatus::Member => (ChannelRole::Member, false),
            MemberStatus::Restricted | MemberStatus::Left | MemberStatus::Banned => {
                (ChannelRole::None, false)
            },
        };
        Self {
            channel_id,
            role,
            can_post,
            status: info.status,
        }
    }
}

/// Pass/fail verdict for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    /// Source channel: bot is not a member.
    NotMember,
    /// Target channel: administrator without "Post messages".
    MissingPostPermission,
    /// Target channel: bot is not an administrator.
    NotAdministrator,
    /// The membership lookup itself failed.
    LookupFailed(String),
}

/// Verdict plus the raw lookup for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCheck {
    pub channel_id: ChatId,
    pub result: Option<PermissionResult>,
    pub verdict: Verdict,
}

impl ChannelCheck {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Verified
    }
}

/// Both channel checks from one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub source: ChannelCheck,
    pub target: ChannelCheck,
}

impl VerificationReport {
    #[must_use]
    pub fn all_verified(&self) -> bool {
        self.source.passed() && self.target.passed()
    }

    #[must_use]
    pub fn summary(&self) -> &'static str {
        if self.all_verified() {
            "✅ All permissions verified! The bot is ready to start forwarding messages."
        } else {
            "⚠️ Startup Warning: One or more critical permissions are missing. Forwarding may fail until permissions are corrected."
        }
    }
}

/// Checks the bot account's rights in the source and target channels.
pub struct PermissionVerifier {
    client: Arc<dyn PlatformClient>,
    notifier: OwnerNotifier,
    account: UserId,
    source: ChatId,
    target: ChatId,
}

impl PermissionVerifier {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        notifier: OwnerNotifier,
        account: UserId,
        source: ChatId,
        target: ChatId,
    ) -> Self {
        Self {
            client,
            notifier,
            account,
            source,
            target,
        }
    }

    /// Spawn a one-shot check that starts after `delay`. Nothing awaits it
    /// on the event path; results go to the owner.
    pub fn spawn(self, delay: Duration) -> JoinHandle<VerificationReport> {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            self.run().await
        })
    }

    /// Run both checks, send diagnostics and the summary, and return the report.
    pub async fn run(&self) -> VerificationReport {
        info!("starting permission check");

        let source = self.check_source().await;
        if let Some(text) = source_diagnostic(&source) {
            self.notifier.notify(&text).await;
        }

        let target = self.check_target().await;
        if let Some(text) = target_diagnostic(&target) {
            self.notifier.notify(&text).await;
        }

        let report = VerificationReport { source, target };
        self.notifier.notify(report.summary()).await;
        report
    }

    /// Report without notifying anyone, for offline diagnostics.
    pub async fn run_quiet(&self) -> VerificationReport {
        VerificationReport {
            source: self.check_source().await,
            target: self.check_target().await,
        }
    }

    async fn check_source(&self) -> ChannelCheck {
        let channel_id = self.source;
        match self.client.get_chat_member(channel_id, self.account).await {
            Ok(info) => {
                let result = PermissionResult::from_member(channel_id, info);
                let verdict = match result.role {
                    ChannelRole::Member | ChannelRole::Administrator => {
                        info!(channel = channel_id.0, "bot is a member of the source channel");
                        Verdict::Verified
                    },
                    ChannelRole::None => {
                        error!(
                            channel = channel_id.0,
                            status = %result.status,
                            "bot is not a member of the source channel"
                        );
                        Verdict::NotMember
                    },
                };
                ChannelCheck {
                    channel_id,
                    result: Some(result),
                    verdict,
                }
            },
            Err(e) => {
                error!(channel = channel_id.0, error = %e, "failed to check source channel permissions");
                ChannelCheck {
                    channel_id,
                    result: None,
                    verdict: Verdict::LookupFailed(e.to_string()),
                }
            },
        }
    }

    async fn check_target(&self) -> ChannelCheck {
        let channel_id = self.target;
        match self.client.get_chat_member(channel_id, self.account).await {
            Ok(info) => {
                let result = PermissionResult::from_member(channel_id, info);
                let verdict = match (result.role, result.can_post) {
                    (ChannelRole::Administrator, true) => {
                        info!(channel = channel_id.0, "bot has posting rights in the target channel");
                        Verdict::Verified
                    },
                    (ChannelRole::Administrator, false) => {
                        error!(
                            channel = channel_id.0,
                            "bot is an admin in the target channel but lacks 'Post messages'"
                        );
                        Verdict::MissingPostPermission
                    },
                    _ => {
                        error!(
                            channel = channel_id.0,
                            status = %result.status,
                            "bot is not an administrator in the target channel"
                        );
                        Verdict::NotAdministrator
                    },
                };
                ChannelCheck {
                    channel_id,
                    result: Some(result),
                    verdict,
                }
            },
            Err(e) => {
                error!(channel = channel_id.0, error = %e, "failed to check target channel permissions");
                ChannelCheck {
                    channel_id,
                    result: None,
                    verdict: Verdict::LookupFailed(e.to_string()),
                }
            },
        }
    }
}

/// Owner-facing text for a failed source check.
#[must_use]
pub fn source_diagnostic(check: &ChannelCheck) -> Option<String> {
    let id = check.channel_id;
    match &check.verdict {
        Verdict::Verified => None,
        Verdict::LookupFailed(e) => Some(format!(
            "❌ Permission Error: Failed to check source channel {id}. Ensure the bot is added to the channel and the ID is correct. Error: {e}"
        )),
        _ => Some(format!(
            "❌ Permission Error: Bot is not a member of the source channel {id}. Please add the bot to the channel."
        )),
    }
}

/// Owner-facing text for a failed target check.
#[must_use]
pub fn target_diagnostic(check: &ChannelCheck) -> Option<String> {
    let id = check.channel_id;
    match &check.verdict {
        Verdict::Verified => None,
        Verdict::MissingPostPermission => Some(format!(
            "❌ Permission Error: Bot is an admin in target channel {id} but is missing the 'Post messages' permission."
        )),
        Verdict::LookupFailed(e) => Some(format!(
            "❌ Permission Error: Failed to check target channel {id}. Ensure the bot is an administrator with 'Post messages' permission. Error: {e}"
        )),
        _ => Some(format!(
            "❌ Permission Error: Bot is not an administrator in the target channel {id}. Please make the bot an administrator and grant it 'Post messages' permission."
        )),
    }
}
