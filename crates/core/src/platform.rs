use {
    async_trait::async_trait,
    chanrelay_common::{ChatId, MessageId, UserId},
};

use crate::error::Result;

/// Membership status of an account in a chat, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Administrator => "administrator",
            Self::Member => "member",
            Self::Restricted => "restricted",
            Self::Left => "left",
            Self::Banned => "kicked",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a `getChatMember` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatMemberInfo {
    pub status: MemberStatus,
    /// Whether the account may post in a channel. Only meaningful for
    /// administrators; creators can always post.
    pub can_post_messages: bool,
}

/// The narrow slice of the messaging platform the relay depends on.
///
/// Timeouts and transport retries are the implementation's concern; any
/// failure surfaces as [`crate::Error::Platform`].
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Look up `user`'s membership in `chat`.
    async fn get_chat_member(&self, chat: ChatId, user: UserId) -> Result<ChatMemberInfo>;

    /// Duplicate `message_id` from `from` into `to` without a forward header.
    /// Returns the id of the new message.
    async fn copy_message(&self, to: ChatId, from: ChatId, message_id: MessageId)
    -> Result<MessageId>;

    /// Send plain text to `chat`.
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()>;
}
