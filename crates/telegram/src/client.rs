//! [`PlatformClient`] over the Telegram Bot API.

use {
    async_trait::async_trait,
    chanrelay_common::{ChatId, MessageId, UserId},
    chanrelay_core::{ChatMemberInfo, Error, MemberStatus, PlatformClient, Result},
    teloxide::{
        Bot,
        requests::Requester,
        types::{
            ChatId as TgChatId, ChatMemberKind, ChatMemberStatus, MessageId as TgMessageId,
            UserId as TgUserId,
        },
    },
};

/// Thin wrapper that turns relay calls into Bot API requests.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl PlatformClient for TelegramClient {
    async fn get_chat_member(&self, chat: ChatId, user: UserId) -> Result<ChatMemberInfo> {
        let member = self
            .bot
            .get_chat_member(TgChatId(chat.0), TgUserId(user.0))
            .await
            .map_err(|e| Error::platform("getChatMember", e))?;
        Ok(member_info(&member.kind))
    }

    async fn copy_message(
        &self,
        to: ChatId,
        from: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId> {
        let copied = self
            .bot
            .copy_message(
                TgChatId(to.0),
                TgChatId(from.0),
                TgMessageId(message_id.0),
            )
            .await
            .map_err(|e| Error::platform("copyMessage", e))?;
        Ok(MessageId(copied.0))
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(TgChatId(chat.0), text)
            .await
            .map_err(|e| Error::platform("sendMessage", e))?;
        Ok(())
    }
}

fn member_info(kind: &ChatMemberKind) -> ChatMemberInfo {
    let status = match kind.status() {
        ChatMemberStatus::Owner => MemberStatus::Creator,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Banned,
    };
    ChatMemberInfo {
        status,
        can_post_messages: kind.can_post_messages(),
    }
}
