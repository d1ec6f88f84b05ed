//! Maps Telegram updates onto relay events.

use {
    chanrelay_common::{ChatId, ChatKind, MessageId},
    chanrelay_core::{ChannelPost, Command, CommandContext, ContentKind, InboundEvent, MediaKind},
    teloxide::types::{
        Chat, MediaKind as TgMediaKind, Message, MessageKind, PublicChatKind, Update, UpdateKind,
    },
};

use crate::commands::parse_command;

/// What the poll loop should do with one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A recognised slash command.
    Command {
        command: Command,
        context: CommandContext,
        chat_id: ChatId,
    },
    /// Everything else goes through the router.
    Event(InboundEvent),
}

pub fn classify_update(update: Update, bot_username: &str) -> Incoming {
    match update.kind {
        UpdateKind::ChannelPost(msg) => Incoming::Event(InboundEvent::ChannelPost(ChannelPost {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
            chat_title: msg.chat.title().map(str::to_string),
            content: content_kind(&msg),
        })),
        UpdateKind::Message(msg) => match parse_command(&msg, bot_username) {
            Some((command, context)) => Incoming::Command {
                command,
                context,
                chat_id: ChatId(msg.chat.id.0),
            },
            None => Incoming::Event(InboundEvent::OtherMessage {
                chat_id: ChatId(msg.chat.id.0),
            }),
        },
        other => Incoming::Event(InboundEvent::ServiceEvent {
            kind: update_kind_name(&other),
        }),
    }
}

/// Content kind of a post, first match wins: text, caption, media group,
/// poll, location (venues included), contact, sticker, then bare media.
/// Service notices carry nothing; anything unrecognised is `Unknown`.
pub fn content_kind(msg: &Message) -> ContentKind {
    if msg.text().is_some() {
        return ContentKind::Text;
    }
    if msg.caption().is_some() {
        return ContentKind::Caption;
    }
    if msg.media_group_id().is_some() {
        return ContentKind::MediaGroup;
    }
    if msg.poll().is_some() {
        return ContentKind::Poll;
    }
    if msg.location().is_some() || msg.venue().is_some() {
        return ContentKind::Location;
    }
    if msg.contact().is_some() {
        return ContentKind::Contact;
    }
    if msg.sticker().is_some() {
        return ContentKind::Sticker;
    }

    match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            TgMediaKind::Photo(_) => ContentKind::BareMedia(MediaKind::Photo),
            TgMediaKind::Video(_) => ContentKind::BareMedia(MediaKind::Video),
            TgMediaKind::Animation(_) => ContentKind::BareMedia(MediaKind::Animation),
            TgMediaKind::Audio(_) => ContentKind::BareMedia(MediaKind::Audio),
            TgMediaKind::Document(_) => ContentKind::BareMedia(MediaKind::Document),
            TgMediaKind::Voice(_) => ContentKind::BareMedia(MediaKind::Voice),
            TgMediaKind::VideoNote(_) => ContentKind::BareMedia(MediaKind::VideoNote),
            TgMediaKind::Game(_) => ContentKind::BareMedia(MediaKind::Game),
            _ => ContentKind::Unknown,
        },
        MessageKind::Dice(_) => ContentKind::BareMedia(MediaKind::Dice),
        MessageKind::NewChatMembers(_)
        | MessageKind::LeftChatMember(_)
        | MessageKind::NewChatTitle(_)
        | MessageKind::NewChatPhoto(_)
        | MessageKind::DeleteChatPhoto(_)
        | MessageKind::GroupChatCreated(_)
        | MessageKind::SupergroupChatCreated(_)
        | MessageKind::ChannelChatCreated(_)
        | MessageKind::MessageAutoDeleteTimerChanged(_)
        | MessageKind::Pinned(_)
        | MessageKind::ChatShared(_)
        | MessageKind::UsersShared(_)
        | MessageKind::ConnectedWebsite(_)
        | MessageKind::WriteAccessAllowed(_)
        | MessageKind::ProximityAlertTriggered(_)
        | MessageKind::ForumTopicCreated(_)
        | MessageKind::ForumTopicEdited(_)
        | MessageKind::ForumTopicClosed(_)
        | MessageKind::ForumTopicReopened(_)
        | MessageKind::GeneralForumTopicHidden(_)
        | MessageKind::GeneralForumTopicUnhidden(_)
        | MessageKind::GiveawayCreated(_)
        | MessageKind::GiveawayCompleted(_)
        | MessageKind::VideoChatScheduled(_)
        | MessageKind::VideoChatStarted(_)
        | MessageKind::VideoChatEnded(_)
        | MessageKind::VideoChatParticipantsInvited(_) => ContentKind::None,
        // Content this library version does not model parses as `Empty`.
        _ => ContentKind::Unknown,
    }
}

pub fn chat_kind(chat: &Chat) -> ChatKind {
    match &chat.kind {
        teloxide::types::ChatKind::Private(_) => ChatKind::Private,
        teloxide::types::ChatKind::Public(public) => match public.kind {
            PublicChatKind::Channel(_) => ChatKind::Channel,
            _ => ChatKind::Group,
        },
    }
}

fn update_kind_name(kind: &UpdateKind) -> &'static str {
    match kind {
        UpdateKind::Message(_) => "message",
        UpdateKind::EditedMessage(_) => "edited_message",
        UpdateKind::ChannelPost(_) => "channel_post",
        UpdateKind::EditedChannelPost(_) => "edited_channel_post",
        UpdateKind::CallbackQuery(_) => "callback_query",
        UpdateKind::MyChatMember(_) => "my_chat_member",
        UpdateKind::ChatMember(_) => "chat_member",
        UpdateKind::ChatJoinRequest(_) => "chat_join_request",
        _ => "other",
    }
}
