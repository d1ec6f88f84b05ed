use std::collections::HashSet;

pub use chanrelay_common::MediaKind;

use chanrelay_common::{ChatId, MessageId};

/// One update from the platform event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// A post published in a channel.
    ChannelPost(ChannelPost),
    /// Any other chat message (private, group, or a non-command text).
    OtherMessage { chat_id: ChatId },
    /// Updates with no message payload (edits, membership changes, ...).
    ServiceEvent { kind: &'static str },
}

impl InboundEvent {
    /// Short label used in logs and crash reports.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ChannelPost(_) => "channel_post",
            Self::OtherMessage { .. } => "message",
            Self::ServiceEvent { kind } => kind,
        }
    }

    #[must_use]
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Self::ChannelPost(post) => Some(post.chat_id),
            Self::OtherMessage { chat_id } => Some(*chat_id),
            Self::ServiceEvent { .. } => None,
        }
    }
}

/// A channel post, reduced to what the relay needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPost {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub chat_title: Option<String>,
    pub content: ContentKind,
}

/// What a post carries, checked in priority order by the platform adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    /// Media with a caption.
    Caption,
    /// Any member of an album, captioned or not.
    MediaGroup,
    Poll,
    Location,
    Contact,
    Sticker,
    /// Media without caption or album membership.
    BareMedia(MediaKind),
    /// Content the adapter could not name.
    Unknown,
    /// Service message with no payload (pin notice, title change, ...).
    None,
}

/// Decides which content kinds may be copied.
///
/// Text, captions, albums, polls, locations, contacts, stickers, and
/// unrecognised content always pass. Payload-less posts never pass.
/// Bare media passes only when its kind has been enabled.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    bare_media: HashSet<MediaKind>,
}

impl ContentFilter {
    #[must_use]
    pub fn new(bare_media: &[MediaKind]) -> Self {
        Self {
            bare_media: bare_media.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn is_forwardable(&self, content: ContentKind) -> bool {
        match content {
            ContentKind::None => false,
            ContentKind::BareMedia(kind) => self.bare_media.contains(&kind),
            ContentKind::Text
            | ContentKind::Caption
            | ContentKind::MediaGroup
            | ContentKind::Poll
            | ContentKind::Location
            | ContentKind::Contact
            | ContentKind::Sticker
            | ContentKind::Unknown => true,
        }
    }
}
