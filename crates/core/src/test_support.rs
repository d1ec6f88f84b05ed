//! In-memory [`PlatformClient`] that records every call.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use {
    async_trait::async_trait,
    chanrelay_common::{ChatId, MessageId, UserId},
    chanrelay_config::{PollingConfig, RelayConfig},
    secrecy::Secret,
};

use crate::{
    error::{Error, Result},
    platform::{ChatMemberInfo, MemberStatus, PlatformClient},
};

pub const SOURCE: ChatId = ChatId(-100111);
pub const TARGET: ChatId = ChatId(-100222);
pub const OWNER: UserId = UserId(555);
pub const STRANGER: UserId = UserId(999);
pub const BOT: UserId = UserId(4242);

pub fn relay_config() -> RelayConfig {
    RelayConfig {
        bot_token: Secret::new("123:ABC".into()),
        source_channel_id: SOURCE,
        target_channel_id: TARGET,
        owner_id: OWNER,
        verify_delay: std::time::Duration::ZERO,
        forward_bare_media: Vec::new(),
        polling: PollingConfig::default(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyBehaviour {
    Succeed,
    Fail,
    Panic,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

struct State {
    members: HashMap<ChatId, std::result::Result<ChatMemberInfo, String>>,
    copy_behaviour: CopyBehaviour,
    fail_sends: bool,
    copies: Vec<(ChatId, ChatId, MessageId)>,
    sent: Vec<(ChatId, String)>,
    send_attempts: usize,
    member_lookups: Vec<(ChatId, UserId)>,
}

pub struct MockPlatform {
    state: Mutex<State>,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                members: HashMap::new(),
                copy_behaviour: CopyBehaviour::Succeed,
                fail_sends: false,
                copies: Vec::new(),
                sent: Vec::new(),
                send_attempts: 0,
                member_lookups: Vec::new(),
            }),
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_member(&self, chat: ChatId, status: MemberStatus, can_post_messages: bool) {
        self.state().members.insert(chat, Ok(ChatMemberInfo {
            status,
            can_post_messages,
        }));
    }

    pub fn fail_member_lookup(&self, chat: ChatId, reason: &str) {
        self.state().members.insert(chat, Err(reason.to_string()));
    }

    pub fn set_copy_behaviour(&self, behaviour: CopyBehaviour) {
        self.state().copy_behaviour = behaviour;
    }

    pub fn fail_sends(&self) {
        self.state().fail_sends = true;
    }

    pub fn copies(&self) -> Vec<(ChatId, ChatId, MessageId)> {
        self.state().copies.clone()
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.state().sent.clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.state().sent.iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn send_attempts(&self) -> usize {
        self.state().send_attempts
    }

    pub fn member_lookups(&self) -> Vec<(ChatId, UserId)> {
        self.state().member_lookups.clone()
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn get_chat_member(&self, chat: ChatId, user: UserId) -> Result<ChatMemberInfo> {
        let mut state = self.state();
        state.member_lookups.push((chat, user));
        match state.members.get(&chat).cloned() {
            Some(Ok(info)) => Ok(info),
            Some(Err(reason)) => Err(Error::platform("getChatMember", MockError(reason))),
            None => Err(Error::platform(
                "getChatMember",
                MockError("chat not found".into()),
            )),
        }
    }

    async fn copy_message(
        &self,
        to: ChatId,
        from: ChatId,
        message_id: MessageId,
    ) -> Result<MessageId> {
        let behaviour = {
            let mut state = self.state();
            state.copies.push((to, from, message_id));
            state.copy_behaviour
        };
        match behaviour {
            CopyBehaviour::Succeed => Ok(MessageId(message_id.0 + 1000)),
            CopyBehaviour::Fail => Err(Error::platform(
                "copyMessage",
                MockError("connection reset by peer".into()),
            )),
            CopyBehaviour::Panic => panic!("copy exploded"),
        }
    }

    async fn send_message(&self, chat: ChatId, text: &str) -> Result<()> {
        let mut state = self.state();
        state.send_attempts += 1;
        if state.fail_sends {
            return Err(Error::platform(
                "sendMessage",
                MockError("Forbidden: bot was blocked by the user".into()),
            ));
        }
        state.sent.push((chat, text.to_string()));
        Ok(())
    }
}
