use std::sync::Arc;

use {
    chanrelay_common::ChatId,
    tracing::{debug, error},
};

use crate::platform::PlatformClient;

/// Best-effort text delivery to the owner's private chat.
///
/// Delivery failures are logged and dropped; callers never see them.
#[derive(Clone)]
pub struct OwnerNotifier {
    client: Arc<dyn PlatformClient>,
    owner_chat: Option<ChatId>,
}

impl OwnerNotifier {
    pub fn new(client: Arc<dyn PlatformClient>, owner_chat: Option<ChatId>) -> Self {
        Self { client, owner_chat }
    }

    pub async fn notify(&self, text: &str) {
        let Some(chat) = self.owner_chat else {
            debug!("no owner chat configured, dropping notification");
            return;
        };
        if let Err(e) = self.client.send_message(chat, text).await {
            error!(owner_chat = chat.0, error = %e, "failed to send message to owner");
        }
    }
}
