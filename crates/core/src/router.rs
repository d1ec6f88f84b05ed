use std::sync::Arc;

use {
    chanrelay_common::MessageId,
    chanrelay_config::RelayConfig,
    tracing::{debug, error, info},
};

use crate::{
    boundary::{self, Origin},
    commands::CommandSurface,
    error::Result,
    event::{ContentFilter, InboundEvent},
    gate::RelayGate,
    notify::OwnerNotifier,
    platform::PlatformClient,
};

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Dropped because the gate is paused.
    Paused,
    /// Dropped: not a channel post.
    NotChannelPost,
    /// Dropped: a channel post from some other channel.
    ForeignChannel,
    /// Dropped: a source post with nothing forwardable in it.
    Unsupported,
    /// Copied; carries the id of the new message in the target channel.
    Copied(MessageId),
    /// The copy request failed and the owner was told.
    CopyFailed,
    /// Something escaped routing and was reported by the catch-all.
    Crashed,
}

/// The relay: event router, copy operation, and the shared pieces the
/// command surface and permission check need.
pub struct Relay {
    config: Arc<RelayConfig>,
    gate: Arc<RelayGate>,
    client: Arc<dyn PlatformClient>,
    notifier: OwnerNotifier,
    filter: ContentFilter,
}

impl Relay {
    #[must_use]
    pub fn new(config: Arc<RelayConfig>, client: Arc<dyn PlatformClient>) -> Self {
        let filter = ContentFilter::new(&config.forward_bare_media);
        let gate = Arc::new(RelayGate::new(config.owner_id));
        let notifier = OwnerNotifier::new(
            Arc::clone(&client),
            Some(config.owner_id.private_chat()),
        );
        Self {
            config,
            gate,
            client,
            notifier,
            filter,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn gate(&self) -> &Arc<RelayGate> {
        &self.gate
    }

    pub fn notifier(&self) -> &OwnerNotifier {
        &self.notifier
    }

    pub fn client(&self) -> &Arc<dyn PlatformClient> {
        &self.client
    }

    pub fn commands(&self) -> CommandSurface {
        CommandSurface::new(Arc::clone(&self.config), Arc::clone(&self.gate))
    }

    /// Route one event behind the catch-all boundary. Never fails.
    pub async fn dispatch(&self, event: InboundEvent) -> RouteOutcome {
        let origin = Origin {
            kind: event.kind_name(),
            chat_id: event.chat_id(),
        };
        boundary::catch_all(&self.notifier, origin, async { Ok(self.route(event).await) })
            .await
            .unwrap_or(RouteOutcome::Crashed)
    }

    /// Classify one event and copy it if eligible.
    pub async fn route(&self, event: InboundEvent) -> RouteOutcome {
        if !self.gate.is_active() {
            info!("forwarding is currently paused, ignoring update");
            return RouteOutcome::Paused;
        }

        let post = match event {
            InboundEvent::ChannelPost(post) => post,
            InboundEvent::OtherMessage { chat_id } => {
                debug!(chat_id = chat_id.0, "ignoring regular message");
                return RouteOutcome::NotChannelPost;
            },
            InboundEvent::ServiceEvent { kind } => {
                debug!(kind, "ignoring non-message update");
                return RouteOutcome::NotChannelPost;
            },
        };

        if post.chat_id != self.config.source_channel_id {
            debug!(
                chat_id = post.chat_id.0,
                "ignoring channel post from non-source chat"
            );
            return RouteOutcome::ForeignChannel;
        }

        if !self.filter.is_forwardable(post.content) {
            info!(
                chat_id = post.chat_id.0,
                chat_title = post.chat_title.as_deref().unwrap_or(""),
                content = ?post.content,
                "ignoring unsupported or empty message type"
            );
            return RouteOutcome::Unsupported;
        }

        info!(
            message_id = post.message_id.0,
            chat_title = post.chat_title.as_deref().unwrap_or(""),
            "received message from source channel"
        );

        match self.copy(post.message_id).await {
            Ok(new_id) => RouteOutcome::Copied(new_id),
            Err(_) => RouteOutcome::CopyFailed,
        }
    }

    /// Issue exactly one copy request for `message_id` from source to target.
    ///
    /// A failure is reported to the owner once and returned; it is never
    /// retried.
    pub async fn copy(&self, message_id: MessageId) -> Result<MessageId> {
        let source = self.config.source_channel_id;
        let target = self.config.target_channel_id;

        match self.client.copy_message(target, source, message_id).await {
            Ok(new_id) => {
                info!(
                    message_id = message_id.0,
                    target = target.0,
                    "copied message to target channel"
                );
                Ok(new_id)
            },
            Err(e) => {
                error!(message_id = message_id.0, error = %e, "failed to copy message");
                self.notifier
                    .notify(&format!(
                        "🚨 CRITICAL ERROR 🚨\n\nFailed to copy message ID {message_id} from {source} to {target}.\n\nError details:\n{e}"
                    ))
                    .await;
                Err(e)
            },
        }
    }
}
