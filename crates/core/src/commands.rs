use std::sync::Arc;

use {
    chanrelay_common::{ChatKind, UserId},
    chanrelay_config::RelayConfig,
    tracing::{info, warn},
};

use crate::gate::{GateChange, RelayGate};

/// Commands understood by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    StartForward,
    StopForward,
}

impl Command {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Status => "status",
            Self::StartForward => "start_forward",
            Self::StopForward => "stop_forward",
        }
    }
}

/// Who issued a command, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    pub caller: UserId,
    pub chat_kind: ChatKind,
}

pub const WELCOME_TEXT: &str = "👋 Welcome to the Channel Copier Bot!\n\n\
I am running and ready to sync your channels.\n\
If you are the owner, you can use the following commands:\n\
• /status - Check the bot's configuration and forwarding status.\n\
• /start_forward - Activate the message copying.\n\
• /stop_forward - Pause the message copying.\n\n\
If you haven't received the initial permission check message, please ensure:\n\
1. Your Telegram user ID is correctly set as the owner ID.\n\
2. The bot has been added to both channels with the correct permissions.";

/// Thin adapter from commands to the gate and static config.
///
/// Returns the reply text, or `None` when nothing should be sent back
/// (non-owner callers, `start` outside a private chat).
pub struct CommandSurface {
    config: Arc<RelayConfig>,
    gate: Arc<RelayGate>,
}

impl CommandSurface {
    pub fn new(config: Arc<RelayConfig>, gate: Arc<RelayGate>) -> Self {
        Self { config, gate }
    }

    pub fn handle(&self, command: Command, ctx: CommandContext) -> Option<String> {
        match command {
            Command::Start => self.start(ctx),
            Command::Status => self.status(ctx),
            Command::StartForward => self.toggle(true, command, ctx),
            Command::StopForward => self.toggle(false, command, ctx),
        }
    }

    fn start(&self, ctx: CommandContext) -> Option<String> {
        if ctx.chat_kind != ChatKind::Private {
            return None;
        }
        info!(user_id = ctx.caller.0, "user started the bot");
        Some(WELCOME_TEXT.to_string())
    }

    fn status(&self, ctx: CommandContext) -> Option<String> {
        if !self.gate.is_owner(ctx.caller) {
            warn!(
                user_id = ctx.caller.0,
                "unauthorized access attempt to /status"
            );
            return None;
        }
        let state = if self.gate.is_active() {
            "✅ ACTIVE"
        } else {
            "⏸️ PAUSED"
        };
        info!("status requested by owner");
        Some(format!(
            "🤖 Channel Copier Bot Status\n\n\
             Source Channel ID: {}\n\
             Target Channel ID: {}\n\
             Owner ID: {}\n\
             Forwarding Status: {state}",
            self.config.source_channel_id, self.config.target_channel_id, self.config.owner_id,
        ))
    }

    fn toggle(&self, active: bool, command: Command, ctx: CommandContext) -> Option<String> {
        match self.gate.set_active(active, ctx.caller) {
            Err(denied) => {
                warn!(
                    user_id = denied.requester.0,
                    command = command.name(),
                    "unauthorized access attempt"
                );
                None
            },
            Ok(change) => Some(
                match (active, change) {
                    (true, GateChange::Applied) => "▶️ Forwarding started.",
                    (true, GateChange::Unchanged) => "✅ Forwarding is already active.",
                    (false, GateChange::Applied) => "⏸️ Forwarding paused.",
                    (false, GateChange::Unchanged) => "⏸️ Forwarding is already paused.",
                }
                .to_string(),
            ),
        }
    }
}
