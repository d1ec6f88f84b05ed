use {
    chanrelay_common::UserId,
    chanrelay_core::{Command, CommandContext},
    teloxide::{types::Message, utils::command::BotCommands},
};

use crate::events::chat_kind;

/// Slash commands as Telegram sees them. Registered with `setMyCommands`
/// at startup.
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Channel relay commands:")]
pub enum RelayCommand {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show configuration and forwarding state")]
    Status,
    #[command(description = "resume copying posts")]
    StartForward,
    #[command(description = "pause copying posts")]
    StopForward,
}

impl From<RelayCommand> for Command {
    fn from(command: RelayCommand) -> Self {
        match command {
            RelayCommand::Start => Self::Start,
            RelayCommand::Status => Self::Status,
            RelayCommand::StartForward => Self::StartForward,
            RelayCommand::StopForward => Self::StopForward,
        }
    }
}

/// Parse a command from a message's text. Messages without a sender,
/// unknown commands and commands addressed to another bot yield `None`.
pub fn parse_command(msg: &Message, bot_username: &str) -> Option<(Command, CommandContext)> {
    let text = msg.text()?;
    let sender = msg.from.as_ref()?;
    let command = RelayCommand::parse(text, bot_username).ok()?;
    Some((command.into(), CommandContext {
        caller: UserId(sender.id.0),
        chat_kind: chat_kind(&msg.chat),
    }))
}
