use std::{sync::Arc, time::Duration};

use {
    chanrelay_common::{ChatId, UserId},
    chanrelay_config::{PollingConfig, RelayConfig},
    chanrelay_core::{
        Command, CommandContext, OwnerNotifier, PermissionVerifier, PlatformClient, Relay,
        VerificationReport,
        boundary::{self, Origin},
    },
    secrecy::ExposeSecret,
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::AllowedUpdate,
        utils::command::BotCommands,
    },
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    client::TelegramClient,
    commands::RelayCommand,
    error::{Context, Result},
    events::{Incoming, classify_update},
};

/// Headroom added to the long-poll timeout for the HTTP client timeout.
const CLIENT_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

const CONFLICT_NOTICE: &str =
    "⚠️ Polling stopped: another bot instance is already running with this token.";

/// A running relay: the poll loop and the one-shot permission check.
pub struct RelayHandle {
    pub cancel: CancellationToken,
    pub poller: JoinHandle<()>,
    pub verification: JoinHandle<VerificationReport>,
}

/// Build the bot from config and start polling.
pub async fn start_polling(config: Arc<RelayConfig>) -> Result<RelayHandle> {
    let bot = build_bot(&config)?;
    start_with_bot(bot, config).await
}

/// Bot with an HTTP client timeout above the long-poll timeout, so
/// `getUpdates` is not aborted before Telegram answers.
pub fn build_bot(config: &RelayConfig) -> Result<Bot> {
    let timeout =
        Duration::from_secs(u64::from(config.polling.timeout_secs)) + CLIENT_TIMEOUT_MARGIN;
    let client = teloxide::net::default_reqwest_settings()
        .timeout(timeout)
        .build()
        .context("build telegram http client")?;
    Ok(Bot::with_client(config.bot_token.expose_secret(), client))
}

/// One-off permission check without polling or notifying the owner.
pub async fn verify_permissions(bot: Bot, config: &RelayConfig) -> Result<VerificationReport> {
    let me = bot.get_me().await.context("verify bot token")?;
    let client: Arc<dyn PlatformClient> = Arc::new(TelegramClient::new(bot));
    let verifier = PermissionVerifier::new(
        Arc::clone(&client),
        OwnerNotifier::new(client, None),
        UserId(me.id.0),
        config.source_channel_id,
        config.target_channel_id,
    );
    Ok(verifier.run_quiet().await)
}

/// Connect `bot`, spawn the permission check and the poll loop.
///
/// Fails if the token is rejected or the webhook cannot be cleared.
pub async fn start_with_bot(bot: Bot, config: Arc<RelayConfig>) -> Result<RelayHandle> {
    let me = bot.get_me().await.context("verify bot token")?;
    let bot_username = me.username.clone().unwrap_or_default();

    bot.delete_webhook().await?;

    if let Err(e) = bot.set_my_commands(RelayCommand::bot_commands()).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(
        username = %bot_username,
        bot_id = me.id.0,
        "telegram bot connected (webhook cleared)"
    );

    let client: Arc<dyn PlatformClient> = Arc::new(TelegramClient::new(bot.clone()));
    let relay = Arc::new(Relay::new(Arc::clone(&config), Arc::clone(&client)));

    let verification = PermissionVerifier::new(
        client,
        relay.notifier().clone(),
        UserId(me.id.0),
        config.source_channel_id,
        config.target_channel_id,
    )
    .spawn(config.verify_delay);

    let cancel = CancellationToken::new();
    let handler = UpdateHandler::new(relay, bot_username);
    let poller = tokio::spawn(poll_loop(bot, handler, config.polling, cancel.clone()));

    Ok(RelayHandle {
        cancel,
        poller,
        verification,
    })
}

/// Handles one update at a time: commands go to the command surface,
/// everything else to the relay router.
pub struct UpdateHandler {
    relay: Arc<Relay>,
    bot_username: String,
}

impl UpdateHandler {
    pub fn new(relay: Arc<Relay>, bot_username: String) -> Self {
        Self {
            relay,
            bot_username,
        }
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub async fn handle(&self, update: Update) {
        match classify_update(update, &self.bot_username) {
            Incoming::Event(event) => {
                let outcome = self.relay.dispatch(event).await;
                debug!(?outcome, "update routed");
            },
            Incoming::Command {
                command,
                context,
                chat_id,
            } => {
                let origin = Origin {
                    kind: "message",
                    chat_id: Some(chat_id),
                };
                boundary::catch_all(
                    self.relay.notifier(),
                    origin,
                    self.run_command(command, context, chat_id),
                )
                .await;
            },
        }
    }

    async fn run_command(
        &self,
        command: Command,
        context: CommandContext,
        chat_id: ChatId,
    ) -> chanrelay_core::Result<()> {
        debug!(command = command.name(), user_id = context.caller.0, "command received");
        let Some(reply) = self.relay.commands().handle(command, context) else {
            return Ok(());
        };
        self.relay.client().send_message(chat_id, &reply).await
    }
}

async fn poll_loop(
    bot: Bot,
    handler: UpdateHandler,
    polling: PollingConfig,
    cancel: CancellationToken,
) {
    info!("starting telegram polling loop");
    let backoff = Duration::from_secs(polling.error_backoff_secs);
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(polling.timeout_secs)
            .allowed_updates(vec![AllowedUpdate::ChannelPost, AllowedUpdate::Message]);

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = request.send() => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "got telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    handler.handle(update).await;
                }
            },
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                error!("another instance is already polling with this bot token");
                handler.relay().notifier().notify(CONFLICT_NOTICE).await;
                cancel.cancel();
                break;
            },
            Err(e) => {
                warn!(error = %e, "telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(backoff) => {},
                }
            },
        }
    }

    info!("telegram polling stopped");
}
