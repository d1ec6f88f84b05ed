mod check_commands;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    clap::{Parser, Subcommand},
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "chanrelay",
    about = "chanrelay: copy posts from one Telegram channel to another"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file (overrides discovery of ./chanrelay.toml and ~/.config/chanrelay/).
    #[arg(long, global = true, env = "CHANRELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay (default when no subcommand is provided).
    Run,
    /// Validate the configuration and report what the relay would use.
    Check {
        /// Also contact Telegram and check the bot's channel permissions.
        #[arg(long, default_value_t = false)]
        online: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "chanrelay starting");

    match cli.command {
        None | Some(Commands::Run) => run(cli.config.as_deref()).await,
        Some(Commands::Check { online }) => {
            check_commands::handle_check(cli.config.as_deref(), online).await
        },
    }
}

async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = chanrelay_config::load(config_path)
        .inspect_err(|e| error!(error = %e, "invalid configuration, not starting"))?;
    info!(
        source = %config.source_channel_id,
        target = %config.target_channel_id,
        owner = %config.owner_id,
        "configuration loaded"
    );

    let handle = chanrelay_telegram::start_polling(Arc::new(config)).await?;
    info!("relay running, press Ctrl-C to stop");

    let mut poller = handle.poller;
    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown requested");
            handle.cancel.cancel();
            poller.await?;
        },
        joined = &mut poller => {
            joined?;
            handle.verification.abort();
            anyhow::bail!("telegram polling stopped");
        },
    }

    handle.verification.abort();
    info!("chanrelay stopped");
    Ok(())
}
