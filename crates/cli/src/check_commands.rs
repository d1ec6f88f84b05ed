//! `chanrelay check`: config validation and, optionally, a live permission
//! check against Telegram.
//!
//! Prints a report with `[ok]`, `[warn]`, `[fail]`, `[skip]`, or `[info]`
//! per item and exits non-zero when anything failed.

use std::path::Path;

use {
    anyhow::Result,
    chanrelay_config::RelayConfig,
    chanrelay_core::{
        ChannelCheck, VerificationReport,
        verify::{source_diagnostic, target_diagnostic},
    },
    secrecy::ExposeSecret,
};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Skip,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Skip => DIM,
            Self::Info => CYAN,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }

    fn count(&self, status: Status) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

fn print_report(sections: &[Section]) -> (usize, usize) {
    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
        }
        eprintln!();
    }

    let errors = sections.iter().map(|s| s.count(Status::Fail)).sum();
    let warnings = sections.iter().map(|s| s.count(Status::Warn)).sum();
    (errors, warnings)
}

pub async fn handle_check(explicit: Option<&Path>, online: bool) -> Result<()> {
    eprintln!("{BOLD}chanrelay check{RESET}");
    eprintln!("{BOLD}==============={RESET}\n");

    let (config_section, config) = check_config(explicit);
    let mut sections = vec![config_section];

    if let Some(config) = &config {
        sections.push(check_relay(config));
        sections.push(if online {
            check_telegram(config).await
        } else {
            skipped_telegram()
        });
    }

    let (errors, warnings) = print_report(&sections);
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn check_config(explicit: Option<&Path>) -> (Section, Option<RelayConfig>) {
    let origin = explicit
        .map(Path::to_path_buf)
        .or_else(chanrelay_config::find_config_file);
    let label = origin
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "environment only".into());
    let mut section = Section::new(format!("Config ({label})"));

    match chanrelay_config::load(explicit) {
        Ok(config) => {
            let token = config.bot_token.expose_secret();
            let bot_id = token.split(':').next().unwrap_or_default();
            section.push(Status::Ok, format!("bot token present (bot id {bot_id})"));
            section.push(
                Status::Ok,
                format!("source channel {}", config.source_channel_id),
            );
            section.push(
                Status::Ok,
                format!("target channel {}", config.target_channel_id),
            );
            section.push(Status::Ok, format!("owner {}", config.owner_id));
            (section, Some(config))
        },
        Err(e) => {
            section.push(Status::Fail, e.to_string());
            (section, None)
        },
    }
}

fn check_relay(config: &RelayConfig) -> Section {
    let mut section = Section::new("Relay");

    if config.forward_bare_media.is_empty() {
        section.push(Status::Info, "bare media is not forwarded");
    } else {
        let kinds: Vec<_> = config
            .forward_bare_media
            .iter()
            .map(|kind| kind.as_str())
            .collect();
        section.push(
            Status::Ok,
            format!("bare media forwarded: {}", kinds.join(", ")),
        );
    }

    section.push(
        Status::Info,
        format!(
            "permission check runs {}s after startup",
            config.verify_delay.as_secs()
        ),
    );

    let polling = config.polling;
    if polling.timeout_secs == 0 {
        section.push(
            Status::Warn,
            "long-poll timeout is 0s, getUpdates will busy-poll",
        );
    } else {
        section.push(
            Status::Info,
            format!(
                "long-poll timeout {}s, error backoff {}s",
                polling.timeout_secs, polling.error_backoff_secs
            ),
        );
    }
    section
}

fn skipped_telegram() -> Section {
    let mut section = Section::new("Telegram");
    section.push(Status::Skip, "channel permissions (use --online)");
    section
}

async fn check_telegram(config: &RelayConfig) -> Section {
    let report = match chanrelay_telegram::build_bot(config) {
        Ok(bot) => chanrelay_telegram::verify_permissions(bot, config).await,
        Err(e) => Err(e),
    };
    match report {
        Ok(report) => permission_section(&report),
        Err(e) => {
            let mut section = Section::new("Telegram");
            section.push(Status::Fail, e.to_string());
            section
        },
    }
}

fn permission_section(report: &VerificationReport) -> Section {
    let mut section = Section::new("Telegram");
    push_channel(&mut section, "source", &report.source, source_diagnostic);
    push_channel(&mut section, "target", &report.target, target_diagnostic);
    section
}

fn push_channel(
    section: &mut Section,
    label: &str,
    check: &ChannelCheck,
    diagnostic: fn(&ChannelCheck) -> Option<String>,
) {
    let status = check
        .result
        .map(|r| r.status.to_string())
        .unwrap_or_else(|| "unknown".into());
    match diagnostic(check) {
        None => section.push(
            Status::Ok,
            format!("{label} channel {}: {status}", check.channel_id),
        ),
        Some(text) => section.push(Status::Fail, text),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        chanrelay_common::ChatId,
        chanrelay_core::{ChannelRole, MemberStatus, PermissionResult, Verdict},
        std::io::Write,
    };

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn complete_config_passes() {
        let file = write_config(
            r#"
[telegram]
token = "4242:secret"

[relay]
source_channel_id = -100111
target_channel_id = -100222
owner_id = 555
forward_bare_media = ["photo"]
"#,
        );

        let (section, config) = check_config(Some(file.path()));
        let config = config.unwrap();
        assert_eq!(section.count(Status::Fail), 0);
        assert!(section.items.iter().all(|i| !i.message.contains("secret")));

        let relay = check_relay(&config);
        assert_eq!(relay.count(Status::Fail), 0);
        assert!(relay.items[0].message.contains("photo"));
    }

    #[test]
    fn broken_config_fails() {
        let file = write_config("[relay\nsource_channel_id = 1");

        let (section, config) = check_config(Some(file.path()));
        assert!(config.is_none());
        assert_eq!(section.count(Status::Fail), 1);
    }

    #[test]
    fn unknown_bare_media_fails_the_config_section() {
        let file = write_config(
            r#"
[telegram]
token = "4242:secret"

[relay]
source_channel_id = -100111
target_channel_id = -100222
owner_id = 555
forward_bare_media = ["photo", "hologram"]
"#,
        );

        let (section, config) = check_config(Some(file.path()));
        assert!(config.is_none());
        assert_eq!(section.count(Status::Fail), 1);
        assert!(
            section
                .items
                .iter()
                .any(|i| i.message.contains("hologram"))
        );
    }

    fn check(channel: i64, status: MemberStatus, verdict: Verdict) -> ChannelCheck {
        ChannelCheck {
            channel_id: ChatId(channel),
            result: Some(PermissionResult {
                channel_id: ChatId(channel),
                role: ChannelRole::Administrator,
                can_post: false,
                status,
            }),
            verdict,
        }
    }

    #[test]
    fn permission_failures_are_listed() {
        let report = VerificationReport {
            source: check(-100111, MemberStatus::Member, Verdict::Verified),
            target: check(
                -100222,
                MemberStatus::Administrator,
                Verdict::MissingPostPermission,
            ),
        };

        let section = permission_section(&report);
        assert_eq!(section.items[0].status, Status::Ok);
        assert!(section.items[0].message.contains("member"));
        assert_eq!(section.items[1].status, Status::Fail);
        assert!(section.items[1].message.contains("'Post messages'"));
    }
}
