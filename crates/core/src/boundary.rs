//! Last-resort containment for per-update processing.
//!
//! Anything that escapes a handler, an `Err` or a panic, is logged with the
//! update type and chat id and reported to the owner. The poll loop keeps
//! running.

use std::{any::Any, future::Future, panic::AssertUnwindSafe};

use {chanrelay_common::ChatId, futures::FutureExt, tracing::error};

use crate::{error::Result, notify::OwnerNotifier};

/// Where a failing update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub kind: &'static str,
    pub chat_id: Option<ChatId>,
}

/// Run `fut`, converting an error or panic into a logged and notified
/// failure. Returns `None` in that case.
pub async fn catch_all<T, F>(notifier: &OwnerNotifier, origin: Origin, fut: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    let failure = match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(e)) => e.to_string(),
        Err(payload) => format!("panic: {}", panic_message(payload.as_ref())),
    };

    error!(
        update_type = origin.kind,
        chat_id = origin.chat_id.map(|c| c.0),
        error = %failure,
        "exception while handling an update"
    );
    notifier.notify(&crash_report(&failure, origin)).await;
    None
}

fn crash_report(failure: &str, origin: Origin) -> String {
    let mut text = format!(
        "🔥 Bot Error 🔥\n\nAn error occurred while processing an update:\n{failure}\n\nUpdate Type: {}",
        origin.kind
    );
    if let Some(chat) = origin.chat_id {
        text.push_str(&format!("\nChat ID: {chat}"));
    }
    text
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::Error,
            test_support::{MockError, MockPlatform, OWNER},
        },
    };

    fn origin() -> Origin {
        Origin {
            kind: "message",
            chat_id: Some(ChatId(777)),
        }
    }

    #[tokio::test]
    async fn passes_values_through() {
        let platform = MockPlatform::new();
        let notifier = OwnerNotifier::new(platform.clone(), Some(OWNER.private_chat()));

        let out = catch_all(&notifier, origin(), async { Ok(7) }).await;

        assert_eq!(out, Some(7));
        assert!(platform.sent().is_empty());
    }

    #[tokio::test]
    async fn errors_are_reported_with_origin() {
        let platform = MockPlatform::new();
        let notifier = OwnerNotifier::new(platform.clone(), Some(OWNER.private_chat()));

        let out: Option<()> = catch_all(&notifier, origin(), async {
            Err(Error::platform("sendMessage", MockError("reply failed".into())))
        })
        .await;

        assert!(out.is_none());
        let texts = platform.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("reply failed"));
        assert!(texts[0].contains("Update Type: message"));
        assert!(texts[0].contains("Chat ID: 777"));
    }

    #[tokio::test]
    async fn panics_are_contained() {
        let platform = MockPlatform::new();
        let notifier = OwnerNotifier::new(platform.clone(), Some(OWNER.private_chat()));

        let out: Option<()> = catch_all(
            &notifier,
            Origin {
                kind: "edited_message",
                chat_id: None,
            },
            async {
                if true {
                    panic!("boom");
                }
                Ok(())
            },
        )
        .await;

        assert!(out.is_none());
        let texts = platform.sent_texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("panic: boom"));
        assert!(!texts[0].contains("Chat ID"));
    }
}
