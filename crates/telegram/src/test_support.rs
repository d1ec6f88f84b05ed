//! Mock Telegram Bot API served by axum, plus update fixtures.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use {
    axum::{Json, Router, body::Bytes, extract::State, http::Uri, routing::post},
    serde_json::{Value, json},
    teloxide::{
        Bot,
        types::{Update, UpdateKind},
    },
    tokio::{sync::oneshot, task::JoinHandle},
};

pub(crate) const BOT_ID: u64 = 4242;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    BadRequest(&'static str),
    Conflict,
}

#[derive(Default)]
struct ApiState {
    calls: Vec<(String, Value)>,
    members: HashMap<i64, Value>,
    overrides: HashMap<String, Reply>,
}

type SharedState = Arc<Mutex<ApiState>>;

pub(crate) struct MockTelegramApi {
    state: SharedState,
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl MockTelegramApi {
    pub(crate) async fn start() -> Self {
        let state = SharedState::default();
        let app = Router::new()
            .route("/{*path}", post(telegram_api_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        Self {
            state,
            addr,
            shutdown,
            server,
        }
    }

    pub(crate) fn bot(&self) -> Bot {
        let api_url =
            reqwest::Url::parse(&format!("http://{}/", self.addr)).expect("parse api url");
        Bot::new("test-token").set_api_url(api_url)
    }

    /// Request bodies received for `method`, in order.
    pub(crate) fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .lock()
            .expect("lock api state")
            .calls
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Names of every method called, in order.
    pub(crate) fn methods(&self) -> Vec<String> {
        self.state
            .lock()
            .expect("lock api state")
            .calls
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub(crate) fn reply_with(&self, method: &str, reply: Reply) {
        self.state
            .lock()
            .expect("lock api state")
            .overrides
            .insert(method.to_string(), reply);
    }

    pub(crate) fn set_member(&self, chat_id: i64, status: &str, can_post: bool) {
        self.state
            .lock()
            .expect("lock api state")
            .members
            .insert(chat_id, member_json(status, can_post));
    }

    pub(crate) async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.server.await;
    }
}

async fn telegram_api_handler(
    State(state): State<SharedState>,
    uri: Uri,
    body: Bytes,
) -> Json<Value> {
    let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    let params: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let mut state = state.lock().expect("lock api state");
    state.calls.push((method.clone(), params.clone()));

    match state.overrides.get(&method) {
        Some(Reply::BadRequest(description)) => {
            return Json(json!({
                "ok": false,
                "error_code": 400,
                "description": format!("Bad Request: {description}"),
            }));
        },
        Some(Reply::Conflict) => {
            return Json(json!({
                "ok": false,
                "error_code": 409,
                "description": "Conflict: terminated by other getUpdates request; make sure that only one bot instance is running",
            }));
        },
        None => {},
    }

    let result = match method.as_str() {
        "GetMe" => json!({
            "id": BOT_ID,
            "is_bot": true,
            "first_name": "Relay",
            "username": "relay_bot",
            "can_join_groups": true,
            "can_read_all_group_messages": false,
            "supports_inline_queries": false,
            "can_connect_to_business": false,
            "has_main_web_app": false,
        }),
        "CopyMessage" => json!({
            "message_id": params["message_id"].as_i64().unwrap_or_default() + 1000,
        }),
        "SendMessage" => json!({
            "message_id": 1,
            "date": 0,
            "chat": { "id": params["chat_id"], "type": "private" },
            "text": params["text"],
        }),
        "GetChatMember" => {
            let chat_id = params["chat_id"].as_i64().unwrap_or_default();
            match state.members.get(&chat_id) {
                Some(member) => member.clone(),
                None => {
                    return Json(json!({
                        "ok": false,
                        "error_code": 400,
                        "description": "Bad Request: chat not found",
                    }));
                },
            }
        },
        "GetUpdates" => json!([]),
        _ => json!(true),
    };

    Json(json!({ "ok": true, "result": result }))
}

fn member_json(status: &str, can_post: bool) -> Value {
    let user = json!({ "id": BOT_ID, "is_bot": true, "first_name": "Relay" });
    match status {
        "administrator" => json!({
            "status": "administrator",
            "user": user,
            "can_be_edited": false,
            "is_anonymous": false,
            "can_manage_chat": true,
            "can_delete_messages": false,
            "can_manage_video_chats": false,
            "can_restrict_members": false,
            "can_promote_members": false,
            "can_change_info": false,
            "can_invite_users": true,
            "can_post_messages": can_post,
            "can_edit_messages": false,
            "can_pin_messages": false,
            "can_manage_topics": false,
            "can_post_stories": false,
            "can_edit_stories": false,
            "can_delete_stories": false,
        }),
        "creator" => json!({ "status": "creator", "user": user, "is_anonymous": false }),
        "kicked" => json!({ "status": "kicked", "user": user, "until_date": 0 }),
        other => json!({ "status": other, "user": user }),
    }
}

/// A channel post update. `payload` supplies the content fields.
pub(crate) fn channel_post(chat_id: i64, message_id: i32, payload: Value) -> Update {
    let mut message = json!({
        "message_id": message_id,
        "date": 1,
        "chat": { "id": chat_id, "type": "channel", "title": "Source" },
    });
    merge(&mut message, payload);
    update_from(json!({ "update_id": 1, "channel_post": message }))
}

/// A private-chat text message from `user_id`.
pub(crate) fn private_text(user_id: u64, text: &str) -> Update {
    update_from(json!({
        "update_id": 2,
        "message": {
            "message_id": 7,
            "date": 1,
            "chat": { "id": user_id, "type": "private", "first_name": "Alice" },
            "from": { "id": user_id, "is_bot": false, "first_name": "Alice" },
            "text": text,
        },
    }))
}

/// A text message in a supergroup from `user_id`.
pub(crate) fn group_text(user_id: u64, text: &str) -> Update {
    update_from(json!({
        "update_id": 3,
        "message": {
            "message_id": 8,
            "date": 1,
            "chat": { "id": -100777, "type": "supergroup", "title": "Lobby" },
            "from": { "id": user_id, "is_bot": false, "first_name": "Alice" },
            "text": text,
        },
    }))
}

/// Parses an update from its wire text. teloxide's untagged update kinds
/// only resolve from a string; `from_value` yields `UpdateKind::Error`.
pub(crate) fn update_from(json: Value) -> Update {
    let update: Update = serde_json::from_str(&json.to_string()).expect("deserialize update");
    assert!(
        !matches!(update.kind, UpdateKind::Error(_)),
        "fixture did not parse: {json}"
    );
    update
}

fn merge(target: &mut Value, extra: Value) {
    if let (Some(target), Value::Object(extra)) = (target.as_object_mut(), extra) {
        target.extend(extra);
    }
}

pub(crate) const SOURCE: i64 = -100111;
pub(crate) const TARGET: i64 = -100222;
pub(crate) const OWNER: u64 = 555;
pub(crate) const STRANGER: u64 = 999;

pub(crate) fn relay_config() -> chanrelay_config::RelayConfig {
    chanrelay_config::RelayConfig {
        bot_token: secrecy::Secret::new("test-token".into()),
        source_channel_id: chanrelay_common::ChatId(SOURCE),
        target_channel_id: chanrelay_common::ChatId(TARGET),
        owner_id: chanrelay_common::UserId(OWNER),
        verify_delay: std::time::Duration::ZERO,
        forward_bare_media: Vec::new(),
        polling: chanrelay_config::PollingConfig {
            timeout_secs: 0,
            error_backoff_secs: 0,
        },
    }
}
