//! Integration tests del client contro un server axum di prova

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use coach_client::dto::UserRow;
use coach_client::list::{AccountStatus, Tier};
use coach_client::{
    ChatPanel, ChatPhase, ClientError, ClientOptions, CoachApi, ListController, ListQuery,
    ListState, ModerationBoard, ModerationStatus, QueryChange, Role, Session,
};
use futures::stream::{self, StreamExt};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TOKEN: &str = "stub-token";

/// Risposta del coach spezzata in punti scomodi: dentro il JSON, dentro `data:`,
/// a metà di un carattere multi-byte e tra `\r` e `\n`.
fn reply_chunks() -> Vec<Bytes> {
    let body = "data: {\"content\":\"Allena \"}\r\n\r\n\
                data: {\"content\":\"la \"}\n\n\
                data: {oops}\n\n\
                data: {\"content\":\"velocità\"}\n\n\
                data: [DONE]\n\n"
        .as_bytes()
        .to_vec();
    let accent = body
        .windows(2)
        .position(|w| w == "à".as_bytes())
        .expect("accent present");
    let cuts = [7, 28, 33, 40, accent + 1, body.len() - 4];

    let mut chunks = Vec::new();
    let mut start = 0;
    for cut in cuts {
        chunks.push(Bytes::copy_from_slice(&body[start..cut]));
        start = cut;
    }
    chunks.push(Bytes::copy_from_slice(&body[start..]));
    chunks
}

#[derive(Default)]
struct Stub {
    chat_requests: Mutex<Vec<Value>>,
    user_queries: Mutex<Vec<HashMap<String, String>>>,
    items: Mutex<HashMap<String, Value>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}

async fn chat(State(stub): State<Arc<Stub>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Unable to decode token");
    }
    if body["message"] == "fail" {
        return error(StatusCode::SERVICE_UNAVAILABLE, "Coach is resting");
    }
    stub.chat_requests.lock().unwrap().push(body);

    let frames = stream::iter(reply_chunks()).then(|chunk| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok::<_, Infallible>(chunk)
    });
    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        Body::from_stream(frames),
    )
        .into_response()
}

async fn list_users(
    State(stub): State<Arc<Stub>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    stub.user_queries.lock().unwrap().push(params.clone());
    let all = [
        (1, "Anna Berg", "anna@example.com"),
        (2, "Joanne Kim", "jo@example.com"),
        (3, "Sara Lee", "sara@example.com"),
    ];
    let needle = params.get("search").map(|s| s.to_lowercase()).unwrap_or_default();
    let users: Vec<Value> = all
        .iter()
        .filter(|(_, name, email)| {
            name.to_lowercase().contains(&needle) || email.contains(&needle)
        })
        .map(|(id, name, email)| {
            json!({
                "id": id, "name": name, "email": email, "tier": "PRO", "status": "ACTIVE",
                "role": "USER", "warningsCount": 0, "createdAt": "2025-03-01T10:00:00Z"
            })
        })
        .collect();
    let total = users.len();
    Json(json!({
        "users": users,
        "pagination": {
            "page": 1, "limit": 20, "totalCount": total,
            "totalPages": 1, "hasMore": false
        },
        "stats": {
            "totalUsers": 3, "activeUsers": 3, "suspendedUsers": 0,
            "lockedUsers": 0, "proUsers": 3, "eliteUsers": 0
        }
    }))
    .into_response()
}

async fn update_moderation(State(stub): State<Arc<Stub>>, Json(body): Json<Value>) -> Response {
    let id = body["itemId"].as_str().unwrap_or_default().to_string();
    let mut items = stub.items.lock().unwrap();
    let Some(item) = items.get_mut(&id) else {
        return error(StatusCode::NOT_FOUND, "Moderation item not found");
    };
    let terminal = matches!(item["status"].as_str(), Some("APPROVED" | "REJECTED"));
    if terminal && item["status"] != body["status"] {
        return error(StatusCode::CONFLICT, "Transition not allowed");
    }
    item["status"] = body["status"].clone();
    item["adminNotes"] = body.get("adminNotes").cloned().unwrap_or(Value::Null);
    Json(json!({ "success": true, "item": item.clone() })).into_response()
}

fn moderation_item(id: &str, status: &str) -> Value {
    json!({
        "id": id, "kind": "FLAGGED_MESSAGE", "status": status, "subject": "rude reply",
        "createdAt": "2025-03-01T10:00:00Z", "updatedAt": "2025-03-01T10:00:00Z"
    })
}

async fn spawn_stub() -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub::default());
    {
        let mut items = stub.items.lock().unwrap();
        items.insert("x1".into(), moderation_item("x1", "PENDING"));
        items.insert("x2".into(), moderation_item("x2", "PENDING"));
    }

    let app = Router::new()
        .route("/api/coach/chat", post(chat))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/moderation", patch(update_moderation))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

fn api(base_url: &str, token: &str) -> CoachApi {
    let session = Session::new(base_url, token, 1, "Ada").unwrap();
    CoachApi::new(session, ClientOptions::default()).unwrap()
}

#[tokio::test]
async fn chat_reply_survives_split_frames() {
    let (url, stub) = spawn_stub().await;
    let mut panel = ChatPanel::new(api(&url, TOKEN));
    let mut updates = 0;

    panel.send("  Come miglioro?  ", |_| updates += 1).await.unwrap();

    let messages = panel.conversation().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "Come miglioro?");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Allena la velocità");
    assert!(!messages[1].is_streaming());
    // apertura + tre frammenti + finalizzazione
    assert_eq!(updates, 5);

    let requests = stub.chat_requests.lock().unwrap();
    assert_eq!(requests[0]["message"], "Come miglioro?");
    assert_eq!(requests[0]["conversationHistory"], json!([]));
}

#[tokio::test]
async fn second_message_carries_history() {
    let (url, stub) = spawn_stub().await;
    let mut panel = api(&url, TOKEN).chat_panel();

    panel.send("Ciao", |_| {}).await.unwrap();
    panel.send("E poi?", |_| {}).await.unwrap();

    let requests = stub.chat_requests.lock().unwrap();
    assert_eq!(
        requests[1]["conversationHistory"],
        json!([
            { "role": "user", "content": "Ciao" },
            { "role": "assistant", "content": "Allena la velocità" }
        ])
    );
}

#[tokio::test]
async fn history_limit_comes_from_client_options() {
    let (url, stub) = spawn_stub().await;
    let session = Session::new(&url, TOKEN, 1, "Ada").unwrap();
    let options = ClientOptions {
        history_limit: 1,
        ..ClientOptions::default()
    };
    let mut panel = CoachApi::new(session, options).unwrap().chat_panel();

    panel.send("Ciao", |_| {}).await.unwrap();
    panel.send("E poi?", |_| {}).await.unwrap();

    let requests = stub.chat_requests.lock().unwrap();
    assert_eq!(
        requests[1]["conversationHistory"],
        json!([{ "role": "assistant", "content": "Allena la velocità" }])
    );
}

#[tokio::test]
async fn server_error_becomes_failed_phase() {
    let (url, _stub) = spawn_stub().await;
    let mut panel = ChatPanel::new(api(&url, TOKEN));

    let err = panel.send("fail", |_| {}).await.unwrap_err();

    assert!(matches!(err, ClientError::Status { status: 503, .. }));
    assert!(matches!(panel.phase(), ChatPhase::Failed(f) if f.message == "Coach is resting"));
    assert_eq!(panel.conversation().len(), 1);
}

#[tokio::test]
async fn bad_token_is_a_status_error() {
    let (url, _stub) = spawn_stub().await;
    let mut panel = ChatPanel::new(api(&url, "wrong"));

    let err = panel.send("Ciao", |_| {}).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Status { status: 401, ref message } if message == "Unable to decode token"
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let mut panel = ChatPanel::new(api(&url, TOKEN));

    let err = panel.send("Ciao", |_| {}).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert!(panel.conversation().streaming().is_none());
}

#[tokio::test]
async fn user_list_sends_canonical_query() {
    let (url, stub) = spawn_stub().await;
    let mut list: ListController<UserRow, _> =
        ListController::new(api(&url, TOKEN), ListQuery::default());

    list.load(QueryChange::Tier(Tier::Pro)).await;
    list.load(QueryChange::Status(AccountStatus::All)).await;
    assert!(list.load(QueryChange::Search("ann".into())).await);

    match list.state() {
        ListState::Populated { rows, pagination } => {
            let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["Anna Berg", "Joanne Kim"]);
            assert_eq!(pagination.total_count, 2);
        }
        other => panic!("unexpected state {other:?}"),
    }

    let queries = stub.user_queries.lock().unwrap();
    let last = queries.last().unwrap();
    assert_eq!(last.get("page").map(String::as_str), Some("1"));
    assert_eq!(last.get("limit").map(String::as_str), Some("20"));
    assert_eq!(last.get("tier").map(String::as_str), Some("pro"));
    assert_eq!(last.get("search").map(String::as_str), Some("ann"));
    assert_eq!(last.get("sortBy").map(String::as_str), Some("createdAt"));
    assert!(!last.contains_key("status"));
}

#[tokio::test]
async fn moderation_board_round_trip() {
    let (url, _stub) = spawn_stub().await;
    let client = api(&url, TOKEN);
    let items = vec![
        serde_json::from_value(moderation_item("x1", "PENDING")).unwrap(),
        serde_json::from_value(moderation_item("x2", "PENDING")).unwrap(),
    ];
    let mut board = ModerationBoard::new(client, items);

    board
        .apply("x1", ModerationStatus::Rejected, Some("spam".into()))
        .await
        .unwrap();
    let row = board.row("x1").unwrap();
    assert_eq!(row.item.status, ModerationStatus::Rejected);
    assert_eq!(row.item.admin_notes.as_deref(), Some("spam"));
    assert!(board.offered_actions("x1").is_empty());

    // re-issuing the same decision is accepted
    board
        .apply("x1", ModerationStatus::Rejected, Some("spam".into()))
        .await
        .unwrap();
    assert_eq!(board.row("x1").unwrap().item.status, ModerationStatus::Rejected);
}

#[tokio::test]
async fn moderation_conflict_is_an_inline_error() {
    let (url, stub) = spawn_stub().await;
    let client = api(&url, TOKEN);
    let items = vec![serde_json::from_value(moderation_item("x2", "PENDING")).unwrap()];
    let mut board = ModerationBoard::new(client, items);

    // un altro admin ha già deciso
    stub.items
        .lock()
        .unwrap()
        .insert("x2".into(), moderation_item("x2", "APPROVED"));

    let result = board.apply("x2", ModerationStatus::Rejected, None).await;

    assert!(matches!(result, Err(ClientError::Status { status: 409, .. })));
    let row = board.row("x2").unwrap();
    assert_eq!(row.item.status, ModerationStatus::Pending);
    assert_eq!(row.error.as_deref(), Some("Transition not allowed"));
    assert!(!row.pending);
}
