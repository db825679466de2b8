//! API ルーター統合テスト
//!
//! `build_app` で組み立てたルーターに対して HTTP リクエストを送り、
//! ステータスコードとレスポンスボディを検証する。
//! リポジトリや外部サービスはインメモリのモックを使用する。
//!
//! ## 実行方法
//!
//! ```bash
//! cargo test -p txosteo-api --test api_test
//! ```

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;
use txosteo_api::{
    app_builder::{AppDependencies, build_app},
    middleware::SESSION_COOKIE_NAME,
};
use txosteo_domain::{
    clock::FixedClock,
    event::{Capacity, Event, EventId, EventName, NewEvent},
    notification::AdminEmailCategory,
    user::{Email, NewUser, Subject, User, UserId},
    value_objects::UserName,
};
use txosteo_infra::{
    SessionData,
    mock::{
        MockEventRepository,
        MockImageStorage,
        MockNotificationSender,
        MockRateLimiter,
        MockSessionManager,
        MockUserRepository,
    },
};

fn now() -> DateTime<Utc> {
    // 2026-03-05 09:30:00 UTC
    DateTime::from_timestamp(1_772_703_000, 0).unwrap()
}

/// テスト用のアプリケーションとモック一式
struct TestApp {
    router:   Router,
    sessions: MockSessionManager,
    events:   MockEventRepository,
    users:    MockUserRepository,
    sender:   MockNotificationSender,
    storage:  MockImageStorage,
}

impl TestApp {
    fn new() -> Self {
        Self::with_rate_limit(5)
    }

    fn with_rate_limit(max_requests: u32) -> Self {
        let sessions = MockSessionManager::new();
        let events = MockEventRepository::new();
        let users = MockUserRepository::with_events(events.clone());
        let sender = MockNotificationSender::new();
        let storage = MockImageStorage::new();

        let router = build_app(AppDependencies {
            session_manager:     Arc::new(sessions.clone()),
            event_repository:    Arc::new(events.clone()),
            user_repository:     Arc::new(users.clone()),
            rate_limiter:        Arc::new(MockRateLimiter::new(max_requests)),
            notification_sender: Arc::new(sender.clone()),
            image_storage:       Arc::new(storage.clone()),
            clock:               Arc::new(FixedClock::new(now())),
        })
        .unwrap();

        Self {
            router,
            sessions,
            events,
            users,
            sender,
            storage,
        }
    }

    /// ユーザーを作成し、そのユーザーのセッション ID を返す
    fn login(&self, name: &str, is_admin: bool) -> (User, String) {
        let user = User::new(NewUser {
            id:      UserId::new(),
            subject: Subject::new(format!("auth0|{name}")).unwrap(),
            email:   Email::new(format!("{name}@example.com")).unwrap(),
            name:    UserName::new(name).unwrap(),
            now:     now(),
        });
        let user = if is_admin {
            user.promoted_to_admin(now())
        } else {
            user
        };
        self.users.add_user(user.clone());

        let session_id = format!("session-{name}");
        self.sessions.insert(
            &session_id,
            SessionData::new(user.id().clone(), user.subject().clone(), is_admin, now()),
        );
        (user, session_id)
    }

    fn add_event(&self, capacity: i32, date_and_time: DateTime<Utc>) -> EventId {
        let event = Event::new(NewEvent {
            id: EventId::new(),
            name: EventName::new("骨格筋セミナー").unwrap(),
            date_and_time,
            capacity: Capacity::new(capacity).unwrap(),
            now: now() - Duration::days(30),
        });
        let id = event.id().clone();
        self.events.add_event(event);
        id
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

fn request(method: Method, uri: &str, session_id: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session_id) = session_id {
        builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={session_id}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn register_uri(event_id: &impl ToString, user_id: &str) -> String {
    format!("/api/events/{}/register/{user_id}", event_id.to_string())
}

// --- 参加登録 ---

#[tokio::test]
async fn test_定員1のイベントに2人目は登録できない() {
    let app = TestApp::new();
    let e1 = app.add_event(1, now() + Duration::days(7));
    let (u1, u1_session) = app.login("u1", false);
    let (u2, u2_session) = app.login("u2", false);

    let (status, body) = app
        .send(request(
            Method::POST,
            &register_uri(&e1, &u1.id().to_string()),
            Some(&u1_session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 0);
    assert_eq!(body["signedUpUsers"], json!([u1.id().to_string()]));

    let (status, body) = app
        .send(request(
            Method::POST,
            &register_uri(&e1, &u2.id().to_string()),
            Some(&u2_session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["type"],
        "https://txosteo.example.com/errors/invalid-state"
    );
    let stored = app.events.get(&e1).unwrap();
    assert_eq!(stored.capacity().as_i32(), 0);
    assert_eq!(stored.signed_up_users(), &[u1.id().clone()]);
}

#[tokio::test]
async fn test_同じユーザーが2回登録すると2回目は定員切れ() {
    let app = TestApp::new();
    let event_id = app.add_event(1, now() + Duration::days(7));
    let (_, session) = app.login("alice", false);
    let uri = register_uri(&event_id, "me");

    let (first, _) = app
        .send(request(Method::POST, &uri, Some(&session), None))
        .await;
    let (second, body) = app
        .send(request(Method::POST, &uri, Some(&session), None))
        .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "このイベントは定員に達しています");
}

#[tokio::test]
async fn test_空白のイベントidは400でストアに触れない() {
    let app = TestApp::new();
    let (_, session) = app.login("alice", false);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/events/%20/register/me",
            Some(&session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Bad Request");
    assert_eq!(app.events.access_count(), 0);
}

#[tokio::test]
async fn test_他人の登録は一般ユーザーには403() {
    let app = TestApp::new();
    let event_id = app.add_event(3, now() + Duration::days(7));
    let (_, session) = app.login("alice", false);
    let (bob, _) = app.login("bob", false);

    let (status, _) = app
        .send(request(
            Method::POST,
            &register_uri(&event_id, &bob.id().to_string()),
            Some(&session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.events.get(&event_id).unwrap().capacity().as_i32(), 3);
}

#[tokio::test]
async fn test_管理者は他人を登録できる() {
    let app = TestApp::new();
    let event_id = app.add_event(3, now() + Duration::days(7));
    let (_, admin_session) = app.login("admin", true);
    let (bob, _) = app.login("bob", false);

    let (status, body) = app
        .send(request(
            Method::POST,
            &register_uri(&event_id, &bob.id().to_string()),
            Some(&admin_session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 2);
    assert_eq!(body["signedUpUsers"], json!([bob.id().to_string()]));
}

#[tokio::test]
async fn test_存在しないイベントへの登録は404() {
    let app = TestApp::new();
    let (_, session) = app.login("alice", false);

    let (status, _) = app
        .send(request(
            Method::POST,
            &register_uri(&EventId::new(), "me"),
            Some(&session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_開催済みイベントへの登録は400() {
    let app = TestApp::new();
    let event_id = app.add_event(3, now() - Duration::days(1));
    let (_, session) = app.login("alice", false);

    let (status, body) = app
        .send(request(
            Method::POST,
            &register_uri(&event_id, "me"),
            Some(&session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "このイベントは既に開催済みのため登録できません"
    );
    assert_eq!(app.events.get(&event_id).unwrap().capacity().as_i32(), 3);
}

#[tokio::test]
async fn test_セッションなしの登録は401() {
    let app = TestApp::new();
    let event_id = app.add_event(3, now() + Duration::days(7));

    let (status, _) = app
        .send(request(
            Method::POST,
            &register_uri(&event_id, "me"),
            None,
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.events.access_count(), 0);
}

// --- イベント取得 ---

#[tokio::test]
async fn test_イベントは認証なしで取得でき登録者一覧を含まない() {
    let app = TestApp::new();
    let event_id = app.add_event(12, now() + Duration::days(7));

    let (status, body) = app
        .send(request(
            Method::GET,
            &format!("/api/event/{event_id}"),
            None,
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], event_id.to_string());
    assert_eq!(body["name"], "骨格筋セミナー");
    assert_eq!(body["capacity"], 12);
    assert!(body.get("dateAndTime").is_some());
    assert!(body.get("signedUpUsers").is_none());
}

#[tokio::test]
async fn test_不明なイベントidは404() {
    let app = TestApp::new();

    let (status, body) = app
        .send(request(Method::GET, "/api/event/unknown-id", None, None))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "イベントが見つかりません: unknown-id");
}

// --- ログイン中ユーザー ---

#[tokio::test]
async fn test_meは参加登録中のイベントを含む() {
    let app = TestApp::new();
    let event_id = app.add_event(5, now() + Duration::days(7));
    let (alice, session) = app.login("alice", false);
    app.send(request(
        Method::POST,
        &register_uri(&event_id, "me"),
        Some(&session),
        None,
    ))
    .await;

    let (status, body) = app
        .send(request(Method::GET, "/api/auth/me", Some(&session), None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice.id().to_string());
    assert_eq!(body["subject"], "auth0|alice");
    assert_eq!(body["isAdmin"], false);
    assert_eq!(body["signedUpEvents"][0]["id"], event_id.to_string());
    assert_eq!(body["eventHistory"], json!([]));
}

#[tokio::test]
async fn test_meはセッションがなければ401() {
    let app = TestApp::new();

    let (status, body) = app
        .send(request(Method::GET, "/api/auth/me", Some("expired"), None))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_meはユーザーが未作成なら404() {
    let app = TestApp::new();
    app.sessions.insert(
        "orphan",
        SessionData::new(
            UserId::new(),
            Subject::new("auth0|orphan").unwrap(),
            false,
            now(),
        ),
    );

    let (status, body) = app
        .send(request(Method::GET, "/api/auth/me", Some("orphan"), None))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["detail"],
        "subject \"auth0|orphan\" のユーザーが見つかりません"
    );
}

// --- レポート ---

#[tokio::test]
async fn test_レポートは購読中の管理者に送られる() {
    let app = TestApp::new();
    let (_, session) = app.login("reporter", false);
    let (admin, _) = app.login("admin", true);
    app.users
        .add_user(admin.subscribed_to(AdminEmailCategory::UserReport, now()));

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/email/report",
            Some(&session),
            Some(json!({ "title": "不具合", "content": "ボタンが押せません" })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "recipients": 1 }));
    let sent = app.sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].bcc, vec!["admin@example.com"]);
}

#[tokio::test]
async fn test_宛先がいなければrecipientsは0() {
    let app = TestApp::new();
    let (_, session) = app.login("reporter", false);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/email/report",
            Some(&session),
            Some(json!({ "title": "不具合", "content": "本文" })),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "recipients": 0 }));
    assert!(app.sender.sent_emails().is_empty());
}

#[tokio::test]
async fn test_本文が不正なレポートは400() {
    let app = TestApp::new();
    let (_, session) = app.login("reporter", false);

    let (status, _) = app
        .send(request(
            Method::POST,
            "/api/email/report",
            Some(&session),
            Some(json!({ "title": "件名のみ" })),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_レート制限に達したレポートは429() {
    let app = TestApp::with_rate_limit(0);
    let (_, session) = app.login("reporter", false);

    let (status, body) = app
        .send(request(
            Method::POST,
            "/api/email/report",
            Some(&session),
            Some(json!({ "title": "不具合", "content": "本文" })),
        ))
        .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["title"], "Too Many Requests");
}

// --- 画像削除 ---

#[tokio::test]
async fn test_管理者は画像を削除できる() {
    let app = TestApp::new();
    let (_, session) = app.login("admin", true);

    let (status, body) = app
        .send(request(
            Method::DELETE,
            "/api/images/banner-2026.png",
            Some(&session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "banner-2026.png" }));
    assert_eq!(app.storage.deleted(), vec!["banner-2026.png"]);
}

#[tokio::test]
async fn test_一般ユーザーの画像削除は403() {
    let app = TestApp::new();
    let (_, session) = app.login("alice", false);

    let (status, _) = app
        .send(request(
            Method::DELETE,
            "/api/images/banner-2026.png",
            Some(&session),
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.storage.deleted().is_empty());
}

#[tokio::test]
async fn test_セッションなしの画像削除は401() {
    let app = TestApp::new();

    let (status, _) = app
        .send(request(
            Method::DELETE,
            "/api/images/banner-2026.png",
            None,
            None,
        ))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// --- ヘルスチェック ---

#[tokio::test]
async fn test_healthは認証なしで200() {
    let app = TestApp::new();

    let (status, body) = app
        .send(request(Method::GET, "/health", None, None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
