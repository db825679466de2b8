//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するエンティティ生成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use txosteo_domain::{
    event::{Capacity, Event, EventId, EventName, NewEvent},
    notification::AdminEmailCategory,
    user::{Email, NewUser, Subject, User, UserId},
    value_objects::UserName,
};
use txosteo_infra::repository::{
    EventRepository,
    PostgresEventRepository,
    PostgresUserRepository,
    UserRepository,
};

/// テスト用の固定日時
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// 未来に開催されるイベント
pub fn create_test_event(capacity: i32) -> Event {
    Event::new(NewEvent {
        id: EventId::new(),
        name: EventName::new("骨粗鬆症セミナー").unwrap(),
        date_and_time: test_now() + Duration::days(30),
        capacity: Capacity::new(capacity).unwrap(),
        now: test_now(),
    })
}

pub fn create_test_user(subject: &str) -> User {
    User::new(NewUser {
        id: UserId::new(),
        subject: Subject::new(subject).unwrap(),
        email: Email::new(format!("{}@example.com", subject.replace('|', "-"))).unwrap(),
        name: UserName::new("Test User").unwrap(),
        now: test_now(),
    })
}

pub fn create_test_admin(subject: &str, categories: &[AdminEmailCategory]) -> User {
    categories.iter().fold(
        create_test_user(subject).promoted_to_admin(test_now()),
        |user, category| user.subscribed_to(*category, test_now()),
    )
}

/// イベントを DB に保存する
pub async fn insert_event(pool: &PgPool, event: &Event) {
    PostgresEventRepository::new(pool.clone())
        .insert(event)
        .await
        .expect("イベント作成に失敗");
}

/// ユーザーを DB に保存する
pub async fn insert_user(pool: &PgPool, user: &User) {
    PostgresUserRepository::new(pool.clone())
        .insert(user)
        .await
        .expect("ユーザー作成に失敗");
}

/// 参加履歴を直接 SQL で挿入する
pub async fn insert_attendance(pool: &PgPool, event_id: &EventId, user_id: &UserId) {
    sqlx::query("INSERT INTO event_attendance (event_id, user_id) VALUES ($1, $2)")
        .bind(event_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(pool)
        .await
        .expect("参加履歴の挿入に失敗");
}
