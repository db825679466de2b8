//! # テスト用モック
//!
//! ユースケーステスト・ハンドラテストで使用するインメモリ実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! txosteo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use txosteo_domain::{
    event::{Event, EventId},
    notification::{AdminEmailCategory, EmailMessage, NotificationError},
    user::{Subject, User, UserId},
    value_objects::ImageName,
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    rate_limit::RateLimiter,
    repository::{EventRepository, RegistrationOutcome, UserRepository, UserWithEvents},
    s3::ImageStorage,
    session::{SessionData, SessionManager},
};

/// インメモリのイベントリポジトリ
///
/// `register_user` は PostgreSQL 実装と同じく、残り定員が 1 以上の場合のみ
/// 定員を減らす。ロック内で判定と更新を行うため、並行呼び出しでも定員を超えない。
#[derive(Clone, Default)]
pub struct MockEventRepository {
    events:   Arc<Mutex<Vec<Event>>>,
    accesses: Arc<Mutex<usize>>,
}

impl MockEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    /// 保存されているイベントを取得する（検証用）
    pub fn get(&self, id: &EventId) -> Option<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id() == id)
            .cloned()
    }

    /// リポジトリへの読み書き回数（検証用）
    pub fn access_count(&self) -> usize {
        *self.accesses.lock().unwrap()
    }

    fn touch(&self) {
        *self.accesses.lock().unwrap() += 1;
    }
}

#[async_trait]
impl EventRepository for MockEventRepository {
    async fn find_by_id_with_members(&self, id: &EventId) -> Result<Option<Event>, InfraError> {
        self.touch();
        Ok(self.get(id))
    }

    async fn register_user(
        &self,
        id: &EventId,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome, InfraError> {
        self.touch();
        let mut events = self.events.lock().unwrap();

        let Some(slot) = events.iter_mut().find(|e| e.id() == id) else {
            return Ok(RegistrationOutcome::EventNotFound);
        };
        if slot.capacity().is_exhausted() {
            return Ok(RegistrationOutcome::CapacityExhausted);
        }

        let updated = slot.clone().registered(user_id.clone(), now)?;
        *slot = updated.clone();

        Ok(RegistrationOutcome::Registered(updated))
    }

    async fn insert(&self, event: &Event) -> Result<(), InfraError> {
        self.touch();
        self.add_event(event.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users:   Arc<Mutex<Vec<User>>>,
    history: Arc<Mutex<HashMap<UserId, Vec<Event>>>>,
    events:  Option<MockEventRepository>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 参加登録中のイベントを引くためのイベントリポジトリを関連付ける
    pub fn with_events(events: MockEventRepository) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn add_attended_event(&self, user_id: &UserId, event: Event) {
        self.history
            .lock()
            .unwrap()
            .entry(user_id.clone())
            .or_default()
            .push(event);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_subject(&self, subject: &Subject) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.subject() == subject)
            .cloned())
    }

    async fn find_with_events_by_subject(
        &self,
        subject: &Subject,
    ) -> Result<Option<UserWithEvents>, InfraError> {
        let Some(user) = self.find_by_subject(subject).await? else {
            return Ok(None);
        };

        let mut signed_up_events: Vec<Event> = self
            .events
            .as_ref()
            .map(|repo| {
                repo.events
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|e| e.is_signed_up(user.id()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        signed_up_events.sort_by_key(Event::date_and_time);

        let mut event_history = self
            .history
            .lock()
            .unwrap()
            .get(user.id())
            .cloned()
            .unwrap_or_default();
        event_history.sort_by_key(Event::date_and_time);

        Ok(Some(UserWithEvents {
            user,
            signed_up_events,
            event_history,
        }))
    }

    async fn find_admins_subscribed_to(
        &self,
        category: AdminEmailCategory,
    ) -> Result<Vec<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.receives(category))
            .cloned()
            .collect())
    }

    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        self.add_user(user.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockSessionManager {
    sessions: Arc<Mutex<HashMap<String, SessionData>>>,
    failing:  bool,
}

impl MockSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常にエラーを返すセッションマネージャ（ストア障害の再現用）
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// 指定 ID でセッションを登録する
    pub fn insert(&self, session_id: &str, data: SessionData) {
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.to_string(), data);
    }
}

#[async_trait]
impl SessionManager for MockSessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        self.insert(&session_id, data.clone());
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        if self.failing {
            return Err(InfraError::unexpected("セッションストアに接続できません"));
        }
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }
}

/// インメモリのレート制限（ウィンドウなし）
#[derive(Clone)]
pub struct MockRateLimiter {
    max_requests:   u32,
    counts:         Arc<Mutex<HashMap<UserId, u32>>>,
    failing_record: bool,
}

impl MockRateLimiter {
    pub fn new(max_requests: u32) -> Self {
        Self {
            max_requests,
            counts: Arc::new(Mutex::new(HashMap::new())),
            failing_record: false,
        }
    }

    /// 判定は成功し、記録だけが失敗するレート制限
    pub fn failing_record(max_requests: u32) -> Self {
        Self {
            failing_record: true,
            ..Self::new(max_requests)
        }
    }

    pub fn count(&self, user_id: &UserId) -> u32 {
        self.counts
            .lock()
            .unwrap()
            .get(user_id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl RateLimiter for MockRateLimiter {
    async fn is_limited(&self, user_id: &UserId) -> Result<bool, InfraError> {
        Ok(self.count(user_id) >= self.max_requests)
    }

    async fn record(&self, user_id: &UserId) -> Result<(), InfraError> {
        if self.failing_record {
            return Err(InfraError::unexpected("レート制限ストアに接続できません"));
        }
        *self
            .counts
            .lock()
            .unwrap()
            .entry(user_id.clone())
            .or_insert(0) += 1;
        Ok(())
    }
}

/// 送信したメールを記録する通知送信
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// 削除要求を記録する画像ストレージ
#[derive(Clone, Default)]
pub struct MockImageStorage {
    deleted: Arc<Mutex<Vec<String>>>,
}

impl MockImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStorage for MockImageStorage {
    async fn delete_image(&self, name: &ImageName) -> Result<(), InfraError> {
        self.deleted.lock().unwrap().push(name.as_str().to_string());
        Ok(())
    }
}
