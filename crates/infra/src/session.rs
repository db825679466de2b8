//! # セッション管理
//!
//! Redis に保存されたログインセッションを扱う。
//!
//! セッションは外部のログインフローが書き込み、本サービスは読み取る。
//! `create` はそのフローとテストのために公開している。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `session:{session_id}` | SessionData (JSON) | 28800秒（8時間） |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use txosteo_domain::user::{Subject, UserId};
use uuid::Uuid;

use crate::InfraError;

/// セッションの有効期限（秒）
const SESSION_TTL_SECONDS: u64 = 28800;

/// セッションデータ
///
/// Redis に JSON 形式で保存されるセッション情報。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    user_id:    UserId,
    subject:    Subject,
    is_admin:   bool,
    created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(user_id: UserId, subject: Subject, is_admin: bool, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            subject,
            is_admin,
            created_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// セッション管理トレイト
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// セッションを作成し、セッション ID を返す
    async fn create(&self, data: &SessionData) -> Result<String, InfraError>;

    /// セッションを取得する
    ///
    /// 存在しない、または期限切れの場合は `None`。
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError>;
}

/// Redis を使用したセッションマネージャ
#[derive(Clone)]
pub struct RedisSessionManager {
    conn: ConnectionManager,
}

impl RedisSessionManager {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn session_key(session_id: &str) -> String {
        format!("session:{session_id}")
    }
}

#[async_trait]
impl SessionManager for RedisSessionManager {
    async fn create(&self, data: &SessionData) -> Result<String, InfraError> {
        // UUID v4 でセッション ID を生成（暗号論的に安全なランダム値）
        let session_id = Uuid::new_v4().to_string();
        let key = Self::session_key(&session_id);
        let json = serde_json::to_string(data)?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, json, SESSION_TTL_SECONDS).await?;

        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, InfraError> {
        let key = Self::session_key(session_id);
        let mut conn = self.conn.clone();

        let result: Option<String> = conn.get(&key).await?;

        match result {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

/// Redis 接続マネージャを作成する
///
/// 切断時は自動的に再接続される。クローンして共有する。
pub async fn create_connection_manager(redis_url: &str) -> Result<ConnectionManager, InfraError> {
    let client = redis::Client::open(redis_url)?;
    Ok(ConnectionManager::new(client).await?)
}
