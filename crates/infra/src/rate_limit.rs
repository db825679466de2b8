//! # レート制限
//!
//! 呼び出し元ごとの操作回数を固定ウィンドウで数える。
//!
//! ## Redis キー設計
//!
//! | キー | 値 | TTL |
//! |-----|-----|-----|
//! | `rate_limit:{scope}:{user_id}` | 回数（整数） | ウィンドウ長 |
//!
//! ウィンドウは最初の記録時に始まり、TTL 経過でリセットされる。
//! キーの作成と TTL の設定は `SET NX EX` で同時に行い、`INCR` は TTL を保つ。

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use txosteo_domain::user::UserId;

use crate::InfraError;

/// レート制限の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// ウィンドウ内で許可される最大回数
    pub max_requests: u32,
    /// ウィンドウ長
    pub window:       Duration,
}

/// レート制限トレイト
///
/// 判定（`is_limited`）と記録（`record`）を分けている。
/// 処理が成功した場合だけ回数を消費させるため。
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// 呼び出し元が上限に達しているか
    async fn is_limited(&self, user_id: &UserId) -> Result<bool, InfraError>;

    /// 1 回分を記録する
    async fn record(&self, user_id: &UserId) -> Result<(), InfraError>;
}

/// Redis を使用したレート制限
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn:   ConnectionManager,
    scope:  &'static str,
    policy: RateLimitPolicy,
}

impl RedisRateLimiter {
    /// # 引数
    ///
    /// - `scope`: 制限対象の操作名（キーの一部になる。例: `"email"`）
    pub fn new(conn: ConnectionManager, scope: &'static str, policy: RateLimitPolicy) -> Self {
        Self {
            conn,
            scope,
            policy,
        }
    }

    fn key(&self, user_id: &UserId) -> String {
        rate_limit_key(self.scope, user_id)
    }
}

fn rate_limit_key(scope: &str, user_id: &UserId) -> String {
    format!("rate_limit:{scope}:{user_id}")
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn is_limited(&self, user_id: &UserId) -> Result<bool, InfraError> {
        let mut conn = self.conn.clone();
        let count: Option<u32> = conn.get(self.key(user_id)).await?;

        Ok(count.unwrap_or(0) >= self.policy.max_requests)
    }

    async fn record(&self, user_id: &UserId) -> Result<(), InfraError> {
        let key = self.key(user_id);
        let mut conn = self.conn.clone();

        // SET NX EX と INCR を同一トランザクションで送る。TTL のないキーを残さない
        let window_secs = self.policy.window.as_secs().max(1);
        let (count,): (u32,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("EX")
            .arg(window_secs)
            .arg("NX")
            .ignore()
            .incr(&key, 1)
            .query_async(&mut conn)
            .await?;

        tracing::debug!(
            rate_limit.scope = self.scope,
            rate_limit.count = count,
            rate_limit.max = self.policy.max_requests,
            "レート制限を記録"
        );

        Ok(())
    }
}
