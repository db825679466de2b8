//! # EventRepository
//!
//! イベントと参加登録の永続化を担当するリポジトリ。
//!
//! ## 参加登録の排他制御
//!
//! `register_user` は 1 トランザクション内で以下を行う:
//!
//! 1. `SELECT ... FOR UPDATE` でイベント行を排他ロック
//! 2. 残り定員が 0 なら何も書かずに [`RegistrationOutcome::CapacityExhausted`]
//! 3. 定員を 1 減らし、`event_signups` に登録者を追加
//!
//! 同じイベントへの同時登録は行ロックで直列化されるため、
//! 定員を超えて登録されることはなく、定員が負になることもない。

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use txosteo_domain::{
    event::{Capacity, Event, EventId, EventName},
    user::UserId,
};
use uuid::Uuid;

use crate::error::InfraError;

/// 参加登録の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// 登録完了（更新後のイベント）
    Registered(Event),
    /// 残り定員が 0 だった
    CapacityExhausted,
    /// イベントが存在しない
    EventNotFound,
    /// ユーザーが存在しない
    UserNotFound,
}

/// イベントリポジトリトレイト
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// イベントを登録者一覧付きで取得する
    async fn find_by_id_with_members(&self, id: &EventId) -> Result<Option<Event>, InfraError>;

    /// ユーザーを参加登録する
    ///
    /// 定員の減算と登録者の追加を不可分に行う。定員の減算は
    /// 残り定員が 1 以上の場合のみ行われる。登録済みのユーザーでも定員は減る。
    async fn register_user(
        &self,
        id: &EventId,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome, InfraError>;

    /// イベントを作成する
    async fn insert(&self, event: &Event) -> Result<(), InfraError>;
}

#[derive(sqlx::FromRow)]
pub(crate) struct EventRow {
    id:            Uuid,
    name:          String,
    date_and_time: DateTime<Utc>,
    capacity:      i32,
    created_at:    DateTime<Utc>,
    updated_at:    DateTime<Utc>,
}

impl EventRow {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn into_event(self, members: Vec<UserId>) -> Result<Event, InfraError> {
        Ok(Event::from_db(
            EventId::from_uuid(self.id),
            EventName::new(self.name)?,
            self.date_and_time,
            Capacity::new(self.capacity)?,
            members,
            self.created_at,
            self.updated_at,
        ))
    }
}

/// 複数イベントの登録者をまとめて取得し、イベントに組み立てる
///
/// 入力の順序を保つ。
pub(crate) async fn attach_members(
    conn: &mut PgConnection,
    rows: Vec<EventRow>,
) -> Result<Vec<Event>, InfraError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(EventRow::id).collect();
    let member_rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
        r#"
        SELECT event_id, user_id
        FROM event_signups
        WHERE event_id = ANY($1)
        ORDER BY signed_up_at, user_id
        "#,
    )
    .bind(ids.as_slice())
    .fetch_all(&mut *conn)
    .await?;

    let mut members: HashMap<Uuid, Vec<UserId>> = HashMap::new();
    for (event_id, user_id) in member_rows {
        members
            .entry(event_id)
            .or_default()
            .push(UserId::from_uuid(user_id));
    }

    rows.into_iter()
        .map(|row| {
            let event_members = members.remove(&row.id()).unwrap_or_default();
            row.into_event(event_members)
        })
        .collect()
}

async fn fetch_with_members(
    conn: &mut PgConnection,
    id: &Uuid,
) -> Result<Option<Event>, InfraError> {
    let row: Option<EventRow> = sqlx::query_as(
        r#"
        SELECT id, name, date_and_time, capacity, created_at, updated_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    Ok(attach_members(conn, vec![row]).await?.pop())
}

/// PostgreSQL 実装の EventRepository
#[derive(Debug, Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id_with_members(&self, id: &EventId) -> Result<Option<Event>, InfraError> {
        let mut conn = self.pool.acquire().await?;
        fetch_with_members(&mut conn, id.as_uuid()).await
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id, %user_id))]
    async fn register_user(
        &self,
        id: &EventId,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<RegistrationOutcome, InfraError> {
        let mut tx = self.pool.begin().await?;

        // 悲観的ロック付きで残り定員を取得
        let capacity: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT capacity
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((capacity,)) = capacity else {
            return Ok(RegistrationOutcome::EventNotFound);
        };
        if capacity <= 0 {
            return Ok(RegistrationOutcome::CapacityExhausted);
        }

        sqlx::query(
            r#"
            UPDATE events
            SET capacity = capacity - 1, updated_at = $2
            WHERE id = $1 AND capacity > 0
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO event_signups (event_id, user_id, signed_up_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                return Ok(RegistrationOutcome::UserNotFound);
            }
            Err(e) => return Err(e.into()),
        }

        let event = fetch_with_members(&mut tx, id.as_uuid())
            .await?
            .ok_or_else(|| {
                InfraError::unexpected(format!("登録直後のイベントが見つかりません: {id}"))
            })?;

        tx.commit().await?;

        Ok(RegistrationOutcome::Registered(event))
    }

    async fn insert(&self, event: &Event) -> Result<(), InfraError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO events (id, name, date_and_time, capacity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id().as_uuid())
        .bind(event.name().as_str())
        .bind(event.date_and_time())
        .bind(event.capacity().as_i32())
        .bind(event.created_at())
        .bind(event.updated_at())
        .execute(&mut *tx)
        .await?;

        for user_id in event.signed_up_users() {
            sqlx::query(
                r#"
                INSERT INTO event_signups (event_id, user_id, signed_up_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(event.id().as_uuid())
            .bind(user_id.as_uuid())
            .bind(event.updated_at())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
