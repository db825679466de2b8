//! # UserRepository
//!
//! ユーザー情報の永続化を担当するリポジトリ。
//!
//! ユーザーは ID プロバイダの subject で引き当てる。
//! 管理者向けメールの宛先解決もここで行う。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use txosteo_domain::{
    event::Event,
    notification::AdminEmailCategory,
    user::{Email, Subject, User, UserId},
    value_objects::UserName,
};
use uuid::Uuid;

use super::event_repository::{EventRow, attach_members};
use crate::error::InfraError;

/// ユーザーと、そのユーザーが関わるイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserWithEvents {
    pub user:             User,
    /// 参加登録中のイベント（開催日時順）
    pub signed_up_events: Vec<Event>,
    /// 参加履歴（開催日時順）
    pub event_history:    Vec<Event>,
}

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// subject でユーザーを検索する
    async fn find_by_subject(&self, subject: &Subject) -> Result<Option<User>, InfraError>;

    /// subject でユーザーを参加登録・参加履歴付きで検索する
    async fn find_with_events_by_subject(
        &self,
        subject: &Subject,
    ) -> Result<Option<UserWithEvents>, InfraError>;

    /// 指定したメール種別を購読している管理者を取得する
    async fn find_admins_subscribed_to(
        &self,
        category: AdminEmailCategory,
    ) -> Result<Vec<User>, InfraError>;

    /// ユーザーを作成する
    async fn insert(&self, user: &User) -> Result<(), InfraError>;
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id:                          Uuid,
    subject:                     String,
    email:                       String,
    name:                        String,
    is_admin:                    bool,
    subscribed_email_categories: Vec<String>,
    created_at:                  DateTime<Utc>,
    updated_at:                  DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let categories = row
            .subscribed_email_categories
            .iter()
            .map(|c| {
                c.parse::<AdminEmailCategory>()
                    .map_err(|_| InfraError::corrupted(format!("不明なメール種別: {c}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(User::from_db(
            UserId::from_uuid(row.id),
            Subject::new(row.subject)?,
            Email::new(row.email)?,
            UserName::new(row.name)?,
            row.is_admin,
            categories,
            row.created_at,
            row.updated_at,
        ))
    }
}

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_subject(&self, subject: &Subject) -> Result<Option<User>, InfraError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                subject,
                email,
                name,
                is_admin,
                subscribed_email_categories,
                created_at,
                updated_at
            FROM users
            WHERE subject = $1
            "#,
        )
        .bind(subject.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%subject))]
    async fn find_with_events_by_subject(
        &self,
        subject: &Subject,
    ) -> Result<Option<UserWithEvents>, InfraError> {
        let Some(user) = self.find_by_subject(subject).await? else {
            return Ok(None);
        };

        let mut conn = self.pool.acquire().await?;

        let signed_up_rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT e.id, e.name, e.date_and_time, e.capacity, e.created_at, e.updated_at
            FROM events e
            JOIN event_signups s ON s.event_id = e.id
            WHERE s.user_id = $1
            ORDER BY e.date_and_time, e.id
            "#,
        )
        .bind(user.id().as_uuid())
        .fetch_all(&mut *conn)
        .await?;

        let history_rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT e.id, e.name, e.date_and_time, e.capacity, e.created_at, e.updated_at
            FROM events e
            JOIN event_attendance a ON a.event_id = e.id
            WHERE a.user_id = $1
            ORDER BY e.date_and_time, e.id
            "#,
        )
        .bind(user.id().as_uuid())
        .fetch_all(&mut *conn)
        .await?;

        let signed_up_events = attach_members(&mut conn, signed_up_rows).await?;
        let event_history = attach_members(&mut conn, history_rows).await?;

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
        let category_str: &str = category.into();

        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT
                id,
                subject,
                email,
                name,
                is_admin,
                subscribed_email_categories,
                created_at,
                updated_at
            FROM users
            WHERE is_admin AND $1 = ANY(subscribed_email_categories)
            ORDER BY created_at, id
            "#,
        )
        .bind(category_str)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        let categories: Vec<String> = user
            .subscribed_email_categories()
            .iter()
            .map(ToString::to_string)
            .collect();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, subject, email, name, is_admin,
                subscribed_email_categories, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.subject().as_str())
        .bind(user.email().as_str())
        .bind(user.name().as_str())
        .bind(user.is_admin())
        .bind(categories)
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
