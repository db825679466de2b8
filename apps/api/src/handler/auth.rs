//! # 認証ユーザーハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/auth/me` - ログイン中のユーザー（要認証）

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use txosteo_domain::notification::AdminEmailCategory;
use txosteo_infra::repository::UserWithEvents;

use super::EventDto;
use crate::{error::ApiError, middleware::AuthenticatedUser, usecase::UserUseCaseImpl};

/// ユーザー API の共有状態
pub struct UserState {
    pub usecase: UserUseCaseImpl,
}

/// ログイン中ユーザーの DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeDto {
    pub id: String,
    pub subject: String,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub subscribed_email_categories: Vec<AdminEmailCategory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub event_history: Vec<EventDto>,
    pub signed_up_events: Vec<EventDto>,
}

impl From<UserWithEvents> for MeDto {
    fn from(value: UserWithEvents) -> Self {
        let user = value.user;
        Self {
            id: user.id().to_string(),
            subject: user.subject().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            is_admin: user.is_admin(),
            subscribed_email_categories: user.subscribed_email_categories().to_vec(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            event_history: value.event_history.iter().map(EventDto::summary).collect(),
            signed_up_events: value.signed_up_events.iter().map(EventDto::summary).collect(),
        }
    }
}

/// GET /api/auth/me
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn me(
    State(state): State<Arc<UserState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<MeDto>, ApiError> {
    let found = state.usecase.get_me(&user.subject).await?;
    Ok(Json(MeDto::from(found)))
}
