//! # イベントハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/event/{id}` - イベント取得（認証不要）

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use txosteo_domain::event::{Event, EventId};
use txosteo_infra::repository::EventRepository;

use crate::error::ApiError;

/// イベント API の共有状態
pub struct EventState {
    pub event_repository: Arc<dyn EventRepository>,
}

/// イベント DTO
///
/// `signed_up_users` は参加登録のレスポンスでのみ出力する。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id:              String,
    pub name:            String,
    pub date_and_time:   DateTime<Utc>,
    pub capacity:        i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_up_users: Option<Vec<String>>,
    pub created_at:      DateTime<Utc>,
    pub updated_at:      DateTime<Utc>,
}

impl EventDto {
    /// 登録者一覧を含まない DTO
    pub fn summary(event: &Event) -> Self {
        Self {
            id:              event.id().to_string(),
            name:            event.name().to_string(),
            date_and_time:   event.date_and_time(),
            capacity:        event.capacity().as_i32(),
            signed_up_users: None,
            created_at:      event.created_at(),
            updated_at:      event.updated_at(),
        }
    }

    /// 登録者一覧を含む DTO
    pub fn with_members(event: &Event) -> Self {
        Self {
            signed_up_users: Some(
                event
                    .signed_up_users()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            ),
            ..Self::summary(event)
        }
    }
}

/// GET /api/event/{id}
///
/// UUID として解釈できない ID は存在しないイベントとして扱う。
#[tracing::instrument(skip_all, fields(event_id = %id))]
pub async fn get_event(
    State(state): State<Arc<EventState>>,
    Path(id): Path<String>,
) -> Result<Json<EventDto>, ApiError> {
    let raw = id.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest(
            "イベント ID が指定されていません".to_string(),
        ));
    }

    let not_found = || ApiError::NotFound(format!("イベントが見つかりません: {raw}"));
    let event_id = EventId::parse(raw).ok_or_else(not_found)?;

    let event = state
        .event_repository
        .find_by_id_with_members(&event_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(EventDto::summary(&event)))
}
