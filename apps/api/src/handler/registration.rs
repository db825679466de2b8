//! # 参加登録ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/events/{event_id}/register/{user_id}` - 参加登録（要認証）
//!
//! `user_id` に `me` を指定すると呼び出し元自身を登録する。

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Path, State},
};

use super::EventDto;
use crate::{
    error::ApiError,
    middleware::AuthenticatedUser,
    usecase::{RegisterInput, RegistrationUseCaseImpl},
};

/// 参加登録 API の共有状態
pub struct RegistrationState {
    pub usecase: RegistrationUseCaseImpl,
}

/// POST /api/events/{event_id}/register/{user_id}
///
/// 更新後のイベントを登録者一覧付きで返す。
#[tracing::instrument(skip_all, fields(%event_id, %user_id, caller = %caller.user_id))]
pub async fn register_for_event(
    State(state): State<Arc<RegistrationState>>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path((event_id, user_id)): Path<(String, String)>,
) -> Result<Json<EventDto>, ApiError> {
    let event = state
        .usecase
        .register(RegisterInput {
            event_id,
            user_id,
            caller: caller.caller(),
        })
        .await?;

    Ok(Json(EventDto::with_members(&event)))
}
