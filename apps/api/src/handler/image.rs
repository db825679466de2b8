//! # 画像ハンドラ
//!
//! ## エンドポイント
//!
//! - `DELETE /api/images/{id}` - 画像バケットから削除（管理者のみ）

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::{error::ApiError, middleware::AuthenticatedUser, usecase::ImageUseCaseImpl};

pub struct ImageState {
    pub usecase: ImageUseCaseImpl,
}

#[derive(Debug, Serialize)]
pub struct DeletedImageResponse {
    pub name: String,
}

/// DELETE /api/images/{id}
#[tracing::instrument(skip_all, fields(image_id = %id, user_id = %user.user_id))]
pub async fn delete_image(
    State(state): State<Arc<ImageState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedImageResponse>, ApiError> {
    let name = state.usecase.delete_image(&user, &id).await?;

    Ok(Json(DeletedImageResponse {
        name: name.into_string(),
    }))
}
