//! # 利用者レポートハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /api/email/report` - レポートを管理者へメール送信（要認証）
//!
//! ## リクエスト例
//!
//! ```json
//! { "title": "予約ページの不具合", "content": "送信ボタンが反応しません" }
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! { "recipients": 2 }
//! ```

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    middleware::AuthenticatedUser,
    usecase::{ReportInput, ReportUseCaseImpl},
};

/// レポート API の共有状態
pub struct ReportState {
    pub usecase: ReportUseCaseImpl,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    pub title:   Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub recipients: usize,
}

/// POST /api/email/report
///
/// ボディの解析に失敗した場合も、レート制限の判定後に検証エラーとして扱う。
#[tracing::instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn send_report(
    State(state): State<Arc<ReportState>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(%rejection, "レポートのボディを解析できません");
            ReportRequest::default()
        }
    };

    let recipients = state
        .usecase
        .send_report(
            &user.user_id,
            ReportInput {
                title:   request.title,
                content: request.content,
            },
        )
        .await?;

    Ok(Json(ReportResponse { recipients }))
}
