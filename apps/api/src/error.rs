//! # API エラー定義
//!
//! ユースケース・ハンドラで発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! レスポンスボディは RFC 9457 Problem Details（[`ErrorResponse`]）。
//! 内部エラーの詳細はログにのみ出力し、クライアントには固定文言を返す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use txosteo_domain::{DomainError, notification::NotificationError};
use txosteo_infra::{InfraError, InfraErrorKind};
use txosteo_shared::{ErrorResponse, event_log::error};

/// API で発生するエラー
#[derive(Debug, Error)]
pub enum ApiError {
    /// 不正なリクエスト（必須パラメータ欠落、入力値の検証失敗）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 未認証
    #[error("認証が必要です: {0}")]
    Unauthorized(String),

    /// 権限不足
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 対象の状態が操作を許さない（開催済み、定員到達など）
    #[error("状態が不正です: {0}")]
    InvalidState(String),

    /// レート制限超過
    #[error("リクエストが多すぎます: {0}")]
    TooManyRequests(String),

    /// インフラ層のエラー（DB、Redis、S3）
    #[error("インフラエラー: {0}")]
    Database(#[from] InfraError),

    /// メール送信・テンプレートのエラー
    #[error("通知エラー: {0}")]
    Notification(#[from] NotificationError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            DomainError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type}が見つかりません: {id}"))
            }
            DomainError::Forbidden(msg) => Self::Forbidden(msg),
            DomainError::InvalidState(msg) => Self::InvalidState(msg),
        }
    }
}

/// InfraError の種別をログ用のエラー種別名に変換する
fn infra_error_kind(err: &InfraError) -> &'static str {
    match err.kind() {
        InfraErrorKind::Database(_) | InfraErrorKind::Corrupted(_) => error::kind::DATABASE,
        InfraErrorKind::Redis(_) | InfraErrorKind::Serialization(_) => error::kind::REDIS,
        InfraErrorKind::S3(_) => error::kind::STORAGE,
        InfraErrorKind::Unexpected(_) => error::kind::INTERNAL,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::BadRequest(msg) => ErrorResponse::bad_request(msg),
            ApiError::Unauthorized(msg) => ErrorResponse::unauthorized(msg),
            ApiError::Forbidden(msg) => ErrorResponse::forbidden(msg),
            ApiError::NotFound(msg) => ErrorResponse::not_found(msg),
            ApiError::InvalidState(msg) => ErrorResponse::invalid_state(msg),
            ApiError::TooManyRequests(msg) => ErrorResponse::too_many_requests(msg),
            ApiError::Database(e) => {
                tracing::error!(
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = infra_error_kind(&e),
                    span_trace = %e.span_trace(),
                    "インフラエラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            ApiError::Notification(e) => {
                tracing::error!(
                    error.category = error::category::EXTERNAL_SERVICE,
                    error.kind = error::kind::NOTIFICATION,
                    "通知エラー: {}",
                    e
                );
                ErrorResponse::internal_error()
            }
            ApiError::Internal(msg) => {
                tracing::error!(
                    error.category = error::category::INFRASTRUCTURE,
                    error.kind = error::kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                ErrorResponse::internal_error()
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
