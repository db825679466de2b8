//! # 認証ミドルウェア
//!
//! Cookie のセッション ID から Redis のセッションを引き当て、
//! 認証済みユーザーをリクエストの Extension に格納する。
//!
//! セッションは外部のログインフローが作成する。本サービスは読み取りのみ。
//!
//! ## 使い方
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//!
//! Router::new()
//!     .route("/api/auth/me", get(me))
//!     .layer(from_fn_with_state(auth_state, require_session))
//! ```
//!
//! ハンドラは `Extension<AuthenticatedUser>` で呼び出し元を受け取る。

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use txosteo_domain::{
    registration::Caller,
    user::{Subject, UserId},
};
use txosteo_infra::{SessionData, SessionManager};
use txosteo_shared::{ErrorResponse, event_log::error};

/// セッション ID を保持する Cookie 名
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// 認証ミドルウェアの状態
#[derive(Clone)]
pub struct AuthState {
    pub session_manager: Arc<dyn SessionManager>,
}

/// 認証済みの呼び出し元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id:  UserId,
    /// ID プロバイダの subject
    pub subject:  Subject,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    /// 認可判定用の呼び出し元に変換する
    pub fn caller(&self) -> Caller {
        Caller {
            user_id:  self.user_id.clone(),
            is_admin: self.is_admin,
        }
    }
}

impl From<SessionData> for AuthenticatedUser {
    fn from(session: SessionData) -> Self {
        Self {
            user_id:  session.user_id().clone(),
            subject:  session.subject().clone(),
            is_admin: session.is_admin(),
        }
    }
}

/// 認証ミドルウェア
///
/// - Cookie なし、またはセッションが存在しない → 401 Unauthorized
/// - セッションストアの障害 → 500 Internal Server Error
pub async fn require_session(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(session_id) = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string()) else {
        return unauthorized_response();
    };

    match state.session_manager.get(&session_id).await {
        Ok(Some(session)) => {
            request
                .extensions_mut()
                .insert(AuthenticatedUser::from(session));
            next.run(request).await
        }
        Ok(None) => unauthorized_response(),
        Err(e) => {
            tracing::error!(
                error.category = error::category::INFRASTRUCTURE,
                error.kind = error::kind::SESSION,
                "セッション取得で内部エラー: {}",
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error()),
            )
                .into_response()
        }
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::unauthorized("認証が必要です")),
    )
        .into_response()
}
