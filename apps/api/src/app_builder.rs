//! # アプリケーション構築
//!
//! 依存（リポジトリ・外部サービス）を受け取り、ユースケース → State → Router の順に組み立てる。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## ルーティング
//!
//! | メソッド | パス | 認証 |
//! |---------|------|------|
//! | GET | `/health` | 不要 |
//! | GET | `/api/event/{id}` | 不要 |
//! | GET | `/api/auth/me` | 要 |
//! | POST | `/api/events/{event_id}/register/{user_id}` | 要 |
//! | POST | `/api/email/report` | 要 |
//! | DELETE | `/api/images/{id}` | 要（管理者） |
//!
//! `/health/ready` は実接続を必要とするため `main.rs` で追加する。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;
use txosteo_domain::{clock::Clock, notification::NotificationError};
use txosteo_infra::{
    RateLimiter,
    SessionManager,
    notification::NotificationSender,
    repository::{EventRepository, UserRepository},
    s3::ImageStorage,
};

use crate::{
    handler::{
        EventState,
        ImageState,
        RegistrationState,
        ReportState,
        UserState,
        delete_image,
        get_event,
        health_check,
        me,
        register_for_event,
        send_report,
    },
    middleware::{AuthState, require_session},
    usecase::{
        ImageUseCaseImpl,
        RegistrationUseCaseImpl,
        ReportUseCaseImpl,
        TemplateRenderer,
        UserUseCaseImpl,
    },
};

/// ルーター構築に必要な依存
pub struct AppDependencies {
    pub session_manager:     Arc<dyn SessionManager>,
    pub event_repository:    Arc<dyn EventRepository>,
    pub user_repository:     Arc<dyn UserRepository>,
    pub rate_limiter:        Arc<dyn RateLimiter>,
    pub notification_sender: Arc<dyn NotificationSender>,
    pub image_storage:       Arc<dyn ImageStorage>,
    pub clock:               Arc<dyn Clock>,
}

/// ルーターを構築する
///
/// メールテンプレートの登録に失敗した場合はエラー。
pub fn build_app(deps: AppDependencies) -> Result<Router, NotificationError> {
    let auth_state = AuthState {
        session_manager: deps.session_manager,
    };

    let event_state = Arc::new(EventState {
        event_repository: deps.event_repository.clone(),
    });
    let registration_state = Arc::new(RegistrationState {
        usecase: RegistrationUseCaseImpl::new(deps.event_repository, deps.clock.clone()),
    });
    let user_state = Arc::new(UserState {
        usecase: UserUseCaseImpl::new(deps.user_repository.clone()),
    });
    let report_state = Arc::new(ReportState {
        usecase: ReportUseCaseImpl::new(
            deps.user_repository,
            deps.rate_limiter,
            deps.notification_sender,
            TemplateRenderer::new()?,
            deps.clock,
        ),
    });
    let image_state = Arc::new(ImageState {
        usecase: ImageUseCaseImpl::new(deps.image_storage),
    });

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/event/{id}", get(get_event))
        .with_state(event_state);

    let protected = Router::new()
        .route("/api/auth/me", get(me))
        .with_state(user_state)
        .route(
            "/api/events/{event_id}/register/{user_id}",
            post(register_for_event),
        )
        .with_state(registration_state)
        .route("/api/email/report", post(send_report))
        .with_state(report_state)
        .route("/api/images/{id}", delete(delete_image))
        .with_state(image_state)
        .route_layer(from_fn_with_state(auth_state, require_session));

    Ok(public.merge(protected).layer(TraceLayer::new_for_http()))
}
