//! # txosteo API サーバー
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `API_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `API_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `REDIS_URL` | **Yes** | Redis 接続 URL（セッション、レート制限） |
//! | `S3_ENDPOINT_URL` | No | S3 互換エンドポイント（MinIO 使用時） |
//! | `IMAGES_BUCKET_NAME` | No | 画像バケット名（デフォルト: `images`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `ses` / `noop`（デフォルト: `noop`） |
//! | `EMAIL_RATE_LIMIT_MAX` | No | レポート送信の上限回数（デフォルト: 5） |
//! | `EMAIL_RATE_LIMIT_WINDOW_SECONDS` | No | レート制限のウィンドウ秒数（デフォルト: 3600） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//! | `RUN_MIGRATIONS` | No | 起動時にマイグレーションを実行するか |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p txosteo-api
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use txosteo_api::{
    app_builder::{AppDependencies, build_app},
    config::{ApiConfig, NotificationBackend, NotificationConfig},
    handler::{ReadinessState, readiness_check},
};
use txosteo_domain::clock::SystemClock;
use txosteo_infra::{
    RedisRateLimiter,
    RedisSessionManager,
    db,
    notification::{
        NoopNotificationSender,
        NotificationSender,
        SesNotificationSender,
        SmtpNotificationSender,
    },
    repository::{PostgresEventRepository, PostgresUserRepository},
    s3::{self, S3ImageStorage},
    session,
};
use txosteo_shared::observability::{TracingConfig, init_tracing};

/// レート制限キーのスコープ
const EMAIL_RATE_LIMIT_SCOPE: &str = "email";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("txosteo-api"));

    let config = ApiConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        "API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    if config.run_migrations {
        db::run_migrations(&pool)
            .await
            .context("マイグレーションの実行に失敗しました")?;
        tracing::info!("マイグレーションを実行しました");
    }

    let redis_conn = session::create_connection_manager(&config.redis_url)
        .await
        .context("Redis 接続に失敗しました")?;
    tracing::info!("Redis に接続しました");

    let s3_client = s3::create_client(config.s3_endpoint_url.as_deref()).await;

    let deps = AppDependencies {
        session_manager:     Arc::new(RedisSessionManager::new(redis_conn.clone())),
        event_repository:    Arc::new(PostgresEventRepository::new(pool.clone())),
        user_repository:     Arc::new(PostgresUserRepository::new(pool.clone())),
        rate_limiter:        Arc::new(RedisRateLimiter::new(
            redis_conn.clone(),
            EMAIL_RATE_LIMIT_SCOPE,
            config.email_rate_limit,
        )),
        notification_sender: build_notification_sender(&config.notification).await,
        image_storage:       Arc::new(S3ImageStorage::new(
            s3_client,
            config.images_bucket_name.clone(),
        )),
        clock:               Arc::new(SystemClock),
    };

    let readiness_state = Arc::new(ReadinessState { pool, redis_conn });
    let app = build_app(deps)
        .context("メールテンプレートの読み込みに失敗しました")?
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 設定に応じたメール送信実装を作成する
async fn build_notification_sender(config: &NotificationConfig) -> Arc<dyn NotificationSender> {
    match config.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                "通知バックエンド: SMTP ({}:{})",
                config.smtp_host,
                config.smtp_port
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Ses => {
            tracing::info!("通知バックエンド: SES");
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Arc::new(SesNotificationSender::new(
                aws_sdk_sesv2::Client::new(&aws_config),
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Noop => {
            tracing::info!("通知バックエンド: Noop（メール送信なし）");
            Arc::new(NoopNotificationSender)
        }
    }
}
