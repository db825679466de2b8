//! # ヘルスチェックハンドラ
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（PostgreSQL / Redis の接続状態を確認）
//!
//! レスポンス型は [`txosteo_shared::HealthResponse`] / [`txosteo_shared::ReadinessResponse`] を参照。

use std::{collections::BTreeMap, future::Future, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use txosteo_infra::db;
use txosteo_shared::{CheckStatus, HealthResponse, ReadinessResponse};

/// 個別チェックのタイムアウト
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness Check エンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub pool:       PgPool,
    pub redis_conn: ConnectionManager,
}

/// Readiness Check エンドポイント
///
/// PostgreSQL と Redis の接続状態を並行チェックする。
/// 全チェック OK → 200、1 つでも失敗 → 503。
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let mut redis_conn = state.redis_conn.clone();
    let ping_cmd = redis::cmd("PING");
    let (database, redis) = tokio::join!(
        check("database", db::ping(&state.pool)),
        check(
            "redis",
            ping_cmd.query_async::<String>(&mut redis_conn)
        ),
    );

    let checks = BTreeMap::from([
        ("database".to_string(), database),
        ("redis".to_string(), redis),
    ]);
    let response = ReadinessResponse::from_checks(checks);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// 1 つの依存先をタイムアウト付きで確認する
async fn check<T, E: std::fmt::Display>(
    name: &'static str,
    probe: impl Future<Output = Result<T, E>>,
) -> CheckStatus {
    match tokio::time::timeout(CHECK_TIMEOUT, probe).await {
        Ok(Ok(_)) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(check = name, error = %e, "readiness check failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!(check = name, "readiness check timed out");
            CheckStatus::Error
        }
    }
}
