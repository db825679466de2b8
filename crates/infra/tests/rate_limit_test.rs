//! RedisRateLimiter 統合テスト
//!
//! 実行方法:
//! ```bash
//! REDIS_URL=redis://... cargo test -p txosteo-infra --test rate_limit_test -- --ignored
//! ```

use std::time::Duration;

use pretty_assertions::assert_eq;
use redis::{AsyncCommands, aio::ConnectionManager};
use txosteo_domain::user::UserId;
use txosteo_infra::{
    RateLimitPolicy,
    RateLimiter,
    RedisRateLimiter,
    session::create_connection_manager,
};

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

async fn setup(max_requests: u32) -> (ConnectionManager, RedisRateLimiter) {
    let conn = create_connection_manager(&redis_url()).await.unwrap();
    let limiter = RedisRateLimiter::new(
        conn.clone(),
        "email",
        RateLimitPolicy {
            max_requests,
            window: Duration::from_secs(60),
        },
    );
    (conn, limiter)
}

async fn cleanup(conn: &mut ConnectionManager, key: &str) {
    let _: redis::RedisResult<()> = conn.del(key).await;
}

#[tokio::test]
#[ignore = "Redis が必要"]
async fn test_記録するとキーにttlが設定される() {
    let (mut conn, limiter) = setup(5).await;
    let user_id = UserId::new();
    let key = format!("rate_limit:email:{user_id}");

    limiter.record(&user_id).await.unwrap();

    let ttl: i64 = conn.ttl(&key).await.unwrap();
    assert!(ttl > 0 && ttl <= 60, "ttl = {ttl}");

    cleanup(&mut conn, &key).await;
}

#[tokio::test]
#[ignore = "Redis が必要"]
async fn test_2回目の記録でもttlは維持される() {
    let (mut conn, limiter) = setup(5).await;
    let user_id = UserId::new();
    let key = format!("rate_limit:email:{user_id}");

    limiter.record(&user_id).await.unwrap();
    limiter.record(&user_id).await.unwrap();

    let count: u32 = conn.get(&key).await.unwrap();
    let ttl: i64 = conn.ttl(&key).await.unwrap();
    assert_eq!(count, 2);
    assert!(ttl > 0, "ttl = {ttl}");

    cleanup(&mut conn, &key).await;
}

#[tokio::test]
#[ignore = "Redis が必要"]
async fn test_上限回数に達すると制限される() {
    let (mut conn, limiter) = setup(2).await;
    let user_id = UserId::new();
    let key = format!("rate_limit:email:{user_id}");

    assert!(!limiter.is_limited(&user_id).await.unwrap());
    limiter.record(&user_id).await.unwrap();
    assert!(!limiter.is_limited(&user_id).await.unwrap());
    limiter.record(&user_id).await.unwrap();
    assert!(limiter.is_limited(&user_id).await.unwrap());

    cleanup(&mut conn, &key).await;
}
