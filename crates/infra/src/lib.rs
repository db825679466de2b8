//! # txosteo インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース**: PostgreSQL 接続プールとリポジトリ実装
//! - **Redis**: セッションの読み取りとレート制限
//! - **S3**: 画像の削除
//! - **メール**: SMTP / SES による通知送信
//!
//! ## 依存関係
//!
//! ```text
//! api → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - [`session`] - Redis セッション
//! - [`rate_limit`] - Redis レート制限
//! - [`s3`] - 画像ストレージ
//! - [`notification`] - メール送信

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod rate_limit;
pub mod repository;
pub mod s3;
pub mod session;

pub use error::{InfraError, InfraErrorKind};
pub use rate_limit::{RateLimitPolicy, RateLimiter, RedisRateLimiter};
pub use session::{RedisSessionManager, SessionData, SessionManager};
